// SPDX-License-Identifier: MIT OR Apache-2.0

use gavel_core::{
    AclEntry, AclId, AclKey, ObjectRef, ObjectType, PersonId, Relationship, RelationshipId,
    Revision, RevisionId, Role, RoleId, Snapshot, SnapshotId,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("entry references unknown parent acl entry {0}")]
    UnknownParent(AclId),

    #[error("entry references unknown role {0}")]
    UnknownRole(RoleId),
}

/// Role catalog lookup.
pub trait RoleStore {
    /// Insert a role.
    ///
    /// Returns `true` when the insert occurred, or `false` when a role with
    /// the same id already existed and no insertion occurred.
    fn insert_role(&mut self, role: Role) -> Result<bool, StoreError>;

    /// Get a role by id.
    fn role(&self, id: RoleId) -> Result<Option<Role>, StoreError>;

    /// Get a role by the object type it is defined on and its name.
    fn role_by_name(
        &self,
        object_type: ObjectType,
        name: &str,
    ) -> Result<Option<Role>, StoreError>;

    /// All roles in the catalog.
    fn roles(&self) -> Result<Vec<Role>, StoreError>;
}

/// Access control entry storage.
pub trait AclStore {
    /// Reserve the next free entry id.
    fn allocate_acl_id(&mut self) -> AclId;

    /// Insert an ACL entry.
    ///
    /// Returns `true` when the insert occurred, or `false` when an entry
    /// with the same `(object, role, person, parent)` key already existed
    /// and no insertion occurred. Inserting an entry whose parent is not in
    /// the store is an error.
    fn insert_acl(&mut self, entry: AclEntry) -> Result<bool, StoreError>;

    /// Get an entry.
    fn acl(&self, id: AclId) -> Result<Option<AclEntry>, StoreError>;

    /// Get the entry holding the given duplicate key, the way a relational
    /// backend would consult its unique index.
    fn acl_by_key(&self, key: &AclKey) -> Result<Option<AclEntry>, StoreError>;

    /// Delete an entry.
    ///
    /// Returns `true` when the removal occurred and `false` when the entry
    /// was not found in the store. Derived children are not touched; the
    /// propagation engine owns cascade deletion.
    fn delete_acl(&mut self, id: AclId) -> Result<bool, StoreError>;

    /// All entries granting access on the given object.
    fn acls_on(&self, object: ObjectRef) -> Result<Vec<AclEntry>, StoreError>;

    /// All entries held by the given person.
    fn acls_for_person(&self, person: PersonId) -> Result<Vec<AclEntry>, StoreError>;

    /// All entries derived directly from the given entry.
    fn acl_children(&self, parent: AclId) -> Result<Vec<AclEntry>, StoreError>;

    /// All entries which were propagated across the given relationship.
    fn acls_via(&self, relationship: RelationshipId) -> Result<Vec<AclEntry>, StoreError>;
}

/// Relationship edge storage.
pub trait RelationshipStore {
    /// Insert a relationship.
    ///
    /// Returns `true` when the insert occurred, or `false` when an edge
    /// between the same two objects (in either direction) already existed
    /// and no insertion occurred.
    fn insert_relationship(&mut self, relationship: Relationship) -> Result<bool, StoreError>;

    /// Get a relationship.
    fn relationship(&self, id: RelationshipId) -> Result<Option<Relationship>, StoreError>;

    /// Delete a relationship.
    ///
    /// Returns `true` when the removal occurred and `false` when the edge
    /// was not found in the store.
    fn delete_relationship(&mut self, id: RelationshipId) -> Result<bool, StoreError>;

    /// All edges incident to the given object, in either direction.
    fn relationships_of(&self, object: ObjectRef) -> Result<Vec<Relationship>, StoreError>;

    /// Every edge in the store.
    fn relationships(&self) -> Result<Vec<Relationship>, StoreError>;
}

/// Revision and snapshot storage.
pub trait RevisionStore {
    /// Insert a revision.
    ///
    /// Returns `true` when the insert occurred, or `false` when a revision
    /// with the same id already existed and no insertion occurred.
    fn insert_revision(&mut self, revision: Revision) -> Result<bool, StoreError>;

    /// Get a revision.
    fn revision(&self, id: RevisionId) -> Result<Option<Revision>, StoreError>;

    /// The most recent revision of the given resource.
    fn latest_revision(&self, resource: ObjectRef) -> Result<Option<Revision>, StoreError>;

    /// Insert a snapshot.
    ///
    /// Returns `true` when the insert occurred, or `false` when a snapshot
    /// with the same id already existed and no insertion occurred.
    fn insert_snapshot(&mut self, snapshot: Snapshot) -> Result<bool, StoreError>;

    /// Get a snapshot.
    fn snapshot(&self, id: SnapshotId) -> Result<Option<Snapshot>, StoreError>;

    /// All snapshots attached to the given audit.
    fn snapshots_of(&self, parent: ObjectRef) -> Result<Vec<Snapshot>, StoreError>;
}
