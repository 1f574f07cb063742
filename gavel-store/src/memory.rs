// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{BTreeSet, HashMap, HashSet};

use gavel_core::{
    AclEntry, AclId, AclKey, ObjectRef, ObjectType, PersonId, Relationship, RelationshipId,
    Revision, RevisionId, Role, RoleId, Snapshot, SnapshotId,
};

use crate::traits::{AclStore, RelationshipStore, RevisionStore, RoleStore, StoreError};

/// In-memory reference store backing all four storage traits.
///
/// Secondary indexes are kept as ordered id sets so queries return rows in
/// insertion-id order, which keeps engine output deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_acl_id: AclId,
    roles: HashMap<RoleId, Role>,
    acls: HashMap<AclId, AclEntry>,
    acl_keys: HashMap<AclKey, AclId>,
    acls_by_object: HashMap<ObjectRef, BTreeSet<AclId>>,
    acls_by_person: HashMap<PersonId, BTreeSet<AclId>>,
    acls_by_parent: HashMap<AclId, BTreeSet<AclId>>,
    acls_by_via: HashMap<RelationshipId, BTreeSet<AclId>>,
    relationships: HashMap<RelationshipId, Relationship>,
    relationships_by_object: HashMap<ObjectRef, BTreeSet<RelationshipId>>,
    endpoint_pairs: HashSet<(ObjectRef, ObjectRef)>,
    revisions: HashMap<RevisionId, Revision>,
    revisions_by_resource: HashMap<ObjectRef, BTreeSet<RevisionId>>,
    snapshots: HashMap<SnapshotId, Snapshot>,
    snapshots_by_parent: HashMap<ObjectRef, BTreeSet<SnapshotId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_acls(&self, ids: Option<&BTreeSet<AclId>>) -> Vec<AclEntry> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.acls.get(id).cloned())
            .collect()
    }

    /// Endpoints normalised so an edge and its reverse share one key.
    fn endpoint_pair(relationship: &Relationship) -> (ObjectRef, ObjectRef) {
        if relationship.source <= relationship.destination {
            (relationship.source, relationship.destination)
        } else {
            (relationship.destination, relationship.source)
        }
    }
}

impl RoleStore for MemoryStore {
    fn insert_role(&mut self, role: Role) -> Result<bool, StoreError> {
        if self.roles.contains_key(&role.id) {
            return Ok(false);
        }
        self.roles.insert(role.id, role);
        Ok(true)
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        Ok(self.roles.get(&id).cloned())
    }

    fn role_by_name(
        &self,
        object_type: ObjectType,
        name: &str,
    ) -> Result<Option<Role>, StoreError> {
        Ok(self
            .roles
            .values()
            .find(|role| role.object_type == object_type && role.name == name)
            .cloned())
    }

    fn roles(&self) -> Result<Vec<Role>, StoreError> {
        let mut roles: Vec<_> = self.roles.values().cloned().collect();
        roles.sort_by_key(|role| role.id);
        Ok(roles)
    }
}

impl AclStore for MemoryStore {
    fn allocate_acl_id(&mut self) -> AclId {
        self.next_acl_id += 1;
        self.next_acl_id
    }

    fn insert_acl(&mut self, entry: AclEntry) -> Result<bool, StoreError> {
        if let Some(parent) = entry.parent {
            if !self.acls.contains_key(&parent) {
                return Err(StoreError::UnknownParent(parent));
            }
        }
        if self.acls.contains_key(&entry.id) {
            return Ok(false);
        }
        if self.acl_keys.contains_key(&entry.key()) {
            return Ok(false);
        }
        self.acl_keys.insert(entry.key(), entry.id);

        // Keep the allocator ahead of manually assigned ids.
        self.next_acl_id = self.next_acl_id.max(entry.id);

        self.acls_by_object
            .entry(entry.object)
            .or_default()
            .insert(entry.id);
        self.acls_by_person
            .entry(entry.person)
            .or_default()
            .insert(entry.id);
        if let Some(parent) = entry.parent {
            self.acls_by_parent.entry(parent).or_default().insert(entry.id);
        }
        if let Some(via) = entry.via {
            self.acls_by_via.entry(via).or_default().insert(entry.id);
        }
        self.acls.insert(entry.id, entry);
        Ok(true)
    }

    fn acl(&self, id: AclId) -> Result<Option<AclEntry>, StoreError> {
        Ok(self.acls.get(&id).cloned())
    }

    fn acl_by_key(&self, key: &AclKey) -> Result<Option<AclEntry>, StoreError> {
        Ok(self
            .acl_keys
            .get(key)
            .and_then(|id| self.acls.get(id))
            .cloned())
    }

    fn delete_acl(&mut self, id: AclId) -> Result<bool, StoreError> {
        let Some(entry) = self.acls.remove(&id) else {
            return Ok(false);
        };
        self.acl_keys.remove(&entry.key());
        if let Some(ids) = self.acls_by_object.get_mut(&entry.object) {
            ids.remove(&id);
        }
        if let Some(ids) = self.acls_by_person.get_mut(&entry.person) {
            ids.remove(&id);
        }
        if let Some(parent) = entry.parent {
            if let Some(ids) = self.acls_by_parent.get_mut(&parent) {
                ids.remove(&id);
            }
        }
        if let Some(via) = entry.via {
            if let Some(ids) = self.acls_by_via.get_mut(&via) {
                ids.remove(&id);
            }
        }
        self.acls_by_parent.remove(&id);
        Ok(true)
    }

    fn acls_on(&self, object: ObjectRef) -> Result<Vec<AclEntry>, StoreError> {
        Ok(self.collect_acls(self.acls_by_object.get(&object)))
    }

    fn acls_for_person(&self, person: PersonId) -> Result<Vec<AclEntry>, StoreError> {
        Ok(self.collect_acls(self.acls_by_person.get(&person)))
    }

    fn acl_children(&self, parent: AclId) -> Result<Vec<AclEntry>, StoreError> {
        Ok(self.collect_acls(self.acls_by_parent.get(&parent)))
    }

    fn acls_via(&self, relationship: RelationshipId) -> Result<Vec<AclEntry>, StoreError> {
        Ok(self.collect_acls(self.acls_by_via.get(&relationship)))
    }
}

impl RelationshipStore for MemoryStore {
    fn insert_relationship(&mut self, relationship: Relationship) -> Result<bool, StoreError> {
        if self.relationships.contains_key(&relationship.id) {
            return Ok(false);
        }
        if !self.endpoint_pairs.insert(Self::endpoint_pair(&relationship)) {
            return Ok(false);
        }

        self.relationships_by_object
            .entry(relationship.source)
            .or_default()
            .insert(relationship.id);
        self.relationships_by_object
            .entry(relationship.destination)
            .or_default()
            .insert(relationship.id);
        self.relationships.insert(relationship.id, relationship);
        Ok(true)
    }

    fn relationship(&self, id: RelationshipId) -> Result<Option<Relationship>, StoreError> {
        Ok(self.relationships.get(&id).cloned())
    }

    fn delete_relationship(&mut self, id: RelationshipId) -> Result<bool, StoreError> {
        let Some(relationship) = self.relationships.remove(&id) else {
            return Ok(false);
        };
        self.endpoint_pairs.remove(&Self::endpoint_pair(&relationship));
        if let Some(ids) = self.relationships_by_object.get_mut(&relationship.source) {
            ids.remove(&id);
        }
        if let Some(ids) = self
            .relationships_by_object
            .get_mut(&relationship.destination)
        {
            ids.remove(&id);
        }
        Ok(true)
    }

    fn relationships_of(&self, object: ObjectRef) -> Result<Vec<Relationship>, StoreError> {
        Ok(self
            .relationships_by_object
            .get(&object)
            .into_iter()
            .flatten()
            .filter_map(|id| self.relationships.get(id).cloned())
            .collect())
    }

    fn relationships(&self) -> Result<Vec<Relationship>, StoreError> {
        let mut edges: Vec<_> = self.relationships.values().cloned().collect();
        edges.sort_by_key(|edge| edge.id);
        Ok(edges)
    }
}

impl RevisionStore for MemoryStore {
    fn insert_revision(&mut self, revision: Revision) -> Result<bool, StoreError> {
        if self.revisions.contains_key(&revision.id) {
            return Ok(false);
        }
        self.revisions_by_resource
            .entry(revision.resource)
            .or_default()
            .insert(revision.id);
        self.revisions.insert(revision.id, revision);
        Ok(true)
    }

    fn revision(&self, id: RevisionId) -> Result<Option<Revision>, StoreError> {
        Ok(self.revisions.get(&id).cloned())
    }

    fn latest_revision(&self, resource: ObjectRef) -> Result<Option<Revision>, StoreError> {
        Ok(self
            .revisions_by_resource
            .get(&resource)
            .and_then(|ids| ids.last())
            .and_then(|id| self.revisions.get(id))
            .cloned())
    }

    fn insert_snapshot(&mut self, snapshot: Snapshot) -> Result<bool, StoreError> {
        if self.snapshots.contains_key(&snapshot.id) {
            return Ok(false);
        }
        self.snapshots_by_parent
            .entry(snapshot.parent)
            .or_default()
            .insert(snapshot.id);
        self.snapshots.insert(snapshot.id, snapshot);
        Ok(true)
    }

    fn snapshot(&self, id: SnapshotId) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.snapshots.get(&id).copied())
    }

    fn snapshots_of(&self, parent: ObjectRef) -> Result<Vec<Snapshot>, StoreError> {
        Ok(self
            .snapshots_by_parent
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.snapshots.get(id).copied())
            .collect())
    }
}
