// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::fmt;

use gavel_core::{ObjectType, PersonId, RoleId};
use gavel_store::{AclStore, RoleStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::access::Action;
use crate::condition::Condition;
use crate::permissions::Permissions;

#[derive(Debug, Error, PartialEq)]
pub enum ProviderError {
    #[error("person {person} holds a grant for unknown role {role}")]
    UnknownRole { person: PersonId, role: RoleId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The system-wide bootstrap roles a person holds independently of any
/// object-level grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemRole {
    /// Everything, everywhere.
    Administrator,

    /// Read and write on all editable types.
    Editor,

    /// Read on every type.
    Reader,

    /// May create objects; sees only what object-level grants reach.
    Creator,
}

impl SystemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemRole::Administrator => "Administrator",
            SystemRole::Editor => "Editor",
            SystemRole::Reader => "Reader",
            SystemRole::Creator => "Creator",
        }
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Object types a non-administrator can create and edit at the type
/// level. People are managed by administrators and snapshots only ever
/// come from the snapshotting machinery.
fn is_editable(kind: ObjectType) -> bool {
    !matches!(kind, ObjectType::Person | ObjectType::Snapshot)
}

/// Resolves a person's effective permissions dictionary by combining
/// their system role defaults with object-level grants from the ACL
/// table.
#[derive(Clone, Debug, Default)]
pub struct PermissionProvider {
    assignments: HashMap<PersonId, SystemRole>,
}

impl PermissionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, person: PersonId, role: SystemRole) {
        self.assignments.insert(person, role);
    }

    pub fn system_role(&self, person: PersonId) -> Option<SystemRole> {
        self.assignments.get(&person).copied()
    }

    /// Compute the effective permissions dictionary for a person.
    ///
    /// Administrators short-circuit to the all-allowing dictionary; for
    /// everyone else the system role contributes type-level grants and
    /// every ACL entry contributes its mode's actions on its object.
    /// Update and delete grants on audit-scoped objects carry the
    /// archived-audit freeze as a deny-condition.
    pub fn permissions_for<S>(&self, store: &S, person: PersonId) -> Result<Permissions, ProviderError>
    where
        S: AclStore + RoleStore,
    {
        if self.system_role(person) == Some(SystemRole::Administrator) {
            return Ok(Permissions::admin(person));
        }

        let mut permissions = Permissions::new(person);

        match self.system_role(person) {
            Some(SystemRole::Reader) => {
                for kind in ObjectType::ALL {
                    permissions.grant_unrestricted(Action::Read, kind);
                }
            }
            Some(SystemRole::Editor) => {
                for kind in ObjectType::ALL {
                    permissions.grant_unrestricted(Action::Read, kind);
                    if is_editable(kind) {
                        permissions.grant_unrestricted(Action::Create, kind);
                        permissions.grant_unrestricted(Action::Update, kind);
                        permissions.grant_unrestricted(Action::Delete, kind);
                    }
                }
            }
            Some(SystemRole::Creator) => {
                for kind in ObjectType::ALL {
                    if is_editable(kind) {
                        permissions.grant_unrestricted(Action::Create, kind);
                    }
                }
            }
            Some(SystemRole::Administrator) | None => {}
        }

        for entry in store.acls_for_person(person)? {
            // Referential integrity: a grant whose role has been retired
            // is a bug upstream, not something to silently skip.
            if store.role(entry.role_id)?.is_none() {
                return Err(ProviderError::UnknownRole {
                    person,
                    role: entry.role_id,
                });
            }

            for action in Action::granted_by(entry.mode) {
                permissions.grant_resource(action, entry.object);
                if entry.object.kind.is_audit_scoped()
                    && matches!(action, Action::Update | Action::Delete)
                {
                    permissions.forbid_when(
                        action,
                        entry.object.kind,
                        Condition::is("archived", true),
                    );
                }
            }
        }

        trace!(person, "permissions dictionary computed");
        Ok(permissions)
    }
}

#[cfg(test)]
mod tests {
    use gavel_core::{AccessMode, AclEntry, ObjectRef, ObjectType, Role};
    use gavel_store::{AclStore, MemoryStore, RoleStore};
    use serde_json::json;

    use crate::access::Action;

    use super::{PermissionProvider, ProviderError, SystemRole};

    #[test]
    fn reader_gets_read_everywhere_and_nothing_else() {
        let store = MemoryStore::new();
        let mut provider = PermissionProvider::new();
        provider.assign(100, SystemRole::Reader);

        let permissions = provider.permissions_for(&store, 100).unwrap();
        assert!(permissions.is_allowed(Action::Read, ObjectType::Program));
        assert!(permissions.is_allowed(Action::Read, ObjectType::Snapshot));
        assert!(!permissions.is_allowed(Action::Update, ObjectType::Program));
        assert!(!permissions.is_allowed(Action::Create, ObjectType::Program));
    }

    #[test]
    fn editor_cannot_touch_people_or_snapshots() {
        let store = MemoryStore::new();
        let mut provider = PermissionProvider::new();
        provider.assign(100, SystemRole::Editor);

        let permissions = provider.permissions_for(&store, 100).unwrap();
        assert!(permissions.is_allowed(Action::Update, ObjectType::Control));
        assert!(!permissions.is_allowed(Action::Update, ObjectType::Person));
        assert!(!permissions.is_allowed(Action::Create, ObjectType::Snapshot));
        assert!(permissions.is_allowed(Action::Read, ObjectType::Person));
    }

    #[test]
    fn acl_entries_contribute_object_level_grants() {
        let mut store = MemoryStore::new();
        let captains = Role::new(4, "Audit Captains", ObjectType::Audit, AccessMode::RUD);
        store.insert_role(captains.clone()).unwrap();
        let audit = ObjectRef::new(ObjectType::Audit, 1);
        store
            .insert_acl(AclEntry::direct(1, audit, &captains, 100))
            .unwrap();

        let mut provider = PermissionProvider::new();
        provider.assign(100, SystemRole::Creator);
        let permissions = provider.permissions_for(&store, 100).unwrap();

        assert!(permissions.is_allowed_for(Action::Update, audit, &json!({})));
        assert!(permissions.is_allowed_for(Action::Delete, audit, &json!({})));
        // The grant is on audit 1, not on audits in general.
        assert!(!permissions.is_allowed_for(
            Action::Update,
            ObjectRef::new(ObjectType::Audit, 2),
            &json!({}),
        ));
    }

    #[test]
    fn archived_audits_freeze_update_and_delete() {
        let mut store = MemoryStore::new();
        let captains = Role::new(4, "Audit Captains", ObjectType::Audit, AccessMode::RUD);
        store.insert_role(captains.clone()).unwrap();
        let audit = ObjectRef::new(ObjectType::Audit, 1);
        store
            .insert_acl(AclEntry::direct(1, audit, &captains, 100))
            .unwrap();

        let provider = PermissionProvider::new();
        let permissions = provider.permissions_for(&store, 100).unwrap();

        let archived = json!({ "archived": true });
        assert!(!permissions.is_allowed_for(Action::Update, audit, &archived));
        assert!(!permissions.is_allowed_for(Action::Delete, audit, &archived));
        // Reading an archived audit is still fine.
        assert!(permissions.is_allowed_for(Action::Read, audit, &archived));
    }

    #[test]
    fn administrator_short_circuits() {
        let store = MemoryStore::new();
        let mut provider = PermissionProvider::new();
        provider.assign(1, SystemRole::Administrator);

        let permissions = provider.permissions_for(&store, 1).unwrap();
        assert!(permissions.is_admin());
        assert!(permissions.is_allowed(Action::Delete, ObjectType::Person));
    }

    #[test]
    fn grants_for_retired_roles_are_an_error() {
        let mut store = MemoryStore::new();
        let captains = Role::new(4, "Audit Captains", ObjectType::Audit, AccessMode::RUD);
        store.insert_role(captains.clone()).unwrap();
        let audit = ObjectRef::new(ObjectType::Audit, 1);
        let mut entry = AclEntry::direct(1, audit, &captains, 100);
        entry.role_id = 99;
        store.insert_acl(entry).unwrap();

        let provider = PermissionProvider::new();
        assert_eq!(
            provider.permissions_for(&store, 100),
            Err(ProviderError::UnknownRole { person: 100, role: 99 }),
        );
    }
}
