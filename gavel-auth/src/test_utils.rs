// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for engine tests: a role catalog matching the builtin
//! rule table and helpers for wiring small object graphs.

use gavel_core::{
    AccessMode, AclEntry, AclId, ObjectRef, ObjectType, PersonId, Relationship, RelationshipId,
    Role,
};
use gavel_store::{AclStore, MemoryStore, RelationshipStore, RoleStore};

/// Role catalog covering every role the builtin rule table names.
pub fn role_catalog() -> Vec<Role> {
    use ObjectType::*;

    let mut roles = vec![
        Role::new(1, "Program Managers", Program, AccessMode::RUD),
        Role::new(2, "Program Editors", Program, AccessMode::RU),
        Role::new(3, "Program Readers", Program, AccessMode::R),
        Role::new(4, "Audit Captains", Audit, AccessMode::RUD),
        Role::new(5, "Auditors", Audit, AccessMode::R),
        Role::new(6, "Assignees", Assessment, AccessMode::RU),
        Role::new(7, "Creators", Assessment, AccessMode::RU),
        Role::new(8, "Verifiers", Assessment, AccessMode::RU),
        Role::new(9, "Workflow Admins", Workflow, AccessMode::RUD),
        Role::new(10, "Workflow Members", Workflow, AccessMode::R),
    ];

    let mut id = roles.len() as u64;
    for kind in [Control, Objective, Regulation, Standard, Requirement, Issue] {
        id += 1;
        roles.push(Role::new(id, "Admin", kind, AccessMode::RUD));
        id += 1;
        roles.push(Role::new(id, "Primary Contacts", kind, AccessMode::RU));
    }
    roles
}

/// A memory store with the role catalog already seeded.
pub fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for role in role_catalog() {
        store.insert_role(role).unwrap();
    }
    store
}

/// Assign `role_name` to `person` on `object` and return the entry id.
pub fn grant(
    store: &mut MemoryStore,
    object: ObjectRef,
    role_name: &str,
    person: PersonId,
) -> AclId {
    let role = store
        .role_by_name(object.kind, role_name)
        .unwrap()
        .unwrap_or_else(|| panic!("no {role_name} role on {}", object.kind));
    let id = store.allocate_acl_id();
    store
        .insert_acl(AclEntry::direct(id, object, &role, person))
        .unwrap();
    id
}

/// Connect two objects and return the relationship id.
pub fn relate(
    store: &mut MemoryStore,
    id: RelationshipId,
    a: ObjectRef,
    b: ObjectRef,
) -> RelationshipId {
    assert!(store.insert_relationship(Relationship::new(id, a, b)).unwrap());
    id
}
