// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::object::{ObjectRef, ObjectType};
use crate::relationship::RelationshipId;

pub type AclId = u64;
pub type RoleId = u64;
pub type PersonId = u64;

/// Key under which duplicate grants are detected: the same role held by the
/// same person on the same object with the same derivation parent is one
/// grant, however many times it is delivered.
pub type AclKey = (ObjectRef, RoleId, PersonId, Option<AclId>);

/// Capability flags a grant confers on the object it is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessMode {
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

impl AccessMode {
    /// Read only.
    pub const R: AccessMode = AccessMode {
        read: true,
        update: false,
        delete: false,
    };

    /// Read and update.
    pub const RU: AccessMode = AccessMode {
        read: true,
        update: true,
        delete: false,
    };

    /// Read, update and delete.
    pub const RUD: AccessMode = AccessMode {
        read: true,
        update: true,
        delete: true,
    };
}

/// A named access control role definable per object type.
///
/// Roles are the unit of assignment: a person holds a role on an object,
/// and the role's mode says what that assignment lets them do there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub object_type: ObjectType,
    pub mode: AccessMode,
}

impl Role {
    pub fn new(id: RoleId, name: &str, object_type: ObjectType, mode: AccessMode) -> Self {
        Self {
            id,
            name: name.to_string(),
            object_type,
            mode,
        }
    }
}

/// One access control grant: a role held by a person on an object.
///
/// Entries without a parent are direct assignments. Entries with a parent
/// were created by propagation from that parent and are deleted whenever
/// the parent is; `via` records the relationship edge the grant travelled
/// across when one was traversed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub id: AclId,
    pub object: ObjectRef,
    pub role_id: RoleId,
    pub person: PersonId,
    /// What this particular grant lets the person do on `object`. For a
    /// direct entry this mirrors the role's mode; for a derived entry it is
    /// the mode the propagation step conferred.
    pub mode: AccessMode,
    pub parent: Option<AclId>,
    pub via: Option<RelationshipId>,
}

impl AclEntry {
    /// A first-class assignment of `role` to `person` on `object`.
    pub fn direct(id: AclId, object: ObjectRef, role: &Role, person: PersonId) -> Self {
        Self {
            id,
            object,
            role_id: role.id,
            person,
            mode: role.mode,
            parent: None,
            via: None,
        }
    }

    /// A grant created by propagation from `parent`.
    pub fn derived(
        id: AclId,
        object: ObjectRef,
        role_id: RoleId,
        person: PersonId,
        mode: AccessMode,
        parent: AclId,
        via: Option<RelationshipId>,
    ) -> Self {
        Self {
            id,
            object,
            role_id,
            person,
            mode,
            parent: Some(parent),
            via,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.parent.is_some()
    }

    pub fn key(&self) -> AclKey {
        (self.object, self.role_id, self.person, self.parent)
    }
}
