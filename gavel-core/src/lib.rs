// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core data types for the gavel GRC engine: object identities, access
//! control roles and entries, relationship edges, and revisions with
//! backwards-compatible content reconstruction.

pub mod acl;
pub mod object;
pub mod relationship;
pub mod revision;

pub use acl::{AccessMode, AclEntry, AclId, AclKey, PersonId, Role, RoleId};
pub use object::{ObjectRef, ObjectType, UnknownObjectType};
pub use relationship::{Relationship, RelationshipId};
pub use revision::{
    CompatContext, Revision, RevisionAction, RevisionId, Snapshot, SnapshotId,
};
