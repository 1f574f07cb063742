// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable revisions of object state and the snapshots which freeze them
//! for audit-time reference.
//!
//! Stored revision content may predate several schema generations.
//! [`Revision::content`] rehydrates it into the current schema through a
//! pipeline of backwards-compatible population steps; the raw stored JSON
//! is never mutated.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::acl::Role;
use crate::object::ObjectRef;

mod compat;

pub type RevisionId = u64;
pub type SnapshotId = u64;

/// What happened to the resource at the point the revision was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevisionAction {
    Created,
    Modified,
    Deleted,
}

impl RevisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionAction::Created => "created",
            RevisionAction::Modified => "modified",
            RevisionAction::Deleted => "deleted",
        }
    }
}

impl fmt::Display for RevisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog view consulted while rehydrating stored content: the live role
/// catalog and the set of custom attribute definitions still in force.
#[derive(Clone, Copy, Debug)]
pub struct CompatContext<'a> {
    pub roles: &'a [Role],
    pub custom_attribute_ids: &'a HashSet<u64>,
}

/// An immutable JSON snapshot of an object's state at a point in time,
/// keyed by the resource it describes and the action which produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub resource: ObjectRef,
    pub action: RevisionAction,
    content: Value,
}

impl Revision {
    pub fn new(id: RevisionId, resource: ObjectRef, action: RevisionAction, content: Value) -> Self {
        Self {
            id,
            resource,
            action,
            content,
        }
    }

    /// The content exactly as stored, without any reconstruction.
    pub fn raw_content(&self) -> &Value {
        &self.content
    }

    /// The stored content rehydrated into the current schema.
    ///
    /// Each population step is total: malformed fragments are passed
    /// through (or dropped, where keeping them would produce entries the
    /// current schema cannot represent) rather than erroring. Content
    /// which is not a JSON object is returned as-is.
    pub fn content(&self, ctx: &CompatContext<'_>) -> Value {
        compat::populate(self.resource, &self.content, ctx)
    }
}

/// A frozen copy of a child object's revision, attached to an audit for
/// historical reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    /// The audit this snapshot belongs to.
    pub parent: ObjectRef,
    /// The object whose state was frozen.
    pub child: ObjectRef,
    pub revision_id: RevisionId,
}

impl Snapshot {
    pub fn new(id: SnapshotId, parent: ObjectRef, child: ObjectRef, revision_id: RevisionId) -> Self {
        Self {
            id,
            parent,
            child,
            revision_id,
        }
    }

    /// The snapshot's own identity as an object, usable as a relationship
    /// endpoint and an ACL target.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(crate::object::ObjectType::Snapshot, self.id)
    }
}
