// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::object::ObjectRef;

pub type RelationshipId = u64;

/// A directed edge between two objects.
///
/// The direction only records which side created the mapping; access
/// propagation and reachability treat edges as undirected and traverse
/// them both ways. At most one edge exists per object pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub source: ObjectRef,
    pub destination: ObjectRef,
    /// Set when this edge was created by the automapping machinery as a
    /// consequence of another relationship, rather than by a person.
    pub automapping_id: Option<RelationshipId>,
}

impl Relationship {
    pub fn new(id: RelationshipId, source: ObjectRef, destination: ObjectRef) -> Self {
        Self {
            id,
            source,
            destination,
            automapping_id: None,
        }
    }

    pub fn automapped(
        id: RelationshipId,
        source: ObjectRef,
        destination: ObjectRef,
        automapping_id: RelationshipId,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            automapping_id: Some(automapping_id),
        }
    }

    pub fn is_automapped(&self) -> bool {
        self.automapping_id.is_some()
    }

    pub fn touches(&self, object: ObjectRef) -> bool {
        self.source == object || self.destination == object
    }

    /// The other endpoint when `of` is one of the two endpoints.
    pub fn counterpart(&self, of: ObjectRef) -> Option<ObjectRef> {
        if self.source == of {
            Some(self.destination)
        } else if self.destination == of {
            Some(self.source)
        } else {
            None
        }
    }
}
