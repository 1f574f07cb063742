// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, HashSet};

use gavel_core::{ObjectRef, ObjectType, PersonId};
use serde_json::Value;

use crate::access::Action;
use crate::condition::Condition;

/// The grants one `(action, object type)` cell of a permissions
/// dictionary holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceSet {
    /// Type-wide grant, irrespective of specific resources or contexts.
    pub unrestricted: bool,

    /// Ids of individual objects the action is granted on.
    pub resources: HashSet<u64>,

    /// Context ids the action is granted within.
    pub contexts: HashSet<u64>,

    /// Allow-conditions: when any are present, at least one must hold for
    /// the resource at check time.
    pub conditions: Vec<Condition>,

    /// Deny-conditions: when any holds for the resource, the cell denies
    /// outright, before anything else is consulted.
    pub forbids: Vec<Condition>,
}

/// A person's effective permissions dictionary: for every action, the
/// object types it is granted on and the resources, contexts and
/// conditions narrowing the grant.
#[derive(Clone, Debug, PartialEq)]
pub struct Permissions {
    person: PersonId,
    is_admin: bool,
    grants: HashMap<Action, HashMap<ObjectType, ResourceSet>>,
}

impl Permissions {
    pub fn new(person: PersonId) -> Self {
        Self {
            person,
            is_admin: false,
            grants: Default::default(),
        }
    }

    /// A dictionary which allows everything.
    pub fn admin(person: PersonId) -> Self {
        Self {
            person,
            is_admin: true,
            grants: Default::default(),
        }
    }

    pub fn person(&self) -> PersonId {
        self.person
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    fn cell_mut(&mut self, action: Action, kind: ObjectType) -> &mut ResourceSet {
        self.grants
            .entry(action)
            .or_default()
            .entry(kind)
            .or_default()
    }

    pub fn cell(&self, action: Action, kind: ObjectType) -> Option<&ResourceSet> {
        self.grants.get(&action)?.get(&kind)
    }

    pub fn grant_unrestricted(&mut self, action: Action, kind: ObjectType) {
        self.cell_mut(action, kind).unrestricted = true;
    }

    pub fn grant_resource(&mut self, action: Action, object: ObjectRef) {
        self.cell_mut(action, object.kind).resources.insert(object.id);
    }

    pub fn grant_context(&mut self, action: Action, kind: ObjectType, context: u64) {
        self.cell_mut(action, kind).contexts.insert(context);
    }

    pub fn require_condition(&mut self, action: Action, kind: ObjectType, condition: Condition) {
        self.cell_mut(action, kind).conditions.push(condition);
    }

    pub fn forbid_when(&mut self, action: Action, kind: ObjectType, condition: Condition) {
        let cell = self.cell_mut(action, kind);
        if !cell.forbids.contains(&condition) {
            cell.forbids.push(condition);
        }
    }

    /// Type-level check: is the action granted on the type as a whole.
    pub fn is_allowed(&self, action: Action, kind: ObjectType) -> bool {
        if self.is_admin {
            return true;
        }
        self.cell(action, kind).is_some_and(|cell| cell.unrestricted)
    }

    /// Resource-level check against the resource's JSON representation.
    ///
    /// Deny-conditions are consulted first and veto even an admin
    /// dictionary; then membership (type-wide, by resource id, or by the
    /// resource's `context_id`); then allow-conditions.
    pub fn is_allowed_for(&self, action: Action, resource: ObjectRef, resource_json: &Value) -> bool {
        let cell = self.cell(action, resource.kind);

        if let Some(cell) = cell {
            if cell.forbids.iter().any(|forbid| forbid.satisfied(resource_json)) {
                return false;
            }
        }

        if self.is_admin {
            return true;
        }

        let Some(cell) = cell else {
            return false;
        };

        let context = resource_json.get("context_id").and_then(Value::as_u64);
        let member = cell.unrestricted
            || cell.resources.contains(&resource.id)
            || context.is_some_and(|context| cell.contexts.contains(&context));
        if !member {
            return false;
        }

        cell.conditions.is_empty()
            || cell
                .conditions
                .iter()
                .any(|condition| condition.satisfied(resource_json))
    }
}
