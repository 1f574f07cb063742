// SPDX-License-Identifier: MIT OR Apache-2.0

//! The propagation engine: computes the transitive closure of derived
//! grants when ACL entries or relationships appear, and tears it down
//! when they go away.

use std::collections::{BTreeSet, HashSet};

use gavel_core::{AclEntry, AclId, ObjectRef, ObjectType, PersonId, RelationshipId, RoleId};
use gavel_store::{AclStore, RelationshipStore, RoleStore, StoreError};
use petgraph::prelude::DiGraphMap;
use thiserror::Error;
use tracing::debug;

use crate::graph::relationship_graph;
use crate::rules::{PropagationStep, RuleSet};

#[derive(Debug, Error, PartialEq)]
pub enum PropagationError {
    #[error("unknown acl entry {0}")]
    UnknownEntry(AclId),

    #[error("unknown role {0}")]
    UnknownRole(RoleId),

    #[error("unknown relationship {0}")]
    UnknownRelationship(RelationshipId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a propagation or revocation call did to the ACL table.
///
/// `touched` is the set of persons whose effective permissions changed;
/// it drives targeted cache invalidation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropagationOutcome {
    pub created: Vec<AclId>,
    pub deleted: Vec<AclId>,
    pub touched: BTreeSet<PersonId>,
}

impl PropagationOutcome {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Work already done within one engine call, so that overlapping
/// derivation chains and repeated delivery do not re-walk the graph.
type Visited = HashSet<(AclId, RelationshipId, ObjectType)>;

/// The propagation engine.
///
/// All methods are idempotent: delivering the same entries or the same
/// relationship twice inserts nothing the second time, because the store
/// refuses duplicate `(object, role, person, parent)` keys — the same
/// discipline a relational backend gets from a unique index.
#[derive(Clone, Copy, Debug)]
pub struct Propagator<'a> {
    rules: &'a RuleSet,
}

impl<'a> Propagator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Fan newly created (or re-delivered) ACL entries out across the
    /// relationship graph according to the rule table.
    pub fn propagate_entries<S>(
        &self,
        store: &mut S,
        entry_ids: &[AclId],
    ) -> Result<PropagationOutcome, PropagationError>
    where
        S: AclStore + RelationshipStore + RoleStore,
    {
        let graph = relationship_graph(&store.relationships()?);
        let mut outcome = PropagationOutcome::default();
        let mut visited = Visited::new();

        for &id in entry_ids {
            let entry = store.acl(id)?.ok_or(PropagationError::UnknownEntry(id))?;
            let steps = self.subtree_for(store, &entry)?;
            self.fan_out(store, &graph, &entry, &steps, &mut visited, &mut outcome)?;
        }

        debug!(
            entries = entry_ids.len(),
            created = outcome.created.len(),
            "acl propagation finished"
        );
        Ok(outcome)
    }

    /// React to a newly created relationship: every grant already sitting
    /// on either endpoint whose rule subtree crosses this edge fans out
    /// across it, and onwards from there.
    pub fn propagate_relationship<S>(
        &self,
        store: &mut S,
        relationship_id: RelationshipId,
    ) -> Result<PropagationOutcome, PropagationError>
    where
        S: AclStore + RelationshipStore + RoleStore,
    {
        let edge = store
            .relationship(relationship_id)?
            .ok_or(PropagationError::UnknownRelationship(relationship_id))?;
        let graph = relationship_graph(&store.relationships()?);
        let mut outcome = PropagationOutcome::default();
        let mut visited = Visited::new();

        for holder in [edge.source, edge.destination] {
            // Counterpart is always present for an endpoint.
            let Some(target) = edge.counterpart(holder) else {
                continue;
            };
            for entry in store.acls_on(holder)? {
                let steps = self.subtree_for(store, &entry)?;
                for step in &steps {
                    if step.to != target.kind {
                        continue;
                    }
                    self.cross_edge(
                        store,
                        &graph,
                        &entry,
                        step,
                        target,
                        edge.id,
                        &mut visited,
                        &mut outcome,
                    )?;
                }
            }
        }

        debug!(
            relationship = relationship_id,
            created = outcome.created.len(),
            "relationship propagation finished"
        );
        Ok(outcome)
    }

    /// Delete an entry together with its derived subtree.
    pub fn revoke_entry<S>(
        &self,
        store: &mut S,
        id: AclId,
    ) -> Result<PropagationOutcome, PropagationError>
    where
        S: AclStore,
    {
        if store.acl(id)?.is_none() {
            return Err(PropagationError::UnknownEntry(id));
        }

        let mut outcome = PropagationOutcome::default();
        self.delete_subtree(store, id, &mut outcome)?;

        debug!(entry = id, deleted = outcome.deleted.len(), "grant revoked");
        Ok(outcome)
    }

    /// Delete a relationship and every derived entry it carried, each
    /// with its own derived subtree.
    pub fn revoke_relationship<S>(
        &self,
        store: &mut S,
        relationship_id: RelationshipId,
    ) -> Result<PropagationOutcome, PropagationError>
    where
        S: AclStore + RelationshipStore,
    {
        if store.relationship(relationship_id)?.is_none() {
            return Err(PropagationError::UnknownRelationship(relationship_id));
        }

        let mut outcome = PropagationOutcome::default();
        for entry in store.acls_via(relationship_id)? {
            // The entry may already be gone as part of a sibling's
            // subtree when a rule crosses the same edge twice.
            self.delete_subtree(store, entry.id, &mut outcome)?;
        }
        store.delete_relationship(relationship_id)?;

        debug!(
            relationship = relationship_id,
            deleted = outcome.deleted.len(),
            "relationship revoked"
        );
        Ok(outcome)
    }

    /// Replay an entry's derivation chain against the rule table to find
    /// the subtree still ahead of it.
    ///
    /// The chain is climbed to its direct root, whose role names the rule
    /// forest; each recorded hop then descends one level. An entry whose
    /// chain has walked off the table has nothing left to propagate.
    fn subtree_for<S>(
        &self,
        store: &S,
        entry: &AclEntry,
    ) -> Result<Vec<PropagationStep>, PropagationError>
    where
        S: AclStore + RoleStore,
    {
        let mut hops = Vec::new();
        let mut current = entry.clone();
        while let Some(parent_id) = current.parent {
            hops.push(current.object.kind);
            current = store
                .acl(parent_id)?
                .ok_or(PropagationError::UnknownEntry(parent_id))?;
        }

        let role = store
            .role(current.role_id)?
            .ok_or(PropagationError::UnknownRole(current.role_id))?;
        let mut steps = self.rules.steps_for(current.object.kind, &role.name).to_vec();
        for hop in hops.iter().rev() {
            let Some(step) = steps.iter().find(|step| step.to == *hop) else {
                return Ok(Vec::new());
            };
            steps = step.children.clone();
        }
        Ok(steps)
    }

    /// Fan one entry out across every matching edge of every step.
    fn fan_out<S>(
        &self,
        store: &mut S,
        graph: &DiGraphMap<ObjectRef, RelationshipId>,
        parent: &AclEntry,
        steps: &[PropagationStep],
        visited: &mut Visited,
        outcome: &mut PropagationOutcome,
    ) -> Result<(), PropagationError>
    where
        S: AclStore,
    {
        for step in steps {
            for (_, neighbour, &edge_id) in graph.edges(parent.object) {
                if neighbour.kind != step.to {
                    continue;
                }
                self.cross_edge(store, graph, parent, step, neighbour, edge_id, visited, outcome)?;
            }
        }
        Ok(())
    }

    /// Create one derived entry across one edge and recurse into the
    /// step's children from it.
    #[allow(clippy::too_many_arguments)]
    fn cross_edge<S>(
        &self,
        store: &mut S,
        graph: &DiGraphMap<ObjectRef, RelationshipId>,
        parent: &AclEntry,
        step: &PropagationStep,
        target: ObjectRef,
        edge_id: RelationshipId,
        visited: &mut Visited,
        outcome: &mut PropagationOutcome,
    ) -> Result<(), PropagationError>
    where
        S: AclStore,
    {
        if !visited.insert((parent.id, edge_id, step.to)) {
            return Ok(());
        }

        // Re-delivery: the row already exists, but edges added since it
        // was first propagated may extend its subtree, so keep walking.
        let key = (target, parent.role_id, parent.person, Some(parent.id));
        if let Some(existing) = store.acl_by_key(&key)? {
            return self.fan_out(store, graph, &existing, &step.children, visited, outcome);
        }

        let id = store.allocate_acl_id();
        let derived = AclEntry::derived(
            id,
            target,
            parent.role_id,
            parent.person,
            step.grant,
            parent.id,
            Some(edge_id),
        );
        if store.insert_acl(derived.clone())? {
            debug!(
                parent = parent.id,
                object = %target,
                person = parent.person,
                "grant propagated"
            );
            outcome.created.push(id);
            outcome.touched.insert(parent.person);
            self.fan_out(store, graph, &derived, &step.children, visited, outcome)?;
        }
        Ok(())
    }

    /// Depth-first deletion of an entry and everything derived from it.
    fn delete_subtree<S>(
        &self,
        store: &mut S,
        id: AclId,
        outcome: &mut PropagationOutcome,
    ) -> Result<(), PropagationError>
    where
        S: AclStore,
    {
        let Some(entry) = store.acl(id)? else {
            return Ok(());
        };
        for child in store.acl_children(id)? {
            self.delete_subtree(store, child.id, outcome)?;
        }
        if store.delete_acl(id)? {
            outcome.deleted.push(id);
            outcome.touched.insert(entry.person);
        }
        Ok(())
    }
}
