// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use gavel_core::PersonId;
use tracing::debug;

use crate::permissions::Permissions;

/// Per-person memoisation of computed permissions dictionaries.
///
/// The cache is passive: it never recomputes by itself. Whoever mutates
/// the ACL table, the role catalog or the system role assignments is
/// responsible for invalidating the affected persons — the propagation
/// engine reports them as the `touched` set of its outcome.
#[derive(Debug, Default)]
pub struct PermissionCache {
    entries: HashMap<PersonId, Permissions>,
    hits: u64,
    misses: u64,
}

impl PermissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dictionary for `person`, or compute, store and
    /// return it.
    pub fn get_or_compute<F, E>(&mut self, person: PersonId, compute: F) -> Result<&Permissions, E>
    where
        F: FnOnce() -> Result<Permissions, E>,
    {
        match self.entries.entry(person) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(slot) => {
                self.misses += 1;
                let permissions = compute()?;
                Ok(slot.insert(permissions))
            }
        }
    }

    /// Drop the cached dictionary for one person. Returns whether one was
    /// cached.
    pub fn invalidate(&mut self, person: PersonId) -> bool {
        let dropped = self.entries.remove(&person).is_some();
        if dropped {
            debug!(person, "permissions cache invalidated");
        }
        dropped
    }

    /// Drop the cached dictionaries for every person in the iterator.
    pub fn invalidate_many(&mut self, persons: impl IntoIterator<Item = PersonId>) {
        for person in persons {
            self.invalidate(person);
        }
    }

    /// Drop everything. Used when the role catalog or the rule table
    /// itself changes.
    pub fn invalidate_all(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        debug!(dropped, "permissions cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
