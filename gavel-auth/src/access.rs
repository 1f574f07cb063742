// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use gavel_core::AccessMode;
use serde::{Deserialize, Serialize};

/// The four actions a permission can grant.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// The actions an access mode confers. Create is never granted by a
    /// mode: object creation is a type-level permission, not something a
    /// grant on an existing object can carry.
    pub fn granted_by(mode: AccessMode) -> impl Iterator<Item = Action> {
        [
            mode.read.then_some(Action::Read),
            mode.update.then_some(Action::Update),
            mode.delete.then_some(Action::Delete),
        ]
        .into_iter()
        .flatten()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
