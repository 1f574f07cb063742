// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for the gavel GRC engine and an in-memory reference
//! implementation. A relational backend plugs in behind the same traits.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::{AclStore, RelationshipStore, RevisionStore, RoleStore, StoreError};
