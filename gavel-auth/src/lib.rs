// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access-control propagation and permission resolution for GRC objects.
//!
//! Grants held on an object travel across relationship edges to related
//! and child objects following a static rule table: a program manager's
//! role reaches the program's audits, the audits' assessments, their
//! comments and evidence, and the snapshots frozen for audit-time
//! reference. The [`propagation`] module computes that transitive closure
//! as derived ACL entries with parent linkage, and keeps it consistent
//! when grants or relationships are revoked.
//!
//! On top of the ACL table, the [`provider`] module resolves a person's
//! effective permissions dictionary (action → object type → resources,
//! contexts and conditions) and the [`cache`] module memoises it per
//! person until a mutation invalidates it.

pub mod access;
pub mod cache;
pub mod condition;
mod graph;
pub mod permissions;
pub mod propagation;
pub mod provider;
pub mod rules;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
#[cfg(test)]
mod tests;

pub use access::Action;
pub use cache::PermissionCache;
pub use condition::Condition;
pub use permissions::{Permissions, ResourceSet};
pub use propagation::{PropagationError, PropagationOutcome, Propagator};
pub use provider::{PermissionProvider, ProviderError, SystemRole};
pub use rules::{PropagationStep, RuleSet};
