// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing an object type name which is not part of the
/// GRC vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown object type: {0}")]
pub struct UnknownObjectType(pub String);

/// All GRC object kinds which participate in access control, propagation or
/// revision tracking.
///
/// The canonical CamelCase names are the ones used in stored revision
/// content and relationship rows, so `Display` and `FromStr` round-trip
/// them exactly.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    Program,
    Audit,
    Assessment,
    AssessmentTemplate,
    Control,
    Objective,
    Regulation,
    Standard,
    Requirement,
    Issue,
    Document,
    Evidence,
    Comment,
    Snapshot,
    Workflow,
    TaskGroup,
    CycleTask,
    Person,
    Proposal,
    Review,
}

impl ObjectType {
    /// Every known object type.
    pub const ALL: [ObjectType; 20] = [
        ObjectType::Program,
        ObjectType::Audit,
        ObjectType::Assessment,
        ObjectType::AssessmentTemplate,
        ObjectType::Control,
        ObjectType::Objective,
        ObjectType::Regulation,
        ObjectType::Standard,
        ObjectType::Requirement,
        ObjectType::Issue,
        ObjectType::Document,
        ObjectType::Evidence,
        ObjectType::Comment,
        ObjectType::Snapshot,
        ObjectType::Workflow,
        ObjectType::TaskGroup,
        ObjectType::CycleTask,
        ObjectType::Person,
        ObjectType::Proposal,
        ObjectType::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Program => "Program",
            ObjectType::Audit => "Audit",
            ObjectType::Assessment => "Assessment",
            ObjectType::AssessmentTemplate => "AssessmentTemplate",
            ObjectType::Control => "Control",
            ObjectType::Objective => "Objective",
            ObjectType::Regulation => "Regulation",
            ObjectType::Standard => "Standard",
            ObjectType::Requirement => "Requirement",
            ObjectType::Issue => "Issue",
            ObjectType::Document => "Document",
            ObjectType::Evidence => "Evidence",
            ObjectType::Comment => "Comment",
            ObjectType::Snapshot => "Snapshot",
            ObjectType::Workflow => "Workflow",
            ObjectType::TaskGroup => "TaskGroup",
            ObjectType::CycleTask => "CycleTask",
            ObjectType::Person => "Person",
            ObjectType::Proposal => "Proposal",
            ObjectType::Review => "Review",
        }
    }

    /// Object types which track a review state in their revision content.
    pub fn is_reviewable(&self) -> bool {
        matches!(
            self,
            ObjectType::Control
                | ObjectType::Objective
                | ObjectType::Regulation
                | ObjectType::Standard
                | ObjectType::Requirement
        )
    }

    /// Object types which live inside an audit context and are frozen once
    /// the audit is archived.
    pub fn is_audit_scoped(&self) -> bool {
        matches!(
            self,
            ObjectType::Audit
                | ObjectType::Assessment
                | ObjectType::AssessmentTemplate
                | ObjectType::Issue
                | ObjectType::Document
                | ObjectType::Evidence
                | ObjectType::Comment
                | ObjectType::Snapshot
        )
    }

    /// The status a revision falls back to when the stored content carries
    /// none, for object kinds which have a status lifecycle at all.
    pub fn default_status(&self) -> Option<&'static str> {
        match self {
            ObjectType::Assessment | ObjectType::CycleTask => Some("Not Started"),
            ObjectType::Audit => Some("Planned"),
            ObjectType::Workflow => Some("Draft"),
            ObjectType::Control
            | ObjectType::Objective
            | ObjectType::Regulation
            | ObjectType::Standard
            | ObjectType::Requirement
            | ObjectType::Issue => Some("Draft"),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = UnknownObjectType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownObjectType(s.to_string()))
    }
}

/// Identifies one object row: its kind and numeric id.
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectRef {
    pub kind: ObjectType,
    pub id: u64,
}

impl ObjectRef {
    pub fn new(kind: ObjectType, id: u64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
