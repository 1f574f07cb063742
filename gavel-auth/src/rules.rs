// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use gavel_core::{AccessMode, ObjectType};
use serde::{Deserialize, Serialize};

/// One hop of the propagation rule forest.
///
/// A grant held on an object of the enclosing type crosses a relationship
/// edge to adjacent objects of type `to`, confers `grant` there, and
/// continues into `children` from the objects it reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropagationStep {
    pub to: ObjectType,
    pub grant: AccessMode,
    pub children: Vec<PropagationStep>,
}

impl PropagationStep {
    pub fn new(to: ObjectType, grant: AccessMode) -> Self {
        Self {
            to,
            grant,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<PropagationStep>) -> Self {
        self.children = children;
        self
    }
}

/// Which relationship traversals carry role grants to related objects,
/// keyed by the object type a role is defined on and the role's name.
///
/// Rule trees are finite and acyclic by construction, so propagation
/// terminates by structural recursion whatever the relationship graph
/// looks like. Within one level of a tree there is at most one step per
/// target type: replaying a derivation chain against the table must be
/// unambiguous.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: HashMap<ObjectType, HashMap<String, Vec<PropagationStep>>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object_type: ObjectType, role_name: &str, steps: Vec<PropagationStep>) {
        self.rules
            .entry(object_type)
            .or_default()
            .insert(role_name.to_string(), steps);
    }

    /// The rule forest for a role, empty when the role does not propagate.
    pub fn steps_for(&self, object_type: ObjectType, role_name: &str) -> &[PropagationStep] {
        self.rules
            .get(&object_type)
            .and_then(|roles| roles.get(role_name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The GRC rule table.
    pub fn builtin() -> Self {
        use ObjectType::*;

        let mut rules = RuleSet::new();

        rules.insert(Program, "Program Managers", program_steps(true));
        rules.insert(Program, "Program Editors", program_steps(true));
        rules.insert(Program, "Program Readers", program_steps(false));

        rules.insert(Audit, "Audit Captains", audit_steps(true));
        rules.insert(Audit, "Auditors", audit_steps(false));

        for role in ["Assignees", "Creators", "Verifiers"] {
            rules.insert(Assessment, role, assessment_steps());
        }

        rules.insert(Workflow, "Workflow Admins", workflow_steps(true));
        rules.insert(Workflow, "Workflow Members", workflow_steps(false));

        for kind in [Control, Objective, Regulation, Standard, Requirement, Issue] {
            for role in ["Admin", "Primary Contacts"] {
                rules.insert(
                    kind,
                    role,
                    vec![
                        step(Document, AccessMode::RU),
                        step(Comment, AccessMode::R),
                    ],
                );
            }
        }

        rules
    }
}

fn step(to: ObjectType, grant: AccessMode) -> PropagationStep {
    PropagationStep::new(to, grant)
}

/// Read-only reach into an object's attachments.
fn read_attachments() -> Vec<PropagationStep> {
    use ObjectType::*;
    vec![step(Document, AccessMode::R), step(Comment, AccessMode::R)]
}

/// Program roles reach the whole audit tree below the program, and the
/// directives and controls mapped to it read-only — those belong to
/// their own admins.
fn program_steps(full: bool) -> Vec<PropagationStep> {
    use ObjectType::*;

    let object_grant = if full { AccessMode::RUD } else { AccessMode::R };
    let attachment_grant = if full { AccessMode::RU } else { AccessMode::R };
    let snapshot_grant = if full { AccessMode::RU } else { AccessMode::R };

    vec![
        step(Audit, object_grant).with_children(vec![
            step(Assessment, object_grant).with_children(vec![
                step(Comment, AccessMode::R),
                step(Evidence, attachment_grant),
            ]),
            step(AssessmentTemplate, object_grant),
            step(Issue, object_grant).with_children(vec![
                step(Comment, AccessMode::R),
                step(Document, attachment_grant),
            ]),
            step(Snapshot, snapshot_grant),
            step(Evidence, attachment_grant),
        ]),
        step(Issue, object_grant).with_children(vec![
            step(Comment, AccessMode::R),
            step(Document, attachment_grant),
        ]),
        step(Control, AccessMode::R).with_children(read_attachments()),
        step(Objective, AccessMode::R).with_children(read_attachments()),
        step(Regulation, AccessMode::R).with_children(read_attachments()),
        step(Standard, AccessMode::R).with_children(read_attachments()),
        step(Requirement, AccessMode::R).with_children(read_attachments()),
        step(Document, attachment_grant),
        step(Comment, AccessMode::R),
    ]
}

/// Audit roles reach the assessments, issues, snapshots and evidence
/// inside the audit; issues are never deletable from here.
fn audit_steps(full: bool) -> Vec<PropagationStep> {
    use ObjectType::*;

    let object_grant = if full { AccessMode::RUD } else { AccessMode::R };
    let attachment_grant = if full { AccessMode::RU } else { AccessMode::R };

    vec![
        step(Assessment, object_grant).with_children(vec![
            step(Comment, AccessMode::R),
            step(Evidence, attachment_grant),
        ]),
        step(AssessmentTemplate, object_grant),
        step(Issue, attachment_grant).with_children(vec![
            step(Comment, AccessMode::R),
            step(Document, attachment_grant),
        ]),
        step(Snapshot, attachment_grant),
        step(Evidence, attachment_grant),
    ]
}

/// Assessment people see the conversation and the referenced state, and
/// may attach evidence.
fn assessment_steps() -> Vec<PropagationStep> {
    use ObjectType::*;

    vec![
        step(Comment, AccessMode::R),
        step(Evidence, AccessMode::RU),
        step(Snapshot, AccessMode::R),
        step(Issue, AccessMode::R),
    ]
}

fn workflow_steps(full: bool) -> Vec<PropagationStep> {
    use ObjectType::*;

    let object_grant = if full { AccessMode::RUD } else { AccessMode::R };

    vec![
        step(TaskGroup, object_grant).with_children(vec![
            step(CycleTask, object_grant)
                .with_children(vec![step(Comment, AccessMode::R)]),
        ]),
    ]
}
