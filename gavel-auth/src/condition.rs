// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative authorization conditions evaluated against a resource's
/// JSON representation at check time.
///
/// Conditions let a permission depend on the state of the resource it is
/// checked against rather than only on its identity. A missing property
/// never satisfies a condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// The property equals the expected value.
    Is { property: String, value: Value },

    /// The property is one of the expected values.
    In { property: String, values: Vec<Value> },

    /// The list property contains the expected value.
    Contains { property: String, value: Value },
}

impl Condition {
    pub fn is(property: &str, value: impl Into<Value>) -> Self {
        Condition::Is {
            property: property.to_string(),
            value: value.into(),
        }
    }

    pub fn within(property: &str, values: Vec<Value>) -> Self {
        Condition::In {
            property: property.to_string(),
            values,
        }
    }

    pub fn contains(property: &str, value: impl Into<Value>) -> Self {
        Condition::Contains {
            property: property.to_string(),
            value: value.into(),
        }
    }

    /// Whether the condition holds for the given resource.
    pub fn satisfied(&self, resource: &Value) -> bool {
        match self {
            Condition::Is { property, value } => resource.get(property) == Some(value),
            Condition::In { property, values } => resource
                .get(property)
                .is_some_and(|actual| values.contains(actual)),
            Condition::Contains { property, value } => resource
                .get(property)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        }
    }
}
