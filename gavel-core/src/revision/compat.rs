// SPDX-License-Identifier: MIT OR Apache-2.0

// Backwards-compatible population of stored revision content.
//
// Every step takes the content map after the previous step and brings one
// corner of it up to the current schema. Steps are total: anything they
// cannot interpret is passed through, except where keeping a fragment
// would produce entries the current schema cannot represent (a grant for
// a role that no longer exists, a value for a deleted custom attribute
// definition), in which case the fragment is dropped.

use serde_json::{Map, Value, json};
use tracing::trace;

use crate::acl::Role;
use crate::object::{ObjectRef, ObjectType};

use super::CompatContext;

/// Legacy person fields and the role their occupants map onto.
const LEGACY_ROLE_FIELDS: [(&str, &str); 3] = [
    ("owners", "Admin"),
    ("contact", "Primary Contacts"),
    ("secondary_contact", "Secondary Contacts"),
];

pub(super) fn populate(resource: ObjectRef, content: &Value, ctx: &CompatContext<'_>) -> Value {
    let Value::Object(stored) = content else {
        return content.clone();
    };

    let mut map = stored.clone();
    populate_acl(resource, &mut map, ctx);
    populate_folder(&mut map);
    populate_labels(&mut map);
    populate_status(resource.kind, &mut map);
    populate_review(resource.kind, &mut map);
    populate_custom_attributes(&mut map, ctx);
    Value::Object(map)
}

/// Extract a person id from a person stub, which historically appears
/// either as `{"id": N}` or `{"href": ..., "id": N, "type": "Person"}`.
fn person_id(stub: &Value) -> Option<u64> {
    stub.get("id")?.as_u64()
}

fn find_role<'a>(ctx: &'a CompatContext<'_>, kind: ObjectType, name: &str) -> Option<&'a Role> {
    ctx.roles
        .iter()
        .find(|role| role.object_type == kind && role.name == name)
}

/// Bring `access_control_list` up to the current schema, or synthesize it
/// from legacy person fields when the content predates ACLs entirely.
fn populate_acl(resource: ObjectRef, map: &mut Map<String, Value>, ctx: &CompatContext<'_>) {
    match map.remove("access_control_list") {
        Some(Value::Array(entries)) => {
            let mut kept = Vec::with_capacity(entries.len());
            for mut entry in entries {
                let Some(obj) = entry.as_object_mut() else {
                    trace!(%resource, "dropping non-object acl entry");
                    continue;
                };
                let Some(role_id) = obj.get("ac_role_id").and_then(Value::as_u64) else {
                    trace!(%resource, "dropping acl entry without a role id");
                    continue;
                };
                if !ctx.roles.iter().any(|role| role.id == role_id) {
                    trace!(%resource, role_id, "dropping acl entry for retired role");
                    continue;
                }
                if obj.get("person_id").and_then(Value::as_u64).is_none() {
                    if let Some(pid) = obj.get("person").and_then(person_id) {
                        obj.insert("person_id".to_string(), pid.into());
                    }
                }
                kept.push(entry);
            }
            map.insert("access_control_list".to_string(), Value::Array(kept));
        }
        Some(other) => {
            // Not a list; put it back untouched.
            map.insert("access_control_list".to_string(), other);
        }
        None => {
            let mut entries = Vec::new();
            for (field, role_name) in LEGACY_ROLE_FIELDS {
                let Some(role) = find_role(ctx, resource.kind, role_name) else {
                    continue;
                };
                let Some(value) = map.get(field) else {
                    continue;
                };
                let stubs: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    stub @ Value::Object(_) => vec![stub],
                    _ => continue,
                };
                for stub in stubs {
                    let Some(pid) = person_id(stub) else {
                        continue;
                    };
                    entries.push(json!({
                        "ac_role_id": role.id,
                        "person_id": pid,
                        "person": { "id": pid, "type": "Person" },
                    }));
                }
            }
            map.insert("access_control_list".to_string(), Value::Array(entries));
        }
    }
}

/// Collapse the legacy `folders` list to the scalar `folder` field.
fn populate_folder(map: &mut Map<String, Value>) {
    if map.contains_key("folder") {
        map.remove("folders");
        return;
    }

    let folder = match map.remove("folders") {
        Some(Value::Array(items)) => items
            .into_iter()
            .next()
            .and_then(|item| match item {
                Value::String(name) => Some(name),
                Value::Object(obj) => obj.get("id").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .unwrap_or_default(),
        _ => String::new(),
    };
    map.insert("folder".to_string(), Value::String(folder));
}

/// Lift a legacy scalar `label` into the current list-of-objects form.
fn populate_labels(map: &mut Map<String, Value>) {
    if map.contains_key("labels") {
        map.remove("label");
        return;
    }

    let Some(label) = map.remove("label") else {
        return;
    };
    let labels = match label {
        Value::String(name) if !name.is_empty() => json!([{ "id": Value::Null, "name": name }]),
        _ => json!([]),
    };
    map.insert("labels".to_string(), labels);
}

/// Map deprecated workflow states onto the current vocabulary.
fn populate_status(kind: ObjectType, map: &mut Map<String, Value>) {
    let mapped = match map.get("status").and_then(Value::as_str) {
        None | Some("") => kind.default_status(),
        Some("Open") | Some("Started") => Some("In Progress"),
        Some("Finished") | Some("Final") => Some("Completed"),
        Some(_) => None,
    };
    if let Some(status) = mapped {
        map.insert("status".to_string(), status.into());
    }
}

/// Backfill review tracking for reviewable kinds that predate it.
fn populate_review(kind: ObjectType, map: &mut Map<String, Value>) {
    if kind.is_reviewable() && !map.contains_key("review_status") {
        map.insert("review_status".to_string(), "Unreviewed".into());
    }
}

/// Custom attribute value hygiene: rename the legacy key, drop values
/// whose definition was deleted, default the attribute object link.
fn populate_custom_attributes(map: &mut Map<String, Value>, ctx: &CompatContext<'_>) {
    if !map.contains_key("custom_attribute_values") {
        if let Some(legacy) = map.remove("custom_attributes") {
            map.insert("custom_attribute_values".to_string(), legacy);
        }
    }

    match map.remove("custom_attribute_values") {
        Some(Value::Array(values)) => {
            let mut kept = Vec::with_capacity(values.len());
            for mut value in values {
                let Some(obj) = value.as_object_mut() else {
                    continue;
                };
                let Some(cad_id) = obj.get("custom_attribute_id").and_then(Value::as_u64) else {
                    continue;
                };
                if !ctx.custom_attribute_ids.contains(&cad_id) {
                    trace!(cad_id, "dropping value for deleted custom attribute definition");
                    continue;
                }
                obj.entry("attribute_object_id").or_insert(Value::Null);
                kept.push(value);
            }
            map.insert("custom_attribute_values".to_string(), kept.into());
        }
        Some(other) => {
            map.insert("custom_attribute_values".to_string(), other);
        }
        None => {}
    }
}
