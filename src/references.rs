//! Logical-id reference analysis and rewriting.
//!
//! A reference is a `Ref`, the resource half of a `GetAtt`, a `${Id}` or
//! `${Id.Attribute}` placeholder inside a `Sub` template, or a `DependsOn`
//! entry. Pseudo parameters are never references.

use std::collections::HashMap;
use std::ops::Range;

use indexmap::{IndexMap, IndexSet};

use crate::intrinsics::{is_pseudo_parameter, FunctionName};
use crate::resource::Resource;
use crate::template::Template;
use crate::value::{Literal, Value, ValueMap};

/// Key under which references made from the Outputs section are grouped.
pub const OUTPUTS_KEY: &str = "Outputs";

/// Finds all references in a template.
///
/// Returns a map from the referencing resource id (or [`OUTPUTS_KEY`]) to the
/// ids it references, both in template order. Entries that reference nothing
/// are left out. Ids need not resolve within the template.
pub fn find_all_references(template: &Template) -> IndexMap<String, IndexSet<String>> {
    let mut references = IndexMap::new();

    for (logical_id, resource) in &template.resources {
        let mut found: IndexSet<String> = resource.depends_on.iter().cloned().collect();
        for value in resource_values(resource) {
            collect_references(value, &mut found);
        }
        if !found.is_empty() {
            references.insert(logical_id.clone(), found);
        }
    }

    let mut found = IndexSet::new();
    for output in template.outputs.values() {
        collect_references(&output.value, &mut found);
        if let Some(name) = &output.export_name {
            collect_references(name, &mut found);
        }
    }
    if !found.is_empty() {
        references.insert(OUTPUTS_KEY.to_string(), found);
    }

    references
}

/// References made by a single value tree.
pub fn value_references(value: &Value) -> IndexSet<String> {
    let mut found = IndexSet::new();
    collect_references(value, &mut found);
    found
}

/// Rewrites every reference to an old id into its new id, in place.
///
/// All renames apply at once, so swapping two ids works. Resource ids
/// themselves are not renamed; see [`Template::rename_resource`].
pub fn update_template_references(template: &mut Template, renames: &HashMap<String, String>) {
    if renames.is_empty() {
        return;
    }
    for resource in template.resources.values_mut() {
        for dependency in resource.depends_on.iter_mut() {
            if let Some(new_id) = renames.get(dependency.as_str()) {
                *dependency = new_id.clone();
            }
        }
        for value in resource.property_values_mut() {
            update_value_references(value, renames);
        }
        let attributes = [
            resource.metadata.as_mut(),
            resource.creation_policy.as_mut(),
            resource.update_policy.as_mut(),
        ];
        for value in attributes.into_iter().flatten() {
            update_value_references(value, renames);
        }
    }
    for output in template.outputs.values_mut() {
        update_value_references(&mut output.value, renames);
        if let Some(name) = output.export_name.as_mut() {
            update_value_references(name, renames);
        }
    }
    for condition in template.conditions.values_mut() {
        update_value_references(condition, renames);
    }
}

/// Rewrites references inside one value tree.
pub fn update_value_references(value: &mut Value, renames: &HashMap<String, String>) {
    value.walk_mut(&mut |value| {
        if let Value::Call(function, args) = value {
            update_call(*function, args, renames);
        }
    });
}

/// Placeholder names in a `Sub` template, in order, including the
/// attribute part (`Bucket.Arn`). `${!Literal}` escapes are skipped.
pub fn sub_variables(template: &str) -> Vec<&str> {
    placeholders(template)
        .into_iter()
        .map(|range| &template[range])
        .collect()
}

fn resource_values(resource: &Resource) -> impl Iterator<Item = &Value> {
    resource
        .property_values()
        .into_iter()
        .chain(resource.metadata.iter())
        .chain(resource.creation_policy.iter())
        .chain(resource.update_policy.iter())
}

fn collect_references(value: &Value, found: &mut IndexSet<String>) {
    value.walk(&mut |value| {
        let Some((function, args)) = value.as_call() else {
            return;
        };
        match (function, args) {
            (FunctionName::Ref, [target]) => {
                if let Some(name) = target.as_str() {
                    if !is_pseudo_parameter(name) {
                        found.insert(name.to_string());
                    }
                }
            }
            (FunctionName::GetAtt, [target, _]) => {
                if let Some(name) = target.as_str() {
                    found.insert(name.to_string());
                }
            }
            (FunctionName::Sub, [text, rest @ ..]) => {
                let Some(text) = text.as_str() else {
                    return;
                };
                let bound = rest.first().and_then(Value::as_mapping);
                for variable in sub_variables(text) {
                    if is_bound(bound, variable) {
                        continue;
                    }
                    let logical_id = variable_logical_id(variable);
                    if !is_pseudo_parameter(logical_id) {
                        found.insert(logical_id.to_string());
                    }
                }
            }
            _ => {}
        }
    });
}

fn update_call(function: FunctionName, args: &mut [Value], renames: &HashMap<String, String>) {
    match (function, args) {
        (FunctionName::Ref | FunctionName::GetAtt, [Value::Literal(Literal::String(target)), ..]) => {
            if let Some(new_id) = renames.get(target.as_str()) {
                if !is_pseudo_parameter(target) {
                    *target = new_id.clone();
                }
            }
        }
        (FunctionName::Sub, [Value::Literal(Literal::String(text)), rest @ ..]) => {
            let bound = rest.first().and_then(Value::as_mapping);
            if let Some(updated) = rename_placeholders(text, bound, renames) {
                *text = updated;
            }
        }
        _ => {}
    }
}

/// Byte ranges of placeholder bodies, skipping escapes and an unterminated
/// trailing `${`.
fn placeholders(template: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = template[cursor..].find("${") {
        let start = cursor + offset + 2;
        let Some(len) = template[start..].find('}') else {
            break;
        };
        let end = start + len;
        if !template[start..end].starts_with('!') {
            ranges.push(start..end);
        }
        cursor = end + 1;
    }
    ranges
}

fn variable_logical_id(variable: &str) -> &str {
    variable.split_once('.').map_or(variable, |(logical_id, _)| logical_id)
}

// Names declared in the Sub variable map shadow template ids.
fn is_bound(bound: Option<&ValueMap>, variable: &str) -> bool {
    bound.is_some_and(|map| map.contains_key(variable))
}

fn rename_placeholders(
    template: &str,
    bound: Option<&ValueMap>,
    renames: &HashMap<String, String>,
) -> Option<String> {
    let mut updated = String::with_capacity(template.len());
    let mut copied = 0;
    for range in placeholders(template) {
        let variable = &template[range.clone()];
        if is_bound(bound, variable) {
            continue;
        }
        let logical_id = variable_logical_id(variable);
        let Some(new_id) = renames.get(logical_id) else {
            continue;
        };
        if is_pseudo_parameter(logical_id) {
            continue;
        }
        updated.push_str(&template[copied..range.start]);
        updated.push_str(new_id);
        updated.push_str(&variable[logical_id.len()..]);
        copied = range.end;
    }
    if copied == 0 {
        return None;
    }
    updated.push_str(&template[copied..]);
    Some(updated)
}
