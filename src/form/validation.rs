use std::sync::LazyLock;

use jsonschema::{Validator, validator_for};
use schemars::{JsonSchema, schema_for};
use serde::Serialize;
use serde_json::Value;

use crate::{
    domain::{FieldDescriptor, IndexDescriptor, OTHER_FORMAT, formats},
    error::FieldIssue,
};

use super::operation::FormScope;

pub const OTHER_FORMAT_REQUIRED: &str =
    "Other format is required when \"Other\" is selected as the format.";

static FIELD_VALIDATOR: LazyLock<Validator> = LazyLock::new(compile::<FieldDescriptor>);
static INDEX_VALIDATOR: LazyLock<Validator> = LazyLock::new(compile::<IndexDescriptor>);

fn compile<T: JsonSchema>() -> Validator {
    let schema = serde_json::to_value(schema_for!(T)).expect("descriptor schema serializes");
    validator_for(&schema).expect("descriptor schema compiles")
}

/// Check a field form, mapping problems onto the inputs of `scope`.
pub fn validate_field(field: &FieldDescriptor, scope: FormScope) -> Vec<FieldIssue> {
    let mut issues = schema_issues(&FIELD_VALIDATOR, field, scope);
    if field.uses_other_format() {
        if field.format_other.as_deref().is_none_or(str::is_empty) {
            issues.push(FieldIssue::new(
                scope.input("format_other"),
                OTHER_FORMAT_REQUIRED,
            ));
        }
    } else if !field.format.is_empty() && !formats(field.kind).contains(&field.format) {
        issues.push(FieldIssue::new(
            scope.input("format"),
            format!(
                "`{}` is not a supported format for {} fields; pick one of the listed formats or \"{OTHER_FORMAT}\".",
                field.format, field.kind
            ),
        ));
    }
    issues
}

pub fn validate_index(index: &IndexDescriptor, scope: FormScope) -> Vec<FieldIssue> {
    schema_issues(&INDEX_VALIDATOR, index, scope)
}

fn schema_issues<T: Serialize>(validator: &Validator, entry: &T, scope: FormScope) -> Vec<FieldIssue> {
    let value = match serde_json::to_value(entry) {
        Ok(value) => value,
        Err(err) => return vec![FieldIssue::new(scope.pointer(), err.to_string())],
    };
    validator
        .iter_errors(&value)
        .map(|error| {
            let path = error.instance_path.to_string();
            let message = match value.pointer(&path) {
                Some(Value::String(text)) if text.is_empty() => {
                    format!("{} field is required.", label_for(&path))
                }
                _ => error.to_string(),
            };
            FieldIssue::new(scope.input(&path), message)
        })
        .collect()
}

fn label_for(path: &str) -> String {
    let key = path.trim_start_matches('/');
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
        None => "Value".to_string(),
    }
}
