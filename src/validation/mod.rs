//! Field validation: rule registry, message templates, and first-failure validation runs.

mod rules;
mod template;

pub use rules::{is_empty, RuleFn, RuleInput, ValidationKind, ValidationRegistry};
pub use template::{compile, message_params};

use crate::schema::{FormValues, SchemaFormConfig, ValidationRule};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Field name -> compiled message, in field order. Fields that pass are absent.
pub type ValidationErrors = IndexMap<String, String>;

const FALLBACK_MESSAGE: &str = "{name} is invalid";

/// Whether a rule list contains a `required` rule.
pub fn rules_require(rules: &[ValidationRule]) -> bool {
    rules
        .iter()
        .any(|r| r.validation_type == ValidationKind::Required.as_str())
}

pub fn is_field_required(validations: &HashMap<String, Vec<ValidationRule>>, field: &str) -> bool {
    validations.get(field).map(|r| rules_require(r)).unwrap_or(false)
}

/// Run `rules` in declared order and compile the message of the first one that fails.
pub fn field_error(
    registry: &ValidationRegistry,
    label: &str,
    rules: &[ValidationRule],
    values: &FormValues,
    field: &str,
) -> Option<String> {
    let value = values.get(field);
    let failed = rules.iter().find(|rule| {
        registry.evaluate(&rule.validation_type, value, &rule.constraint, values)
    })?;
    let template = failed
        .error_message
        .as_deref()
        .or_else(|| registry.default_message(&failed.validation_type))
        .unwrap_or(FALLBACK_MESSAGE);
    Some(compile(template, &message_params(label, &failed.constraint)))
}

/// Validate `fields` against a per-field rule map. At most one message per field.
pub fn run_validation_errors<L>(
    registry: &ValidationRegistry,
    fields: &[String],
    validations: &HashMap<String, Vec<ValidationRule>>,
    label_of: L,
    values: &FormValues,
) -> ValidationErrors
where
    L: Fn(&str) -> String,
{
    let mut errors = ValidationErrors::new();
    for field in fields {
        let Some(rules) = validations.get(field).filter(|r| !r.is_empty()) else {
            continue;
        };
        if let Some(message) = field_error(registry, &label_of(field), rules, values, field) {
            errors.insert(field.clone(), message);
        }
    }
    errors
}

/// Validate every field of a schema against the full value map.
pub fn validate_schema(
    registry: &ValidationRegistry,
    schema: &SchemaFormConfig,
    values: &FormValues,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for (name, field) in schema.iter() {
        if field.validations.is_empty() {
            continue;
        }
        let label = field.display_label(name);
        if let Some(message) = field_error(registry, &label, &field.validations, values, name) {
            errors.insert(name.clone(), message);
        }
    }
    errors
}
