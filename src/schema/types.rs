//! Form schema types: field definitions, validation rules, and the runtime context passed to
//! conditional form-state functions.

use crate::case::user_friendly_case;
use crate::schema::field_types::{resolve_render_kind, FieldType, RenderKind};
use crate::validation::rules_require;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Flat field name -> value map for one form instance.
pub type FormValues = HashMap<String, Value>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormAction {
    #[default]
    Create,
    Update,
}

/// One option of a select input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub label: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Selection {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Selection {
            label: label.into(),
            value: value.into(),
            color: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    pub validation_type: String,
    /// Falls back to the registry's default message for the type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub constraint: Map<String, Value>,
}

impl ValidationRule {
    pub fn new(validation_type: impl Into<String>) -> Self {
        ValidationRule {
            validation_type: validation_type.into(),
            error_message: None,
            constraint: Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_constraint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.constraint.insert(key.into(), value);
        self
    }
}

/// JavaScript-style truthiness, as form-state conditions are written against it.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Snapshot handed to every `formState` function. Missing keys read as `None`.
#[derive(Clone, Copy, Debug)]
pub struct FormRuntimeContext<'a> {
    pub action: FormAction,
    pub form_values: &'a FormValues,
}

impl<'a> FormRuntimeContext<'a> {
    pub fn new(action: FormAction, form_values: &'a FormValues) -> Self {
        FormRuntimeContext { action, form_values }
    }

    pub fn value(&self, field: &str) -> Option<&'a Value> {
        self.form_values.get(field)
    }

    pub fn is_set(&self, field: &str) -> bool {
        is_truthy(self.value(field))
    }
}

/// Overrides returned by a `formState` function; `None` keeps the schema default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldFormState {
    pub disabled: Option<bool>,
    pub hidden: Option<bool>,
}

impl FieldFormState {
    pub fn disabled(disabled: bool) -> Self {
        FieldFormState {
            disabled: Some(disabled),
            hidden: None,
        }
    }

    pub fn hidden(hidden: bool) -> Self {
        FieldFormState {
            disabled: None,
            hidden: Some(hidden),
        }
    }
}

/// Pure, total function from form context to field state overrides.
#[derive(Clone)]
pub struct FormStateFn(Arc<dyn Fn(&FormRuntimeContext<'_>) -> FieldFormState + Send + Sync>);

impl FormStateFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FormRuntimeContext<'_>) -> FieldFormState + Send + Sync + 'static,
    {
        FormStateFn(Arc::new(f))
    }

    pub fn call(&self, ctx: &FormRuntimeContext<'_>) -> FieldFormState {
        (self.0)(ctx)
    }
}

impl std::fmt::Debug for FormStateFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FormStateFn(..)")
    }
}

/// Resolved per-field UI state after applying `formState` over the static defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldUiState {
    pub disabled: bool,
    pub hidden: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selections: Vec<Selection>,
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(skip)]
    pub form_state: Option<FormStateFn>,
}

impl FieldSchema {
    pub fn new(field_type: FieldType) -> Self {
        FieldSchema {
            field_type,
            label: None,
            selections: Vec::new(),
            validations: Vec::new(),
            disabled: false,
            hidden: false,
            form_state: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn selections(mut self, selections: Vec<Selection>) -> Self {
        self.selections = selections;
        self
    }

    pub fn validation(mut self, rule: ValidationRule) -> Self {
        self.validations.push(rule);
        self
    }

    pub fn form_state<F>(mut self, f: F) -> Self
    where
        F: Fn(&FormRuntimeContext<'_>) -> FieldFormState + Send + Sync + 'static,
    {
        self.form_state = Some(FormStateFn::new(f));
        self
    }

    /// Explicit label, else the humanized field name.
    pub fn display_label(&self, name: &str) -> String {
        self.label.clone().unwrap_or_else(|| user_friendly_case(name))
    }

    pub fn is_required(&self) -> bool {
        rules_require(&self.validations)
    }

    pub fn render_kind(&self) -> RenderKind {
        resolve_render_kind(&self.field_type, &self.selections)
    }

    pub fn ui_state(&self, ctx: &FormRuntimeContext<'_>) -> FieldUiState {
        let overrides = self
            .form_state
            .as_ref()
            .map(|f| f.call(ctx))
            .unwrap_or_default();
        FieldUiState {
            disabled: overrides.disabled.unwrap_or(self.disabled),
            hidden: overrides.hidden.unwrap_or(self.hidden),
        }
    }
}

/// Ordered field name -> schema map. Insertion order is render order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaFormConfig {
    fields: IndexMap<String, FieldSchema>,
}

impl SchemaFormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.insert(name, schema);
        self
    }

    /// Insert or replace a field. A replaced field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, schema: FieldSchema) {
        self.fields.insert(name.into(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSchema)> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Extend<(String, FieldSchema)> for SchemaFormConfig {
    fn extend<T: IntoIterator<Item = (String, FieldSchema)>>(&mut self, iter: T) {
        self.fields.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_state_overrides_static_defaults() {
        let field = FieldSchema::new(FieldType::Text)
            .form_state(|ctx| FieldFormState::disabled(!ctx.is_set("trigger")));
        let mut values = FormValues::new();
        let ctx = FormRuntimeContext::new(FormAction::Create, &values);
        assert_eq!(field.ui_state(&ctx), FieldUiState { disabled: true, hidden: false });

        values.insert("trigger".into(), json!("create"));
        let ctx = FormRuntimeContext::new(FormAction::Create, &values);
        assert!(!field.ui_state(&ctx).disabled);
    }

    #[test]
    fn static_hidden_survives_partial_override() {
        let mut field = FieldSchema::new(FieldType::Text).form_state(|_| FieldFormState::disabled(true));
        field.hidden = true;
        let values = FormValues::new();
        let state = field.ui_state(&FormRuntimeContext::new(FormAction::Update, &values));
        assert_eq!(state, FieldUiState { disabled: true, hidden: true });
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(is_truthy(Some(&json!([]))));
    }

    #[test]
    fn schema_deserializes_without_form_state() {
        let schema: SchemaFormConfig = serde_json::from_value(json!({
            "format": {
                "type": "text",
                "validations": [{ "validationType": "required" }]
            },
            "enabled": { "type": "boolean", "label": "Is Enabled" }
        }))
        .unwrap();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["format", "enabled"]);
        let format = schema.get("format").unwrap();
        assert!(format.is_required());
        assert_eq!(format.display_label("format"), "Format");
        assert!(format.form_state.is_none());
    }

    #[test]
    fn replacing_a_field_keeps_position() {
        let mut schema = SchemaFormConfig::new()
            .field("a", FieldSchema::new(FieldType::Text))
            .field("b", FieldSchema::new(FieldType::Text));
        schema.insert("a", FieldSchema::new(FieldType::Number));
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(schema.get("a").unwrap().field_type, FieldType::Number);
    }
}
