use crate::error::SubmitError;
use crate::schema::{
    input_name, FieldUiState, FormAction, FormRuntimeContext, FormValues, RenderKind, SchemaFormConfig,
};
use crate::validation::{validate_schema, ValidationErrors, ValidationRegistry};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Lifecycle of one form instance.
///
/// `Pristine -> Editing -> {Valid, Invalid} -> Submitting -> {Submitted, SubmitFailed}`.
/// `Editing` is transient: every change is validated in the same call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Pristine,
    Editing,
    Valid,
    Invalid,
    Submitting,
    Submitted,
    SubmitFailed,
}

/// Everything a renderer needs for one input.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub name: String,
    pub input_name: String,
    pub label: String,
    pub kind: RenderKind,
    pub required: bool,
    pub disabled: bool,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One form: owns its value map exclusively.
pub struct FormInstance {
    schema: SchemaFormConfig,
    action: FormAction,
    values: FormValues,
    errors: ValidationErrors,
    status: FormStatus,
    registry: Arc<ValidationRegistry>,
}

impl FormInstance {
    pub fn new(schema: SchemaFormConfig, action: FormAction, initial_values: FormValues) -> Self {
        FormInstance {
            schema,
            action,
            values: initial_values,
            errors: ValidationErrors::new(),
            status: FormStatus::Pristine,
            registry: Arc::new(ValidationRegistry::new()),
        }
    }

    pub fn with_registry(mut self, registry: Arc<ValidationRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn action(&self) -> FormAction {
        self.action
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn schema(&self) -> &SchemaFormConfig {
        &self.schema
    }

    pub fn context(&self) -> FormRuntimeContext<'_> {
        FormRuntimeContext::new(self.action, &self.values)
    }

    /// Commit one value and revalidate the whole form against the new map.
    pub fn set_value(&mut self, field: impl Into<String>, value: Value) -> &ValidationErrors {
        self.values.insert(field.into(), value);
        self.status = FormStatus::Editing;
        self.validate()
    }

    pub fn set_values(&mut self, values: FormValues) -> &ValidationErrors {
        self.values.extend(values);
        self.status = FormStatus::Editing;
        self.validate()
    }

    /// Drop every value `keep` rejects. Errors are recomputed on the next change or validation.
    pub fn retain_values<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &Value) -> bool,
    {
        self.values.retain(|k, v| keep(k, v));
    }

    /// Swap in a new field set (e.g. after dependent fields changed). Values are kept.
    pub fn replace_schema(&mut self, schema: SchemaFormConfig) {
        self.schema = schema;
        if self.status != FormStatus::Pristine {
            self.validate();
        }
    }

    /// Full validation run; moves to `Valid` or `Invalid`.
    pub fn validate(&mut self) -> &ValidationErrors {
        self.errors = validate_schema(&self.registry, &self.schema, &self.values);
        self.status = if self.errors.is_empty() {
            FormStatus::Valid
        } else {
            FormStatus::Invalid
        };
        &self.errors
    }

    pub fn is_field_required(&self, field: &str) -> bool {
        self.schema.get(field).map(|f| f.is_required()).unwrap_or(false)
    }

    pub fn field_state(&self, field: &str) -> Option<FieldUiState> {
        let ctx = self.context();
        self.schema.get(field).map(|f| f.ui_state(&ctx))
    }

    /// Inputs in schema order, with form state evaluated against the current values.
    pub fn render(&self) -> Vec<RenderedField> {
        let ctx = self.context();
        self.schema
            .iter()
            .map(|(name, field)| {
                let label = field.display_label(name);
                let state = field.ui_state(&ctx);
                RenderedField {
                    name: name.clone(),
                    input_name: input_name(&field.field_type, name, &label),
                    kind: field.render_kind(),
                    required: field.is_required(),
                    disabled: state.disabled,
                    hidden: state.hidden,
                    value: self.values.get(name).cloned(),
                    error: self.errors.get(name).cloned(),
                    label,
                }
            })
            .collect()
    }

    /// Validate, then hand a copy of the values to `handler`. Values survive a failed submit.
    pub async fn submit<F, Fut, E>(&mut self, handler: F) -> Result<(), SubmitError>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if !self.validate().is_empty() {
            tracing::debug!("submit blocked by {} invalid field(s)", self.errors.len());
            return Err(SubmitError::Invalid(self.errors.clone()));
        }
        self.status = FormStatus::Submitting;
        match handler(self.values.clone()).await {
            Ok(()) => {
                self.status = FormStatus::Submitted;
                Ok(())
            }
            Err(e) => {
                self.status = FormStatus::SubmitFailed;
                Err(SubmitError::Handler(e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::schema::{FieldFormState, FieldSchema, FieldType, ValidationRule};
    use serde_json::json;
    use std::sync::Mutex;

    fn signup_schema() -> SchemaFormConfig {
        SchemaFormConfig::new()
            .field(
                "email",
                FieldSchema::new(FieldType::Email)
                    .validation(ValidationRule::new("required"))
                    .validation(ValidationRule::new("isEmail")),
            )
            .field(
                "password",
                FieldSchema::new(FieldType::Password).validation(ValidationRule::new("required")),
            )
            .field(
                "confirm",
                FieldSchema::new(FieldType::Password)
                    .label("Confirm Password")
                    .validation(
                        ValidationRule::new("matchOtherField")
                            .with_message("{name} must match")
                            .with_constraint("otherField", json!("password")),
                    )
                    .form_state(|ctx| FieldFormState::hidden(!ctx.is_set("password"))),
            )
            .field(
                "newsletter",
                FieldSchema::new(FieldType::Boolean).label("Send Newsletter"),
            )
    }

    #[test]
    fn starts_pristine_without_errors() {
        let form = FormInstance::new(signup_schema(), FormAction::Create, FormValues::new());
        assert_eq!(form.status(), FormStatus::Pristine);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn every_change_revalidates_whole_map() {
        let mut form = FormInstance::new(signup_schema(), FormAction::Create, FormValues::new());
        form.set_value("email", json!("ops@example.com"));
        assert_eq!(form.status(), FormStatus::Invalid);
        assert_eq!(form.errors()["password"], "Password is required");

        form.set_value("password", json!("hunter2"));
        form.set_value("confirm", json!("hunter2"));
        assert_eq!(form.status(), FormStatus::Valid);

        // changing the other side of a cross-field rule invalidates the dependent field
        form.set_value("password", json!("hunter3"));
        assert_eq!(form.errors()["confirm"], "Confirm Password must match");
    }

    #[test]
    fn render_applies_form_state_and_names() {
        let mut form = FormInstance::new(signup_schema(), FormAction::Create, FormValues::new());
        let fields = form.render();
        assert_eq!(
            fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["email", "password", "confirm", "newsletter"]
        );
        assert!(fields[0].required);
        assert!(fields[2].hidden);
        assert_eq!(fields[3].input_name, "send-newsletter");
        assert_eq!(fields[3].kind, RenderKind::Boolean);

        form.set_value("password", json!("x"));
        assert_eq!(form.field_state("confirm"), Some(FieldUiState { disabled: false, hidden: false }));
    }

    #[test]
    fn stored_schema_renders_in_declared_order() {
        let schema: SchemaFormConfig = serde_json::from_value(json!({
            "zeta": { "type": "text" },
            "alpha": { "type": "number" },
            "mid": { "type": "boolean", "label": "Is Mid" }
        }))
        .unwrap();
        let form = FormInstance::new(schema, FormAction::Create, FormValues::new());
        let names: Vec<_> = form.render().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn invalid_submit_never_calls_handler() {
        let mut form = FormInstance::new(signup_schema(), FormAction::Create, FormValues::new());
        let called = Mutex::new(false);
        let flag = &called;
        let result = form
            .submit(|_| async move {
                *flag.lock().unwrap() = true;
                Ok::<(), AppError>(())
            })
            .await;
        assert!(matches!(result, Err(SubmitError::Invalid(ref e)) if e.len() == 2));
        assert_eq!(form.status(), FormStatus::Invalid);
        assert!(!*called.lock().unwrap());
    }

    #[tokio::test]
    async fn successful_submit_passes_values() {
        let mut values = FormValues::new();
        values.insert("email".into(), json!("ops@example.com"));
        values.insert("password".into(), json!("pw"));
        values.insert("confirm".into(), json!("pw"));
        let mut form = FormInstance::new(signup_schema(), FormAction::Create, values);

        let seen = Mutex::new(None);
        let slot = &seen;
        form.submit(|v| async move {
            *slot.lock().unwrap() = v.get("email").cloned();
            Ok::<(), AppError>(())
        })
        .await
        .unwrap();
        assert_eq!(form.status(), FormStatus::Submitted);
        assert_eq!(*seen.lock().unwrap(), Some(json!("ops@example.com")));
    }

    #[tokio::test]
    async fn failed_submit_keeps_values_and_surfaces_error() {
        let mut values = FormValues::new();
        values.insert("email".into(), json!("ops@example.com"));
        values.insert("password".into(), json!("pw"));
        let mut form = FormInstance::new(signup_schema(), FormAction::Update, values);

        let result = form
            .submit(|_| async { Err(AppError::BadRequest("store unavailable".into())) })
            .await;
        match result {
            Err(SubmitError::Handler(e)) => assert!(e.to_string().contains("store unavailable")),
            other => panic!("expected handler error, got {:?}", other),
        }
        assert_eq!(form.status(), FormStatus::SubmitFailed);
        assert_eq!(form.values()["password"], json!("pw"));

        form.set_value("password", json!("pw2"));
        assert_eq!(form.status(), FormStatus::Valid);
    }
}
