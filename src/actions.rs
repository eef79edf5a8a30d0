//! Action automation form: maps the nested `ActionInstance.configuration` onto flat
//! `configuration__*` form fields and back, and regenerates those fields when the selected
//! integration action changes.

use crate::case::user_friendly_case;
use crate::error::{AppError, SubmitError};
use crate::form::FormInstance;
use crate::schema::{
    FieldFormState, FieldSchema, FieldType, FormAction, FormValues, SchemaFormConfig, Selection,
    ValidationRule,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;

pub const CONFIGURATION_FORM_PREFIX: &str = "configuration__";

const CONFIGURATION_KEY: &str = "configuration";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Data event that fires an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataEventAction {
    Create,
    Update,
    Delete,
}

impl DataEventAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DataEventAction::Create => "create",
            DataEventAction::Update => "update",
            DataEventAction::Delete => "delete",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionInstance {
    pub trigger: DataEventAction,
    pub integration: String,
    pub action: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub configuration: Map<String, Value>,
}

/// An integration that can be activated (e.g. slack, smtp).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationsList {
    pub key: String,
    pub title: String,
}

/// One action an integration implements, with the parameters it needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationImplementation {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub configuration_schema: IndexMap<String, FieldSchema>,
}

/// Source of the implementations an integration offers.
#[async_trait]
pub trait IntegrationImplementations: Send + Sync {
    async fn implementations(&self, integration: &str) -> Result<Vec<IntegrationImplementation>, AppError>;
}

/// Fixed implementations list keyed by integration.
#[derive(Clone, Debug, Default)]
pub struct StaticImplementations {
    by_integration: std::collections::HashMap<String, Vec<IntegrationImplementation>>,
}

impl StaticImplementations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, integration: impl Into<String>, implementations: Vec<IntegrationImplementation>) -> Self {
        self.by_integration.insert(integration.into(), implementations);
        self
    }
}

#[async_trait]
impl IntegrationImplementations for StaticImplementations {
    async fn implementations(&self, integration: &str) -> Result<Vec<IntegrationImplementation>, AppError> {
        Ok(self.by_integration.get(integration).cloned().unwrap_or_default())
    }
}

/// Lift `configuration.{k}` to top-level `configuration__{k}`. The nested map is removed.
/// A non-object `configuration` is left as is.
pub fn unflatten_configuration(mut values: FormValues) -> FormValues {
    match values.remove(CONFIGURATION_KEY) {
        Some(Value::Object(configuration)) => {
            for (key, value) in configuration {
                values.insert(format!("{}{}", CONFIGURATION_FORM_PREFIX, key), value);
            }
        }
        Some(other) => {
            tracing::debug!("configuration is not an object, leaving it unflattened: {}", other);
            values.insert(CONFIGURATION_KEY.to_string(), other);
        }
        None => {}
    }
    values
}

/// Collect `configuration__{k}` keys back into a `configuration` map; other keys pass through.
pub fn flatten_configuration(values: FormValues) -> FormValues {
    let mut configuration = Map::new();
    let mut out = FormValues::new();
    for (key, value) in values {
        match key.strip_prefix(CONFIGURATION_FORM_PREFIX) {
            Some(stripped) => {
                configuration.insert(stripped.to_string(), value);
            }
            None => {
                out.insert(key, value);
            }
        }
    }
    out.insert(CONFIGURATION_KEY.to_string(), Value::Object(configuration));
    out
}

/// Builds and drives the action instance form for one entity.
pub struct ActionForm {
    form: FormInstance,
    entity: String,
    integrations: Vec<IntegrationsList>,
    activated: Vec<String>,
    implementations: Vec<IntegrationImplementation>,
}

impl ActionForm {
    pub fn new(
        form_action: FormAction,
        entity: impl Into<String>,
        integrations: Vec<IntegrationsList>,
        activated: Vec<String>,
        initial_values: FormValues,
    ) -> Self {
        let entity = entity.into();
        let mut values = unflatten_configuration(initial_values);
        values.insert("entity".into(), Value::String(entity.clone()));
        let mut action_form = ActionForm {
            form: FormInstance::new(SchemaFormConfig::new(), form_action, values),
            entity,
            integrations,
            activated,
            implementations: Vec::new(),
        };
        action_form.rebuild_fields();
        action_form
    }

    pub fn form(&self) -> &FormInstance {
        &self.form
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Integration whose implementations the form currently needs, if one is selected.
    pub fn selected_integration(&self) -> Option<&str> {
        self.form.values().get("integration").and_then(Value::as_str)
    }

    /// Supply the implementations of the selected integration and regenerate the fields.
    pub fn set_implementations(&mut self, implementations: Vec<IntegrationImplementation>) {
        self.implementations = implementations;
        self.rebuild_fields();
    }

    /// Fetch implementations for the selected integration from `source`.
    pub async fn load_implementations<S>(&mut self, source: &S) -> Result<(), AppError>
    where
        S: IntegrationImplementations + ?Sized,
    {
        let implementations = match self.selected_integration() {
            Some(integration) => source.implementations(integration).await?,
            None => Vec::new(),
        };
        self.set_implementations(implementations);
        Ok(())
    }

    /// Changing the integration drops the selected action, its configuration values and the
    /// loaded implementations; call `load_implementations` for the new integration afterwards.
    pub fn set_value(&mut self, field: &str, value: Value) {
        if field == "integration" && self.form.values().get(field) != Some(&value) {
            self.implementations.clear();
            self.form
                .retain_values(|key, _| key != "action" && !key.starts_with(CONFIGURATION_FORM_PREFIX));
        }
        self.form.set_value(field, value);
        if field == "integration" || field == "action" {
            self.rebuild_fields();
        }
    }

    /// Flatten the values into an `ActionInstance` and hand it to `handler`.
    pub async fn submit<F, Fut, E>(&mut self, handler: F) -> Result<(), SubmitError>
    where
        F: FnOnce(ActionInstance) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.form
            .submit(|values| async move {
                let nested = Value::Object(flatten_configuration(values).into_iter().collect());
                let instance: ActionInstance = serde_json::from_value(nested)?;
                handler(instance).await.map_err(|e| -> BoxError { e.into() })
            })
            .await
    }

    fn integration_title(&self, key: &str) -> Option<&str> {
        self.integrations
            .iter()
            .find(|i| i.key == key)
            .map(|i| i.title.as_str())
    }

    fn rebuild_fields(&mut self) {
        let fields = self.fields();
        self.form.replace_schema(fields);
    }

    /// Trigger, integration and action selectors, then one field per configuration parameter of
    /// the selected action.
    pub fn fields(&self) -> SchemaFormConfig {
        let activated_options = self
            .activated
            .iter()
            .filter_map(|key| {
                self.integration_title(key)
                    .map(|title| Selection::new(title, key.as_str()))
            })
            .collect();
        let action_options = self
            .implementations
            .iter()
            .map(|i| Selection::new(i.label.as_str(), i.key.as_str()))
            .collect();

        let mut schema = SchemaFormConfig::new()
            .field(
                "trigger",
                FieldSchema::new(FieldType::Selection)
                    .label("Trigger")
                    .selections(vec![
                        Selection::new("On Create", DataEventAction::Create.as_str()),
                        Selection::new("On Update", DataEventAction::Update.as_str()),
                        Selection::new("On Delete", DataEventAction::Delete.as_str()),
                    ])
                    .validation(ValidationRule::new("required")),
            )
            .field(
                "integration",
                FieldSchema::new(FieldType::Selection)
                    .label("Integration")
                    .selections(activated_options)
                    .validation(ValidationRule::new("required"))
                    .form_state(|ctx| {
                        FieldFormState::disabled(ctx.action == FormAction::Update || !ctx.is_set("trigger"))
                    }),
            )
            .field(
                "action",
                FieldSchema::new(FieldType::Selection)
                    .label("Action")
                    .selections(action_options)
                    .validation(ValidationRule::new("required"))
                    .form_state(|ctx| FieldFormState::disabled(!ctx.is_set("trigger"))),
            );

        let values = self.form.values();
        let selected_action = values.get("action").and_then(Value::as_str);
        let title = self
            .selected_integration()
            .and_then(|key| self.integration_title(key))
            .unwrap_or_default();
        if let Some(implementation) = selected_action
            .and_then(|action| self.implementations.iter().find(|i| i.key == action))
        {
            for (key, field) in &implementation.configuration_schema {
                let field = field
                    .clone()
                    .label(format!("{}: {}", title, user_friendly_case(key)));
                schema.insert(format!("{}{}", CONFIGURATION_FORM_PREFIX, key), field);
            }
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormStatus;
    use serde_json::json;
    use std::sync::Mutex;

    fn values(v: Value) -> FormValues {
        v.as_object().cloned().unwrap().into_iter().collect()
    }

    fn slack() -> Vec<IntegrationImplementation> {
        let mut schema = IndexMap::new();
        schema.insert(
            "channel".to_string(),
            FieldSchema::new(FieldType::Text).validation(ValidationRule::new("required")),
        );
        schema.insert("message_template".to_string(), FieldSchema::new(FieldType::TextArea));
        vec![IntegrationImplementation {
            key: "send_message".into(),
            label: "Send Message".into(),
            configuration_schema: schema,
        }]
    }

    fn integrations() -> Vec<IntegrationsList> {
        vec![
            IntegrationsList {
                key: "slack".into(),
                title: "Slack".into(),
            },
            IntegrationsList {
                key: "smtp".into(),
                title: "SMTP".into(),
            },
        ]
    }

    #[test]
    fn unflatten_lifts_configuration() {
        let out = unflatten_configuration(values(json!({
            "integration": "slack",
            "configuration": {"channel": "#ops"}
        })));
        assert_eq!(out, values(json!({"integration": "slack", "configuration__channel": "#ops"})));
    }

    #[test]
    fn unflatten_keeps_non_object_configuration() {
        let original = values(json!({"integration": "slack", "configuration": "raw"}));
        assert_eq!(unflatten_configuration(original.clone()), original);
    }

    #[test]
    fn flatten_collects_configuration() {
        let out = flatten_configuration(values(json!({
            "integration": "slack",
            "configuration__channel": "#eng"
        })));
        assert_eq!(
            out,
            values(json!({"integration": "slack", "configuration": {"channel": "#eng"}}))
        );
    }

    #[test]
    fn flatten_inverts_unflatten() {
        let samples = [
            json!({"configuration": {}}),
            json!({"trigger": "create", "configuration": {"a": 1, "b": [1, 2], "c": {"nested": true}}}),
            json!({"integration": "smtp", "action": "send", "configuration": {"to": "ops@example.com", "cc": null}}),
        ];
        for sample in samples {
            let original = values(sample);
            assert_eq!(flatten_configuration(unflatten_configuration(original.clone())), original);
        }
    }

    #[test]
    fn selectors_wait_for_trigger() {
        let mut form = ActionForm::new(FormAction::Create, "orders", integrations(), vec!["slack".into()], FormValues::new());
        assert!(form.form().field_state("integration").unwrap().disabled);
        assert!(form.form().field_state("action").unwrap().disabled);

        form.set_value("trigger", json!("create"));
        assert!(!form.form().field_state("integration").unwrap().disabled);
        assert!(!form.form().field_state("action").unwrap().disabled);
    }

    #[test]
    fn integration_locked_on_update() {
        let initial = values(json!({"trigger": "update", "integration": "slack", "action": "send_message"}));
        let form = ActionForm::new(FormAction::Update, "orders", integrations(), vec!["slack".into()], initial);
        assert!(form.form().field_state("integration").unwrap().disabled);
        assert!(!form.form().field_state("action").unwrap().disabled);
    }

    #[test]
    fn only_activated_integrations_are_offered() {
        let form = ActionForm::new(FormAction::Create, "orders", integrations(), vec!["smtp".into()], FormValues::new());
        let fields = form.fields();
        let options = &fields.get("integration").unwrap().selections;
        assert_eq!(options, &vec![Selection::new("SMTP", "smtp")]);
    }

    #[tokio::test]
    async fn configuration_fields_follow_selected_action() {
        let source = StaticImplementations::new().with("slack", slack());
        let mut form = ActionForm::new(FormAction::Create, "orders", integrations(), vec!["slack".into()], FormValues::new());
        form.set_value("trigger", json!("create"));
        form.set_value("integration", json!("slack"));
        form.load_implementations(&source).await.unwrap();
        assert!(!form.form().schema().contains("configuration__channel"));

        form.set_value("action", json!("send_message"));
        let schema = form.form().schema();
        let names: Vec<_> = schema.names().collect();
        assert_eq!(
            names,
            vec!["trigger", "integration", "action", "configuration__channel", "configuration__message_template"]
        );
        assert_eq!(
            schema.get("configuration__message_template").unwrap().label.as_deref(),
            Some("Slack: Message Template")
        );
        assert_eq!(form.form().errors()["configuration__channel"], "Slack: Channel is required");
    }

    #[tokio::test]
    async fn switching_integration_drops_previous_action() {
        let smtp = vec![IntegrationImplementation {
            key: "send_mail".into(),
            label: "Send Mail".into(),
            configuration_schema: IndexMap::new(),
        }];
        let source = StaticImplementations::new().with("slack", slack()).with("smtp", smtp);
        let mut form = ActionForm::new(
            FormAction::Create,
            "orders",
            integrations(),
            vec!["slack".into(), "smtp".into()],
            FormValues::new(),
        );
        form.set_value("trigger", json!("create"));
        form.set_value("integration", json!("slack"));
        form.load_implementations(&source).await.unwrap();
        form.set_value("action", json!("send_message"));
        form.set_value("configuration__channel", json!("#ops"));
        assert!(form.form().schema().contains("configuration__channel"));

        form.set_value("integration", json!("smtp"));
        let names: Vec<_> = form.form().schema().names().collect();
        assert_eq!(names, vec!["trigger", "integration", "action"]);
        assert!(!form.form().values().contains_key("action"));
        assert!(!form.form().values().contains_key("configuration__channel"));
        assert!(form.fields().get("action").unwrap().selections.is_empty());

        form.load_implementations(&source).await.unwrap();
        assert_eq!(
            form.fields().get("action").unwrap().selections,
            vec![Selection::new("Send Mail", "send_mail")]
        );
    }

    #[tokio::test]
    async fn reselecting_same_integration_keeps_action() {
        let mut form = ActionForm::new(FormAction::Create, "orders", integrations(), vec!["slack".into()], FormValues::new());
        form.set_value("trigger", json!("create"));
        form.set_value("integration", json!("slack"));
        form.set_implementations(slack());
        form.set_value("action", json!("send_message"));
        form.set_value("integration", json!("slack"));
        assert_eq!(form.form().values()["action"], json!("send_message"));
        assert!(form.form().schema().contains("configuration__channel"));
    }

    #[tokio::test]
    async fn submit_produces_nested_instance() {
        let initial = values(json!({
            "trigger": "update",
            "integration": "slack",
            "action": "send_message",
            "configuration": {"channel": "#ops"}
        }));
        let mut form = ActionForm::new(FormAction::Update, "orders", integrations(), vec!["slack".into()], initial);
        form.set_implementations(slack());
        assert_eq!(form.form().values()["configuration__channel"], json!("#ops"));

        form.set_value("configuration__channel", json!("#eng"));
        let submitted = Mutex::new(None);
        let slot = &submitted;
        form.submit(|instance| async move {
            *slot.lock().unwrap() = Some(instance);
            Ok::<(), AppError>(())
        })
        .await
        .unwrap();

        let instance = submitted.into_inner().unwrap().unwrap();
        assert_eq!(instance.trigger, DataEventAction::Update);
        assert_eq!(instance.entity, "orders");
        assert_eq!(instance.configuration, json!({"channel": "#eng"}).as_object().cloned().unwrap());
        assert_eq!(form.form().status(), FormStatus::Submitted);
    }

    #[tokio::test]
    async fn submit_blocked_until_configuration_complete() {
        let initial = values(json!({"trigger": "create", "integration": "slack", "action": "send_message"}));
        let mut form = ActionForm::new(FormAction::Create, "orders", integrations(), vec!["slack".into()], initial);
        form.set_implementations(slack());
        let result = form.submit(|_| async { Ok::<(), AppError>(()) }).await;
        assert!(matches!(result, Err(SubmitError::Invalid(ref e)) if e.contains_key("configuration__channel")));
    }
}
