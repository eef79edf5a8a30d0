//! Create/update form schema for an entity, assembled from its stored column configuration.

use crate::config::ConfigKey;
use crate::crud::{visible_columns, CrudScreen};
use crate::error::AppError;
use crate::schema::{FieldSchema, FieldType, FormAction, SchemaFormConfig, Selection, ValidationRule};
use crate::service::ConfigurationService;
use std::collections::HashMap;

/// Column configuration of one entity as read from the configuration store.
#[derive(Clone, Debug, Default)]
pub struct EntityFormSettings {
    pub types: HashMap<String, String>,
    pub selections: HashMap<String, Vec<Selection>>,
    pub labels: HashMap<String, String>,
    pub validations: HashMap<String, Vec<ValidationRule>>,
    pub hidden: Vec<String>,
}

fn screen_for(action: FormAction) -> CrudScreen {
    match action {
        FormAction::Create => CrudScreen::Create,
        FormAction::Update => CrudScreen::Update,
    }
}

impl EntityFormSettings {
    pub async fn load(
        service: &ConfigurationService,
        entity: &str,
        action: FormAction,
    ) -> Result<Self, AppError> {
        let entity = Some(entity);
        let hidden = match screen_for(action).hidden_columns_key() {
            Some(key) => service.show_as(key, entity).await?,
            None => Vec::new(),
        };
        Ok(EntityFormSettings {
            types: service.show_as(ConfigKey::EntityColumnsTypes, entity).await?,
            selections: service.show_as(ConfigKey::EntitySelections, entity).await?,
            labels: service.show_as(ConfigKey::EntityColumnsLabels, entity).await?,
            validations: service.show_as(ConfigKey::EntityValidations, entity).await?,
            hidden,
        })
    }

    fn field_schema(&self, name: &str) -> FieldSchema {
        let field_type = self
            .types
            .get(name)
            .map(|t| FieldType::from(t.as_str()))
            .unwrap_or(FieldType::Text);
        let validations = match self.validations.get(name) {
            Some(rules) => rules.clone(),
            None => field_type.default_validations(),
        };
        let mut schema = FieldSchema::new(field_type);
        schema.validations = validations;
        if let Some(selections) = self.selections.get(name) {
            schema.selections = selections.clone();
        }
        if let Some(label) = self.labels.get(name) {
            schema = schema.label(label.as_str());
        }
        schema
    }

    /// Visible `fields`, in order, as a form schema.
    pub fn build(&self, fields: &[String]) -> SchemaFormConfig {
        let mut schema = SchemaFormConfig::new();
        schema.extend(
            visible_columns(fields, &self.hidden)
                .into_iter()
                .map(|name| {
                    let field = self.field_schema(&name);
                    (name, field)
                }),
        );
        schema
    }
}

/// Load the entity's settings for `action` and build its form over `fields`.
pub async fn build_entity_form(
    service: &ConfigurationService,
    entity: &str,
    action: FormAction,
    fields: &[String],
) -> Result<SchemaFormConfig, AppError> {
    let settings = EntityFormSettings::load(service, entity, action).await?;
    tracing::debug!("building {:?} form for {} ({} fields)", action, entity, fields.len());
    Ok(settings.build(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RenderKind;
    use crate::store::MemoryConfigStore;
    use serde_json::json;
    use std::sync::Arc;

    fn fields() -> Vec<String> {
        ["name", "email", "status", "password"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn untyped_fields_render_as_text() {
        let schema = EntityFormSettings::default().build(&fields());
        assert_eq!(schema.len(), 4);
        let name = schema.get("name").unwrap();
        assert_eq!(name.field_type, FieldType::Text);
        assert!(name.validations.is_empty());
        assert_eq!(name.display_label("name"), "Name");
    }

    #[test]
    fn type_defaults_apply_without_configured_rules() {
        let mut settings = EntityFormSettings::default();
        settings.types.insert("email".into(), "email".into());
        let schema = settings.build(&fields());
        let rules: Vec<_> = schema
            .get("email")
            .unwrap()
            .validations
            .iter()
            .map(|r| r.validation_type.as_str())
            .collect();
        assert_eq!(rules, vec!["isEmail"]);

        settings
            .validations
            .insert("email".into(), vec![ValidationRule::new("required")]);
        let schema = settings.build(&fields());
        assert!(schema.get("email").unwrap().is_required());
        assert_eq!(schema.get("email").unwrap().validations.len(), 1);
    }

    #[tokio::test]
    async fn builds_from_stored_configuration() {
        let service = ConfigurationService::new(Arc::new(MemoryConfigStore::new()));
        let entity = Some("users");
        service
            .upsert(ConfigKey::EntityColumnsTypes, json!({"status": "selection", "email": "email"}), entity)
            .await
            .unwrap();
        service
            .upsert(
                ConfigKey::EntitySelections,
                json!({"status": [{"label": "Active", "value": "active"}, {"label": "Banned", "value": "banned"}]}),
                entity,
            )
            .await
            .unwrap();
        service
            .upsert(ConfigKey::EntityColumnsLabels, json!({"email": "Work Email"}), entity)
            .await
            .unwrap();
        service
            .upsert(ConfigKey::HiddenEntityCreateColumns, json!(["password"]), entity)
            .await
            .unwrap();

        let create = build_entity_form(&service, "users", FormAction::Create, &fields())
            .await
            .unwrap();
        assert_eq!(create.names().collect::<Vec<_>>(), vec!["name", "email", "status"]);
        assert_eq!(create.get("email").unwrap().display_label("email"), "Work Email");
        assert!(matches!(
            create.get("status").unwrap().render_kind(),
            RenderKind::SingleSelect(ref options) if options.len() == 2
        ));

        // update has its own hidden list
        let update = build_entity_form(&service, "users", FormAction::Update, &fields())
            .await
            .unwrap();
        assert!(update.contains("password"));
    }
}
