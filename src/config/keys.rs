//! Configuration key catalogue: which keys exist, whether they are entity-scoped, and their defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKey {
    RelationshipSettings,
    EntityCrudSettings,
    HiddenEntityTableColumns,
    HiddenEntityDetailsColumns,
    HiddenEntityCreateColumns,
    HiddenEntityUpdateColumns,
    EntityValidations,
    EntityColumnsTypes,
    EntitySelections,
    EntityColumnsLabels,
    EntityDiction,
    DateFormat,
    DisabledEntities,
    SiteSettings,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 14] = [
        ConfigKey::RelationshipSettings,
        ConfigKey::EntityCrudSettings,
        ConfigKey::HiddenEntityTableColumns,
        ConfigKey::HiddenEntityDetailsColumns,
        ConfigKey::HiddenEntityCreateColumns,
        ConfigKey::HiddenEntityUpdateColumns,
        ConfigKey::EntityValidations,
        ConfigKey::EntityColumnsTypes,
        ConfigKey::EntitySelections,
        ConfigKey::EntityColumnsLabels,
        ConfigKey::EntityDiction,
        ConfigKey::DateFormat,
        ConfigKey::DisabledEntities,
        ConfigKey::SiteSettings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::RelationshipSettings => "relationship_settings",
            ConfigKey::EntityCrudSettings => "entity_crud_settings",
            ConfigKey::HiddenEntityTableColumns => "hidden_entity_table_columns",
            ConfigKey::HiddenEntityDetailsColumns => "hidden_entity_details_columns",
            ConfigKey::HiddenEntityCreateColumns => "hidden_entity_create_columns",
            ConfigKey::HiddenEntityUpdateColumns => "hidden_entity_update_columns",
            ConfigKey::EntityValidations => "entity_validations",
            ConfigKey::EntityColumnsTypes => "entity_columns_types",
            ConfigKey::EntitySelections => "entity_selections",
            ConfigKey::EntityColumnsLabels => "entity_columns_labels",
            ConfigKey::EntityDiction => "entity_diction",
            ConfigKey::DateFormat => "date_format",
            ConfigKey::DisabledEntities => "disabled_entities",
            ConfigKey::SiteSettings => "site_settings",
        }
    }

    /// Entity-scoped keys are stored per entity; the rest are process-global.
    pub fn requires_entity(self) -> bool {
        !matches!(
            self,
            ConfigKey::DateFormat | ConfigKey::DisabledEntities | ConfigKey::SiteSettings
        )
    }

    /// Value returned by `show` when nothing has been stored yet.
    pub fn default_value(self) -> Value {
        match self {
            ConfigKey::RelationshipSettings => json!({ "format": "" }),
            ConfigKey::EntityCrudSettings => json!({
                "create": true,
                "details": true,
                "update": true,
                "delete": true
            }),
            ConfigKey::HiddenEntityTableColumns
            | ConfigKey::HiddenEntityDetailsColumns
            | ConfigKey::HiddenEntityCreateColumns
            | ConfigKey::HiddenEntityUpdateColumns
            | ConfigKey::DisabledEntities => json!([]),
            ConfigKey::EntityValidations
            | ConfigKey::EntityColumnsTypes
            | ConfigKey::EntitySelections
            | ConfigKey::EntityColumnsLabels => json!({}),
            ConfigKey::EntityDiction => json!({ "singular": "", "plural": "" }),
            ConfigKey::DateFormat => json!("do MMM yyyy"),
            ConfigKey::SiteSettings => json!({ "name": "Admin", "homeLink": "/" }),
        }
    }

    /// Check the entity argument against the key's scoping. Returns the entity to store under.
    pub fn scope<'a>(self, entity: Option<&'a str>) -> Result<Option<&'a str>, ConfigError> {
        let entity = entity.map(str::trim).filter(|e| !e.is_empty());
        match (self.requires_entity(), entity) {
            (true, Some(e)) => Ok(Some(e)),
            (true, None) => Err(ConfigError::EntityRequired(self.as_str())),
            (false, None) => Ok(None),
            (false, Some(_)) => Err(ConfigError::EntityNotAllowed(self.as_str())),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
