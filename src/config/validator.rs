//! Shape checks for configuration values before they reach the store.

use crate::config::{ConfigKey, EntityDiction, RelationshipSettings, SiteSettings};
use crate::crud::CrudSettings;
use crate::error::ConfigError;
use crate::schema::{Selection, ValidationRule};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

fn expect_shape<T: DeserializeOwned>(key: ConfigKey, value: &Value) -> Result<T, ConfigError> {
    T::deserialize(value).map_err(|e| ConfigError::InvalidValue {
        key: key.as_str(),
        message: e.to_string(),
    })
}

fn invalid(key: ConfigKey, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.as_str(),
        message: message.to_string(),
    }
}

/// Validate `value` against the record shape of `key`.
pub fn validate_value(key: ConfigKey, value: &Value) -> Result<(), ConfigError> {
    match key {
        ConfigKey::EntityCrudSettings => {
            let settings: CrudSettings = expect_shape(key, value)?;
            if !settings.is_consistent() {
                return Err(invalid(key, "details must be enabled when update or delete is enabled"));
            }
        }
        ConfigKey::HiddenEntityTableColumns
        | ConfigKey::HiddenEntityDetailsColumns
        | ConfigKey::HiddenEntityCreateColumns
        | ConfigKey::HiddenEntityUpdateColumns
        | ConfigKey::DisabledEntities => {
            expect_shape::<Vec<String>>(key, value)?;
        }
        ConfigKey::DateFormat => {
            let format: String = expect_shape(key, value)?;
            if format.trim().is_empty() {
                return Err(invalid(key, "must not be empty"));
            }
        }
        ConfigKey::EntityValidations => {
            expect_shape::<HashMap<String, Vec<ValidationRule>>>(key, value)?;
        }
        ConfigKey::EntityColumnsTypes | ConfigKey::EntityColumnsLabels => {
            expect_shape::<HashMap<String, String>>(key, value)?;
        }
        ConfigKey::EntitySelections => {
            expect_shape::<HashMap<String, Vec<Selection>>>(key, value)?;
        }
        ConfigKey::RelationshipSettings => {
            expect_shape::<RelationshipSettings>(key, value)?;
        }
        ConfigKey::EntityDiction => {
            expect_shape::<EntityDiction>(key, value)?;
        }
        ConfigKey::SiteSettings => {
            expect_shape::<SiteSettings>(key, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        for key in ConfigKey::ALL {
            validate_value(key, &key.default_value()).unwrap();
        }
    }

    #[test]
    fn rejects_inconsistent_crud_settings() {
        let err = validate_value(
            ConfigKey::EntityCrudSettings,
            &json!({"create": true, "details": false, "update": true, "delete": false}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("details must be enabled"));
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(validate_value(ConfigKey::HiddenEntityTableColumns, &json!(["a", 1])).is_err());
        assert!(validate_value(ConfigKey::DateFormat, &json!("  ")).is_err());
        assert!(validate_value(ConfigKey::DateFormat, &json!(12)).is_err());
        assert!(validate_value(
            ConfigKey::EntityValidations,
            &json!({"email": [{"errorMessage": "missing type"}]})
        )
        .is_err());
    }

    #[test]
    fn accepts_validation_maps() {
        validate_value(
            ConfigKey::EntityValidations,
            &json!({"email": [{"validationType": "required"}, {"validationType": "isEmail", "errorMessage": "{name}?"}]}),
        )
        .unwrap();
    }
}
