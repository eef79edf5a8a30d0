use crate::config::{validate_value, ConfigKey};
use crate::error::AppError;
use crate::store::ConfigurationStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Front door to the configuration store: checks key scoping, fills defaults on read,
/// and validates record shapes on write.
#[derive(Clone)]
pub struct ConfigurationService {
    store: Arc<dyn ConfigurationStore>,
}

impl ConfigurationService {
    pub fn new(store: Arc<dyn ConfigurationStore>) -> Self {
        ConfigurationService { store }
    }

    pub fn store(&self) -> &Arc<dyn ConfigurationStore> {
        &self.store
    }

    /// Stored record, or the key's default when nothing was written yet.
    pub async fn show(&self, key: ConfigKey, entity: Option<&str>) -> Result<Value, AppError> {
        let entity = key.scope(entity)?;
        let stored = self.store.show(key, entity).await?;
        Ok(stored.unwrap_or_else(|| key.default_value()))
    }

    pub async fn show_as<T: DeserializeOwned>(&self, key: ConfigKey, entity: Option<&str>) -> Result<T, AppError> {
        let value = self.show(key, entity).await?;
        serde_json::from_value(value)
            .map_err(|e| AppError::Validation(format!("stored {} is malformed: {}", key, e)))
    }

    pub async fn upsert(&self, key: ConfigKey, value: Value, entity: Option<&str>) -> Result<(), AppError> {
        let entity = key.scope(entity)?;
        validate_value(key, &value)?;
        self.store.upsert(key, value, entity).await?;
        tracing::info!("configuration {} updated for {}", key, entity.unwrap_or("<global>"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::store::MemoryConfigStore;
    use serde_json::json;

    fn service() -> ConfigurationService {
        ConfigurationService::new(Arc::new(MemoryConfigStore::new()))
    }

    #[tokio::test]
    async fn show_falls_back_to_default() {
        let svc = service();
        assert_eq!(svc.show(ConfigKey::DateFormat, None).await.unwrap(), json!("do MMM yyyy"));
        assert_eq!(
            svc.show(ConfigKey::HiddenEntityTableColumns, Some("users")).await.unwrap(),
            json!([])
        );
    }

    #[tokio::test]
    async fn upsert_then_show() {
        let svc = service();
        svc.upsert(ConfigKey::HiddenEntityTableColumns, json!(["password"]), Some("users"))
            .await
            .unwrap();
        let hidden: Vec<String> = svc
            .show_as(ConfigKey::HiddenEntityTableColumns, Some("users"))
            .await
            .unwrap();
        assert_eq!(hidden, vec!["password"]);
    }

    #[tokio::test]
    async fn scoping_is_enforced() {
        let svc = service();
        let err = svc.show(ConfigKey::EntityCrudSettings, None).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::EntityRequired(_))));
        let err = svc.upsert(ConfigKey::DateFormat, json!("yyyy"), Some("users")).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::EntityNotAllowed(_))));
    }

    #[tokio::test]
    async fn invalid_values_never_reach_the_store() {
        let svc = service();
        let err = svc
            .upsert(
                ConfigKey::EntityCrudSettings,
                json!({"create": true, "details": false, "update": false, "delete": true}),
                Some("users"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidValue { .. })));
        assert!(svc
            .store()
            .show(ConfigKey::EntityCrudSettings, Some("users"))
            .await
            .unwrap()
            .is_none());
    }
}
