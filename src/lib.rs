//! Admin SDK: schema-driven admin forms, configuration store, and the configuration REST API.

pub mod actions;
pub mod case;
pub mod config;
pub mod crud;
pub mod dashboard;
pub mod entity_form;
pub mod error;
pub mod form;
pub mod handlers;
pub mod routes;
pub mod schema;
pub mod service;
pub mod state;
pub mod store;
pub mod validation;
pub mod view_state;

pub use actions::{ActionForm, ActionInstance, DataEventAction, IntegrationImplementations};
pub use config::ConfigKey;
pub use crud::{CrudSettings, CrudSettingsSession};
pub use error::{AppError, ConfigError, SubmitError};
pub use form::{FormInstance, FormStatus};
pub use routes::{app, common_routes, common_routes_with_ready, config_routes};
pub use schema::{FieldSchema, FieldType, FormAction, FormValues, SchemaFormConfig};
pub use service::ConfigurationService;
pub use state::AppState;
pub use store::{ensure_config_table, ensure_database_exists, ConfigurationStore, MemoryConfigStore, PgConfigStore};
pub use validation::{ValidationErrors, ValidationRegistry};
pub use view_state::{derive_view_state, ViewState};
