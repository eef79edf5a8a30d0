//! Shared application state for all routes.

use crate::service::ConfigurationService;
use crate::store::ConfigurationStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: ConfigurationService,
}

impl AppState {
    pub fn new(store: Arc<dyn ConfigurationStore>) -> Self {
        AppState {
            config: ConfigurationService::new(store),
        }
    }
}
