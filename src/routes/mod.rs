//! Route builders. Each returns a stateless `Router` ready to merge.

pub mod common;
pub mod config;

pub use common::{common_routes, common_routes_with_ready};
pub use config::{config_routes, CONFIG_BODY_LIMIT};

use crate::state::AppState;
use axum::Router;

/// Configuration API plus health, readiness and version.
pub fn app(state: AppState) -> Router {
    config_routes(state.clone()).merge(common_routes_with_ready(state))
}
