//! Configuration routes: GET and PUT per key, globally or per entity.

use crate::handlers::config::{
    method_not_allowed, show_config, show_entity_config, upsert_config, upsert_entity_config,
};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// Configuration records are small JSON documents.
pub const CONFIG_BODY_LIMIT: usize = 256 * 1024;

pub fn config_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/config/:key",
            get(show_config).put(upsert_config).fallback(method_not_allowed),
        )
        .route(
            "/config/:key/:entity",
            get(show_entity_config)
                .put(upsert_entity_config)
                .fallback(method_not_allowed),
        )
        .layer(RequestBodyLimitLayer::new(CONFIG_BODY_LIMIT))
        .with_state(state)
}
