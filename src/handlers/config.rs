//! Configuration read/write handlers. Global keys live at `/config/:key`, entity-scoped keys at
//! `/config/:key/:entity`; scoping mismatches are rejected by the service.

use crate::config::ConfigKey;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

/// PUT body: the whole record under `data`.
#[derive(Debug, Deserialize)]
pub struct UpsertBody {
    pub data: Value,
}

fn parse_key(raw: &str) -> Result<ConfigKey, AppError> {
    Ok(raw.parse::<ConfigKey>()?)
}

/// GET /config/:key
pub async fn show_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, AppError> {
    let key = parse_key(&key)?;
    Ok(Json(state.config.show(key, None).await?))
}

/// GET /config/:key/:entity
pub async fn show_entity_config(
    State(state): State<AppState>,
    Path((key, entity)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let key = parse_key(&key)?;
    Ok(Json(state.config.show(key, Some(&entity)).await?))
}

/// PUT /config/:key
pub async fn upsert_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<UpsertBody>,
) -> Result<StatusCode, AppError> {
    let key = parse_key(&key)?;
    state.config.upsert(key, body.data, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /config/:key/:entity
pub async fn upsert_entity_config(
    State(state): State<AppState>,
    Path((key, entity)): Path<(String, String)>,
    Json(body): Json<UpsertBody>,
) -> Result<StatusCode, AppError> {
    let key = parse_key(&key)?;
    state.config.upsert(key, body.data, Some(&entity)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Any other method on a configuration path.
pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, PUT")])
}
