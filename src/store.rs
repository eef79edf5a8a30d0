//! Configuration store contract and its in-memory and PostgreSQL implementations.
//! The PostgreSQL table lives in a schema named from `ADMIN_SCHEMA` env (default `admin`).

use crate::config::ConfigKey;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

/// Opaque key/entity-scoped record store. `entity` is `None` for global keys.
/// Callers check key scoping before reaching the store.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    async fn show(&self, key: ConfigKey, entity: Option<&str>) -> Result<Option<Value>, AppError>;

    /// Replace the whole record under `(key, entity)`, creating it on first write.
    async fn upsert(&self, key: ConfigKey, value: Value, entity: Option<&str>) -> Result<(), AppError>;
}

/// Process-local store. Records live as long as the store.
#[derive(Default)]
pub struct MemoryConfigStore {
    records: RwLock<HashMap<(ConfigKey, Option<String>), Value>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigurationStore for MemoryConfigStore {
    async fn show(&self, key: ConfigKey, entity: Option<&str>) -> Result<Option<Value>, AppError> {
        let guard = self
            .records
            .read()
            .map_err(|_| AppError::Internal("config store lock poisoned".into()))?;
        Ok(guard.get(&(key, entity.map(String::from))).cloned())
    }

    async fn upsert(&self, key: ConfigKey, value: Value, entity: Option<&str>) -> Result<(), AppError> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| AppError::Internal("config store lock poisoned".into()))?;
        guard.insert((key, entity.map(String::from)), value);
        Ok(())
    }
}

/// Schema name for the _sys_configurations table. From env `ADMIN_SCHEMA`, default `admin`. Must be a valid PostgreSQL identifier.
pub fn admin_schema() -> String {
    std::env::var("ADMIN_SCHEMA").unwrap_or_else(|_| "admin".into())
}

/// Returns schema-qualified table name (e.g. "admin._sys_configurations").
pub fn qualified_sys_table(table: &str) -> String {
    format!("{}.{}", admin_schema(), table)
}

const CONFIGURATIONS_TABLE: &str = "_sys_configurations";

/// Global keys are stored with an empty entity so (key, entity) can be the primary key.
const GLOBAL_ENTITY: &str = "";

/// Create schema from `ADMIN_SCHEMA` env if not exists, then the configurations table.
pub async fn ensure_config_table(pool: &PgPool) -> Result<(), AppError> {
    let schema = admin_schema();
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            key TEXT NOT NULL,
            entity TEXT NOT NULL DEFAULT '',
            value JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (key, entity)
        )
        "#,
        qualified_sys_table(CONFIGURATIONS_TABLE)
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

/// PostgreSQL-backed store: one JSONB row per (key, entity).
#[derive(Clone)]
pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    pub fn new(pool: PgPool) -> Self {
        PgConfigStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ConfigurationStore for PgConfigStore {
    async fn show(&self, key: ConfigKey, entity: Option<&str>) -> Result<Option<Value>, AppError> {
        let sql = format!(
            "SELECT value FROM {} WHERE key = $1 AND entity = $2",
            qualified_sys_table(CONFIGURATIONS_TABLE)
        );
        let row: Option<(Value,)> = sqlx::query_as(&sql)
            .bind(key.as_str())
            .bind(entity.unwrap_or(GLOBAL_ENTITY))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(v,)| v))
    }

    async fn upsert(&self, key: ConfigKey, value: Value, entity: Option<&str>) -> Result<(), AppError> {
        let sql = format!(
            r#"
            INSERT INTO {} (key, entity, value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (key, entity)
            DO UPDATE SET value = $3, updated_at = NOW()
            "#,
            qualified_sys_table(CONFIGURATIONS_TABLE)
        );
        sqlx::query(&sql)
            .bind(key.as_str())
            .bind(entity.unwrap_or(GLOBAL_ENTITY))
            .bind(&value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        tracing::info!("creating database {}", db_name);
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
