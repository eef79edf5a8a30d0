//! Example consumer: serves the configuration API backed by PostgreSQL when `DATABASE_URL`
//! is set, or by an in-memory store otherwise.
//!
//! Run from repo root: `cargo run -p example-consumer`

use admin_sdk::{
    app, ensure_config_table, ensure_database_exists, AppState, ConfigurationStore, MemoryConfigStore,
    PgConfigStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn build_store() -> Result<Arc<dyn ConfigurationStore>, Box<dyn std::error::Error>> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::info!("DATABASE_URL not set, using in-memory configuration store");
        return Ok(Arc::new(MemoryConfigStore::new()));
    };
    ensure_database_exists(&database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    ensure_config_table(&pool).await?;
    Ok(Arc::new(PgConfigStore::new(pool)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("admin_sdk=info")),
        )
        .init();

    let store = build_store().await?;
    let router = app(AppState::new(store));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("admin configuration API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
