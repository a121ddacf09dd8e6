//! Clinic backend entry-point: loads settings, prepares the store, and serves
//! the JSON API with its OpenAPI docs.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic::inbound::http::health::HealthState;
use clinic::inbound::http::session_config::{BuildMode, session_settings_from_env};
use clinic::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use clinic::settings::ClinicSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ClinicSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(|e| io::Error::other(format!("invalid session configuration: {e}")))?;

    let mut config = ServerConfig::new(session, settings.bind_addr())
        .with_login_settings(settings.login_settings());
    if let Some(database_url) = settings.database_url() {
        config = config.with_db_pool(connect(database_url, settings.db_pool_size).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(addr = %settings.bind_addr(), "clinic backend listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}

/// Apply migrations, then open the connection pool.
async fn connect(database_url: &str, pool_size: Option<u32>) -> io::Result<DbPool> {
    let applied = run_pending_migrations(database_url)
        .await
        .map_err(|e| io::Error::other(format!("database migration failed: {e}")))?;
    info!(applied, "database schema up to date");

    let mut pool_config = PoolConfig::new(database_url);
    if let Some(size) = pool_size {
        pool_config = pool_config.with_max_size(size);
    }
    DbPool::new(pool_config)
        .await
        .map_err(|e| io::Error::other(format!("create database pool: {e}")))
}
