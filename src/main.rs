//! forge-backend server entry point.
//!
//! Resolves settings, builds the engine once, bootstraps the first
//! superuser, and starts the Axum HTTP server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use forge_backend::api;
use forge_backend::app_state::AppState;
use forge_backend::config::Settings;
use forge_backend::persistence::{Engine, PgUserStore, UserStore};
use forge_backend::service::{analytics, bootstrap};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Load configuration; insecure secrets outside `local` stop here
    let settings = Arc::new(Settings::from_env().context("invalid configuration")?);
    tracing::info!(
        addr = %settings.listen_addr,
        environment = %settings.environment,
        "starting {}",
        settings.project_name
    );

    // Build the process-wide engine
    let engine = Arc::new(Engine::from_settings(&settings));
    sqlx::migrate!("./migrations")
        .run(engine.pool())
        .await
        .context("failed to apply database migrations")?;

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(Arc::clone(&engine)));
    bootstrap::init_db(&settings, &engine, users.as_ref())
        .await
        .context("failed to bootstrap database")?;

    // Build application state and router
    let analytics = analytics::from_settings(&settings);
    let state = AppState::new(Arc::clone(&settings), engine, users, analytics);
    let app = api::app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_addr))?;
    tracing::info!(addr = %settings.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// `RUST_LOG` wins, then `LOG_LEVEL`, then `info`. `LOG_FORMAT=json`
/// selects JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
