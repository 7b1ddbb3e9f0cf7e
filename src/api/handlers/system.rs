//! System endpoints: liveness and database readiness.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

impl HealthResponse {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::healthy()))
}

/// `GET /health/db`: Database readiness.
///
/// # Errors
///
/// Returns [`AppError::Connection`] when no pooled connection can be
/// obtained or the probe query fails.
#[utoipa::path(
    get,
    path = "/health/db",
    tag = "System",
    summary = "Database readiness",
    description = "Checks out one pooled connection and runs a trivial query.",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 500, description = "Database unreachable", body = ErrorResponse),
    )
)]
pub async fn db_health_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut uow = state.engine.unit_of_work().await?;
    sqlx::query("SELECT 1").execute(uow.connection()).await?;
    Ok((StatusCode::OK, Json(HealthResponse::healthy())))
}

/// System routes mounted at the root level (not under the API prefix).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/db", get(db_health_handler))
}
