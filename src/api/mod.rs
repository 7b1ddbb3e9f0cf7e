//! REST API layer: route handlers, DTOs, extractors, and router
//! composition.
//!
//! Versioned endpoints are mounted under the configured `API_V1_STR`
//! (default `/api/v1`); system endpoints live at the root.

pub mod docs;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;

use std::time::Duration;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::Settings;

/// Builds the REST router with versioned routes nested under `prefix`.
pub fn build_router(prefix: &str) -> Router<AppState> {
    Router::new()
        .nest(prefix, handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the complete application: routes, docs, and layers.
///
/// Requests exceeding `REQUEST_TIMEOUT_SECS` are aborted; dropping the
/// handler future releases any checked-out database connection.
pub fn app(state: AppState) -> Router {
    let settings = &state.settings;
    let router = build_router(&settings.api_v1_str);

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/docs")
            .url("/openapi.json", docs::openapi_for_prefix(&settings.api_v1_str)),
    );

    router
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_api_requests,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            settings.request_timeout_secs,
        )))
        .layer(cors_layer(settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins plus the front end.
fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
