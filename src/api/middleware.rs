//! Analytics middleware for versioned API requests.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::extractors::bearer_token;
use crate::app_state::AppState;
use crate::service::AnalyticsEvent;
use crate::service::security;

/// Distinct id used when the request carries no valid token.
pub const ANONYMOUS: &str = "anonymous";

/// Returns `true` when `path` is `prefix` itself or one of its sub-paths.
#[must_use]
pub fn is_under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Captures an `api_request` event for every request under the API
/// prefix, after the response is produced.
pub async fn track_api_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !is_under_prefix(&path, &state.settings.api_v1_str) {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let distinct_id = bearer_token(request.headers())
        .and_then(|token| {
            security::decode_access_token(token, state.settings.secret_key.expose()).ok()
        })
        .map_or_else(|| ANONYMOUS.to_string(), |claims| claims.sub);

    let started = Instant::now();
    let response = next.run(request).await;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    state.analytics.capture(
        AnalyticsEvent::new("api_request", distinct_id)
            .with("path", path)
            .with("method", method)
            .with("status_code", response.status().as_u16())
            .with("duration_ms", duration_ms),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matches_on_segment_boundary() {
        assert!(is_under_prefix("/api/v1", "/api/v1"));
        assert!(is_under_prefix("/api/v1/users/me", "/api/v1"));
        assert!(is_under_prefix("/api/v1/users/me", "/api/v1/"));
        assert!(!is_under_prefix("/api/v1beta/users", "/api/v1"));
        assert!(!is_under_prefix("/health", "/api/v1"));
    }
}
