//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::Settings;
use crate::persistence::{Engine, UserStore};
use crate::service::{Analytics, AuthService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// Built once by the entry point. Cloning shares the same engine,
/// store, and analytics sink; nothing here is rebuilt per request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Resolved settings.
    pub settings: Arc<Settings>,
    /// Process-wide database engine.
    pub engine: Arc<Engine>,
    /// Authentication gate.
    pub auth: Arc<AuthService>,
    /// Analytics sink (real or no-op).
    pub analytics: Arc<dyn Analytics>,
}

impl AppState {
    /// Wires the state from its already constructed parts.
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        engine: Arc<Engine>,
        users: Arc<dyn UserStore>,
        analytics: Arc<dyn Analytics>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(
            users,
            settings.secret_key.clone(),
            settings.access_token_ttl(),
        ));
        Self {
            settings,
            engine,
            auth,
            analytics,
        }
    }
}
