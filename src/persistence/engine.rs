//! Process-wide database engine.
//!
//! [`Engine`] wraps a lazily connected `sqlx::PgPool` together with the
//! connection URI and options it was built from. It is constructed once
//! in `main` and shared behind an `Arc`; its configuration never changes
//! afterwards, only the pool's internal connection set does.

use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgConnection, PgPool, Postgres};

use super::connect_options::{self, ConnectionOptions, OptionValue, keys};
use crate::config::Settings;
use crate::domain::ConnectionUri;
use crate::error::AppError;

/// Fixed pool sizing and health policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPolicy {
    /// Validate a connection before handing it out.
    pub pre_ping: bool,
    /// Connections older than this are closed and replaced.
    pub recycle: Duration,
    /// Connections kept open in steady state.
    pub pool_size: u32,
    /// Extra connections allowed under load.
    pub max_overflow: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
}

impl PoolPolicy {
    /// Default policy: pre-ping, 300 s recycle, 5 base + 10 overflow.
    pub const DEFAULT: Self = Self {
        pre_ping: true,
        recycle: Duration::from_secs(300),
        pool_size: 5,
        max_overflow: 10,
        acquire_timeout: Duration::from_secs(30),
    };

    /// Returns the default policy with a different acquire timeout.
    #[must_use]
    pub const fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Upper bound on open connections.
    #[must_use]
    pub const fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow)
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.pool_size)
            .max_connections(self.max_connections())
            .max_lifetime(Some(self.recycle))
            .idle_timeout(Some(self.recycle))
            .test_before_acquire(self.pre_ping)
            .acquire_timeout(self.acquire_timeout)
    }
}

impl Default for PoolPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Shared handle to the connection pool.
#[derive(Debug)]
pub struct Engine {
    pool: PgPool,
    uri: ConnectionUri,
    options: ConnectionOptions,
    policy: PoolPolicy,
}

impl Engine {
    /// Builds the engine without opening a connection.
    ///
    /// Connection failures (unreachable host, bad credentials) surface
    /// from the first operation that needs a connection. Must be called
    /// inside a Tokio runtime.
    #[must_use]
    pub fn build(uri: ConnectionUri, options: ConnectionOptions, policy: PoolPolicy) -> Self {
        let connect = connect_options_for(&uri, &options);
        let pool = policy.pool_options().connect_lazy_with(connect);

        tracing::info!(
            url = %uri,
            options = %options,
            pool_size = policy.pool_size,
            max_overflow = policy.max_overflow,
            recycle_secs = policy.recycle.as_secs(),
            "database engine created"
        );

        Self {
            pool,
            uri,
            options,
            policy,
        }
    }

    /// Resolves URI and options from settings and builds the engine.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let options = connect_options::select(
            settings.database_type,
            settings.supabase.pool_mode,
            settings.environment,
        );
        let policy = PoolPolicy::DEFAULT
            .with_acquire_timeout(Duration::from_secs(settings.database_acquire_timeout_secs));
        Self::build(settings.database_uri(), options, policy)
    }

    /// Checks out one pooled connection for a bounded unit of work.
    ///
    /// The connection returns to the pool when the guard is dropped,
    /// including when the owning future is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] if the pool times out or the
    /// backend is unreachable.
    pub async fn unit_of_work(&self) -> Result<UnitOfWork, AppError> {
        let conn = self.pool.acquire().await?;
        Ok(UnitOfWork { conn })
    }

    /// Underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Connection URI; renders masked.
    #[must_use]
    pub fn uri(&self) -> &ConnectionUri {
        &self.uri
    }

    /// Connection options applied to every physical connection.
    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Pool policy fixed at construction.
    #[must_use]
    pub fn policy(&self) -> &PoolPolicy {
        &self.policy
    }
}

/// One checked-out connection; released on drop.
#[derive(Debug)]
pub struct UnitOfWork {
    conn: PoolConnection<Postgres>,
}

impl UnitOfWork {
    /// Connection to run queries on.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}

/// Translates URI and option map into driver connect options.
fn connect_options_for(uri: &ConnectionUri, options: &ConnectionOptions) -> PgConnectOptions {
    let mut connect = PgConnectOptions::new()
        .host(uri.host())
        .port(uri.port())
        .username(uri.username())
        .password(uri.password())
        .database(uri.database());

    let server_settings: Vec<(&str, String)> = [keys::SEARCH_PATH, keys::STATEMENT_TIMEOUT]
        .into_iter()
        .filter_map(|key| options.get(key).map(|v| (key, v.to_string())))
        .collect();
    if !server_settings.is_empty() {
        connect = connect.options(server_settings);
    }

    if let Some(OptionValue::Int(0)) = options.get(keys::PREPARE_THRESHOLD) {
        connect = connect.statement_cache_capacity(0);
    }

    // The driver manages TCP keep-alive itself; the keys are kept for logging.
    connect
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{BackendProfile, Environment, PoolMode};

    fn uri() -> ConnectionUri {
        ConnectionUri::postgres("app", "secret", "localhost", 5432, "app")
    }

    #[test]
    fn default_policy_matches_fixed_values() {
        let policy = PoolPolicy::default();
        assert!(policy.pre_ping);
        assert_eq!(policy.recycle, Duration::from_secs(300));
        assert_eq!(policy.pool_size, 5);
        assert_eq!(policy.max_overflow, 10);
        assert_eq!(policy.max_connections(), 15);
    }

    #[test]
    fn connect_options_carry_uri_components() {
        let connect = connect_options_for(&uri(), &ConnectionOptions::new());
        assert_eq!(connect.get_host(), "localhost");
        assert_eq!(connect.get_port(), 5432);
        assert_eq!(connect.get_username(), "app");
        assert_eq!(connect.get_database(), Some("app"));
        assert_eq!(connect.get_options(), None);
    }

    #[test]
    fn hosted_options_become_server_settings() {
        let options = connect_options::select(
            BackendProfile::Supabase,
            PoolMode::Transaction,
            Environment::Local,
        );
        let connect = connect_options_for(&uri(), &options);
        let Some(server) = connect.get_options() else {
            panic!("hosted profile sets server options");
        };
        assert!(server.contains("search_path=public"));
        assert!(server.contains("statement_timeout=60000"));
    }

    #[tokio::test]
    async fn build_is_lazy_and_applies_policy() {
        let engine = Engine::build(uri(), ConnectionOptions::new(), PoolPolicy::DEFAULT);
        let pool_options = engine.pool().options();
        assert_eq!(pool_options.get_max_connections(), 15);
        assert_eq!(pool_options.get_min_connections(), 5);
        assert!(pool_options.get_test_before_acquire());
        assert_eq!(
            pool_options.get_max_lifetime(),
            Some(Duration::from_secs(300))
        );
        assert!(!engine.pool().is_closed());
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_on_first_use() {
        let unreachable = ConnectionUri::postgres("app", "secret", "127.0.0.1", 1, "app");
        let policy = PoolPolicy::DEFAULT.with_acquire_timeout(Duration::from_millis(200));
        let engine = Engine::build(unreachable, ConnectionOptions::new(), policy);
        let result = engine.unit_of_work().await;
        assert!(matches!(result, Err(AppError::Connection(_))));
    }
}
