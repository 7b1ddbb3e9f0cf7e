//! Application settings loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). Every field has its default resolved here, at load time,
//! so callers never fall back at the use site. Loading also validates
//! secrets: a value equal to [`INSECURE_PLACEHOLDER`] warns in the
//! `local` environment and is fatal anywhere else.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use crate::domain::{BackendProfile, ConnectionUri, Environment, PoolMode};

/// Secret value shipped in sample configuration that must be replaced.
pub const INSECURE_PLACEHOLDER: &str = "quickforgeai";

/// Longest accepted access-token lifetime: one year.
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60 * 24 * 365;

/// Fatal configuration problem; the process must not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A secret still holds the sample placeholder outside `local`.
    #[error("the value of {var} is \"quickforgeai\"; change it before deploying")]
    Insecure {
        /// Name of the offending variable.
        var: &'static str,
    },

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: `{value}` ({reason})")]
    Invalid {
        /// Name of the offending variable.
        var: &'static str,
        /// Raw value as read from the environment.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Non-fatal configuration problem; logged at `warn` level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigWarning {
    /// A secret holds the sample placeholder in the `local` environment.
    #[error("the value of {var} is \"quickforgeai\"; change it, at least for deployments")]
    InsecureSecret {
        /// Name of the offending variable.
        var: &'static str,
    },

    /// An explicit hosted port disagrees with the configured pool mode.
    #[error("hosted database port {port} does not match pool mode {pool_mode}; expected {expected}")]
    PortModeMismatch {
        /// Explicitly configured port (kept as is).
        port: u16,
        /// Configured pool mode.
        pool_mode: PoolMode,
        /// Port the pool mode normally uses.
        expected: u16,
    },
}

/// String whose value is never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a raw secret.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Direct PostgreSQL credentials (`POSTGRES_*`).
#[derive(Debug, Clone)]
pub struct PostgresSettings {
    /// Server host.
    pub server: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: Secret,
    /// Database name.
    pub db: String,
}

/// Hosted PostgreSQL credentials (`SUPABASE_DB_*`).
#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    /// Proxy host. The hosted URI is only used when this is set.
    pub host: Option<String>,
    /// Explicit proxy port; `None` selects the pool mode's default.
    pub port: Option<u16>,
    /// Login role.
    pub user: Option<String>,
    /// Login password.
    pub password: Option<Secret>,
    /// Database name.
    pub name: Option<String>,
    /// Pooling discipline of the proxy.
    pub pool_mode: PoolMode,
}

/// Top-level application settings.
///
/// Loaded once at startup via [`Settings::from_env`] and shared read-only.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
    /// Prefix of versioned API routes.
    pub api_v1_str: String,
    /// Human-readable service name.
    pub project_name: String,
    /// HMAC secret for access tokens.
    pub secret_key: Secret,
    /// Lifetime of issued access tokens.
    pub access_token_expire_minutes: i64,
    /// Browser front-end origin, always allowed by CORS.
    pub frontend_host: String,
    /// Extra CORS origins.
    pub backend_cors_origins: Vec<String>,
    /// Deployment stage.
    pub environment: Environment,
    /// Selected database profile.
    pub database_type: BackendProfile,
    /// Direct PostgreSQL credentials.
    pub postgres: PostgresSettings,
    /// Hosted PostgreSQL credentials.
    pub supabase: SupabaseSettings,
    /// E-mail of the bootstrap superuser.
    pub first_superuser: String,
    /// Password of the bootstrap superuser.
    pub first_superuser_password: Secret,
    /// Analytics project key; analytics are disabled when unset.
    pub posthog_api_key: Option<Secret>,
    /// Analytics ingestion host.
    pub posthog_host: String,
    /// Upper bound for a single HTTP request.
    pub request_timeout_secs: u64,
    /// Upper bound for waiting on a pooled connection.
    pub database_acquire_timeout_secs: u64,
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// Calls `dotenvy::dotenv().ok()` first to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value cannot be parsed or a secret
    /// still holds [`INSECURE_PLACEHOLDER`] outside `local`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset. Warnings found during
    /// validation are logged and loading proceeds.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let postgres = PostgresSettings {
            server: env.string("POSTGRES_SERVER", "localhost"),
            port: env.parse("POSTGRES_PORT", 5432)?,
            user: env.string("POSTGRES_USER", "postgres"),
            password: Secret::new(env.string("POSTGRES_PASSWORD", "postgres")),
            db: env.string("POSTGRES_DB", "postgres"),
        };

        let supabase = SupabaseSettings {
            host: env.get("SUPABASE_DB_HOST"),
            port: env.parse_opt("SUPABASE_DB_PORT")?,
            user: env.get("SUPABASE_DB_USER"),
            password: env.get("SUPABASE_DB_PASSWORD").map(Secret::new),
            name: env.get("SUPABASE_DB_NAME"),
            pool_mode: env.parse("SUPABASE_DB_POOL_MODE", PoolMode::Session)?,
        };

        let settings = Self {
            listen_addr: env.parse("LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8000)))?,
            api_v1_str: env.string("API_V1_STR", "/api/v1"),
            project_name: env.string("PROJECT_NAME", "Quick Forge AI"),
            secret_key: env
                .get("SECRET_KEY")
                .map_or_else(generate_secret_key, Secret::new),
            access_token_expire_minutes: env.token_minutes("ACCESS_TOKEN_EXPIRE_MINUTES", 60 * 24 * 8)?,
            frontend_host: env.string("FRONTEND_HOST", "http://localhost:5173"),
            backend_cors_origins: env
                .get("BACKEND_CORS_ORIGINS")
                .map(|v| parse_cors(&v))
                .unwrap_or_default(),
            environment: env.parse("ENVIRONMENT", Environment::Local)?,
            database_type: env.parse("DATABASE_TYPE", BackendProfile::Postgres)?,
            postgres,
            supabase,
            first_superuser: env.string("FIRST_SUPERUSER", "admin@example.com"),
            first_superuser_password: Secret::new(env.string("FIRST_SUPERUSER_PASSWORD", "admin")),
            posthog_api_key: env.get("POSTHOG_API_KEY").map(Secret::new),
            posthog_host: env.string("POSTHOG_HOST", "https://app.posthog.com"),
            request_timeout_secs: env.parse("REQUEST_TIMEOUT_SECS", 30)?,
            database_acquire_timeout_secs: env.parse("DATABASE_ACQUIRE_TIMEOUT_SECS", 30)?,
        };

        for warning in settings.validate()? {
            tracing::warn!(%warning, "configuration warning");
        }
        if settings.database_type == BackendProfile::Supabase {
            tracing::info!(pool_mode = %settings.supabase.pool_mode, "using hosted database pool mode");
        }

        Ok(settings)
    }

    /// Checks secrets and the hosted port against the pool mode.
    ///
    /// Each secret is checked independently: `SECRET_KEY`, the password
    /// of the active profile (the hosted one only when set), and
    /// `FIRST_SUPERUSER_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Insecure`] for the first placeholder secret
    /// found when the environment is not `local`.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut warnings = Vec::new();

        self.check_secret("SECRET_KEY", Some(&self.secret_key), &mut warnings)?;
        match self.database_type {
            BackendProfile::Postgres => {
                self.check_secret("POSTGRES_PASSWORD", Some(&self.postgres.password), &mut warnings)?;
            }
            BackendProfile::Supabase => {
                self.check_secret(
                    "SUPABASE_DB_PASSWORD",
                    self.supabase.password.as_ref(),
                    &mut warnings,
                )?;
            }
        }
        self.check_secret(
            "FIRST_SUPERUSER_PASSWORD",
            Some(&self.first_superuser_password),
            &mut warnings,
        )?;

        if self.database_type == BackendProfile::Supabase
            && let Some(port) = self.supabase.port
        {
            let expected = self.supabase.pool_mode.default_port();
            if port != expected {
                warnings.push(ConfigWarning::PortModeMismatch {
                    port,
                    pool_mode: self.supabase.pool_mode,
                    expected,
                });
            }
        }

        Ok(warnings)
    }

    fn check_secret(
        &self,
        var: &'static str,
        value: Option<&Secret>,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(), ConfigError> {
        if value.is_none_or(|s| s.expose() != INSECURE_PLACEHOLDER) {
            return Ok(());
        }
        if self.environment.is_local() {
            warnings.push(ConfigWarning::InsecureSecret { var });
            Ok(())
        } else {
            Err(ConfigError::Insecure { var })
        }
    }

    /// Port used for the hosted profile: the explicit one if set,
    /// otherwise the pool mode's default.
    #[must_use]
    pub fn hosted_port(&self) -> u16 {
        self.supabase
            .port
            .unwrap_or_else(|| self.supabase.pool_mode.default_port())
    }

    /// Builds the connection URI for the active profile.
    ///
    /// The hosted profile only applies when `SUPABASE_DB_HOST` is set;
    /// otherwise the direct PostgreSQL credentials are used.
    #[must_use]
    pub fn database_uri(&self) -> ConnectionUri {
        match (&self.database_type, &self.supabase.host) {
            (BackendProfile::Supabase, Some(host)) => {
                let port = self.hosted_port();
                tracing::debug!(pool_mode = %self.supabase.pool_mode, port, "connecting to hosted database");
                ConnectionUri::postgres(
                    self.supabase.user.clone().unwrap_or_default(),
                    self.supabase
                        .password
                        .as_ref()
                        .map(|s| s.expose().to_string())
                        .unwrap_or_default(),
                    host.clone(),
                    port,
                    self.supabase.name.clone().unwrap_or_default(),
                )
            }
            _ => ConnectionUri::postgres(
                self.postgres.user.clone(),
                self.postgres.password.expose(),
                self.postgres.server.clone(),
                self.postgres.port,
                self.postgres.db.clone(),
            ),
        }
    }

    /// All origins allowed by CORS: configured ones plus the front end.
    #[must_use]
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = self
            .backend_cors_origins
            .iter()
            .map(|o| o.trim_end_matches('/').to_string())
            .collect();
        origins.push(self.frontend_host.clone());
        origins
    }

    /// Lifetime of issued access tokens.
    ///
    /// Saturates at the largest representable duration; token issuance
    /// then fails instead of panicking.
    #[must_use]
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.access_token_expire_minutes)
            .unwrap_or_else(chrono::Duration::max_value)
    }
}

/// Environment reader that treats empty values as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        Ok(self.parse_opt(key)?.unwrap_or(default))
    }

    fn parse_opt<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                    var: key,
                    reason: e.to_string(),
                    value: raw,
                })
            })
            .transpose()
    }

    /// Token lifetime in minutes, bounded to `1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES`.
    fn token_minutes(&self, key: &'static str, default: i64) -> Result<i64, ConfigError> {
        let minutes = self.parse(key, default)?;
        if (1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&minutes) {
            Ok(minutes)
        } else {
            Err(ConfigError::Invalid {
                var: key,
                value: minutes.to_string(),
                reason: format!("must be between 1 and {MAX_ACCESS_TOKEN_EXPIRE_MINUTES}"),
            })
        }
    }
}

/// Splits a comma-separated origin list.
fn parse_cors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Random 32-byte URL-safe secret used when `SECRET_KEY` is unset.
fn generate_secret_key() -> Secret {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    Secret::new(URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    fn loaded(pairs: &[(&str, &str)]) -> Settings {
        match load(pairs) {
            Ok(settings) => settings,
            Err(e) => panic!("settings failed to load: {e}"),
        }
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = loaded(&[]);
        assert_eq!(s.environment, Environment::Local);
        assert_eq!(s.database_type, BackendProfile::Postgres);
        assert_eq!(s.api_v1_str, "/api/v1");
        assert_eq!(s.access_token_expire_minutes, 11_520);
        assert_eq!(s.postgres.port, 5432);
        assert_eq!(s.supabase.pool_mode, PoolMode::Session);
        assert_eq!(s.listen_addr.port(), 8000);
        assert!(s.posthog_api_key.is_none());
    }

    #[test]
    fn generated_secret_key_is_random_and_long() {
        let a = loaded(&[]);
        let b = loaded(&[]);
        assert_ne!(a.secret_key, b.secret_key);
        assert!(a.secret_key.expose().len() >= 43);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let s = loaded(&[("POSTGRES_SERVER", ""), ("SUPABASE_DB_PORT", "  ")]);
        assert_eq!(s.postgres.server, "localhost");
        assert_eq!(s.supabase.port, None);
    }

    #[test]
    fn placeholder_secret_only_warns_in_local() {
        let s = loaded(&[("SECRET_KEY", INSECURE_PLACEHOLDER)]);
        let Ok(warnings) = s.validate() else {
            panic!("local validation should not fail");
        };
        assert_eq!(warnings, vec![ConfigWarning::InsecureSecret { var: "SECRET_KEY" }]);
    }

    #[test]
    fn placeholder_secrets_are_fatal_outside_local() {
        for env in ["staging", "production"] {
            for var in ["SECRET_KEY", "POSTGRES_PASSWORD", "FIRST_SUPERUSER_PASSWORD"] {
                let result = load(&[("ENVIRONMENT", env), (var, INSECURE_PLACEHOLDER)]);
                let Err(ConfigError::Insecure { var: reported }) = result else {
                    panic!("{var} in {env} should be fatal");
                };
                assert_eq!(reported, var);
            }
        }
    }

    #[test]
    fn hosted_password_checked_only_for_hosted_profile() {
        let direct = load(&[
            ("ENVIRONMENT", "production"),
            ("SUPABASE_DB_PASSWORD", INSECURE_PLACEHOLDER),
        ]);
        assert!(direct.is_ok());

        let hosted = load(&[
            ("ENVIRONMENT", "production"),
            ("DATABASE_TYPE", "supabase"),
            ("SUPABASE_DB_PASSWORD", INSECURE_PLACEHOLDER),
        ]);
        assert_eq!(
            hosted.err(),
            Some(ConfigError::Insecure { var: "SUPABASE_DB_PASSWORD" })
        );
    }

    #[test]
    fn hosted_profile_without_password_skips_check() {
        let s = loaded(&[
            ("ENVIRONMENT", "production"),
            ("DATABASE_TYPE", "alternative"),
            ("POSTGRES_PASSWORD", INSECURE_PLACEHOLDER),
        ]);
        assert_eq!(s.database_type, BackendProfile::Supabase);
    }

    #[test]
    fn hosted_port_defaults_follow_pool_mode() {
        let tx = loaded(&[
            ("DATABASE_TYPE", "supabase"),
            ("SUPABASE_DB_HOST", "pooler.example.com"),
            ("SUPABASE_DB_POOL_MODE", "transaction"),
        ]);
        assert_eq!(tx.hosted_port(), 6543);
        assert_eq!(tx.database_uri().port(), 6543);

        let session = loaded(&[
            ("DATABASE_TYPE", "supabase"),
            ("SUPABASE_DB_HOST", "pooler.example.com"),
            ("SUPABASE_DB_POOL_MODE", "session"),
        ]);
        assert_eq!(session.hosted_port(), 5432);
        assert_eq!(session.database_uri().port(), 5432);
    }

    #[test]
    fn mismatched_port_warns_and_is_kept() {
        let s = loaded(&[
            ("DATABASE_TYPE", "supabase"),
            ("SUPABASE_DB_HOST", "pooler.example.com"),
            ("SUPABASE_DB_POOL_MODE", "transaction"),
            ("SUPABASE_DB_PORT", "5432"),
        ]);
        let Ok(warnings) = s.validate() else {
            panic!("mismatch must not be fatal");
        };
        assert_eq!(
            warnings,
            vec![ConfigWarning::PortModeMismatch {
                port: 5432,
                pool_mode: PoolMode::Transaction,
                expected: 6543,
            }]
        );
        assert_eq!(s.database_uri().port(), 5432);
    }

    #[test]
    fn hosted_uri_uses_hosted_credentials() {
        let s = loaded(&[
            ("DATABASE_TYPE", "supabase"),
            ("SUPABASE_DB_HOST", "pooler.example.com"),
            ("SUPABASE_DB_USER", "svc"),
            ("SUPABASE_DB_PASSWORD", "hunter2"),
            ("SUPABASE_DB_NAME", "app"),
        ]);
        let uri = s.database_uri();
        assert_eq!(uri.host(), "pooler.example.com");
        assert_eq!(uri.username(), "svc");
        assert_eq!(uri.database(), "app");
        assert!(!uri.masked().contains("hunter2"));
    }

    #[test]
    fn hosted_profile_without_host_falls_back_to_postgres() {
        let s = loaded(&[("DATABASE_TYPE", "supabase"), ("POSTGRES_SERVER", "db")]);
        assert_eq!(s.database_uri().host(), "db");
    }

    #[test]
    fn invalid_values_are_fatal() {
        let Err(ConfigError::Invalid { var, value, .. }) = load(&[("POSTGRES_PORT", "abc")]) else {
            panic!("bad port should not parse");
        };
        assert_eq!(var, "POSTGRES_PORT");
        assert_eq!(value, "abc");

        assert!(load(&[("SUPABASE_DB_POOL_MODE", "statement")]).is_err());
        assert!(load(&[("ENVIRONMENT", "dev")]).is_err());
    }

    #[test]
    fn token_lifetime_out_of_range_is_fatal() {
        let huge = i64::MAX.to_string();
        for raw in ["0", "-5", "1000000000000", huge.as_str()] {
            let Err(ConfigError::Invalid { var, .. }) =
                load(&[("ACCESS_TOKEN_EXPIRE_MINUTES", raw)])
            else {
                panic!("lifetime {raw} should be rejected");
            };
            assert_eq!(var, "ACCESS_TOKEN_EXPIRE_MINUTES");
        }

        let year = MAX_ACCESS_TOKEN_EXPIRE_MINUTES.to_string();
        let s = loaded(&[("ACCESS_TOKEN_EXPIRE_MINUTES", year.as_str())]);
        assert_eq!(s.access_token_ttl(), chrono::Duration::days(365));
    }

    #[test]
    fn oversized_lifetime_set_directly_saturates() {
        let mut s = loaded(&[]);
        s.access_token_expire_minutes = i64::MAX;
        assert_eq!(s.access_token_ttl(), chrono::Duration::max_value());
    }

    #[test]
    fn cors_origins_include_frontend_and_strip_slash() {
        let s = loaded(&[
            ("BACKEND_CORS_ORIGINS", "http://a.test/, http://b.test"),
            ("FRONTEND_HOST", "http://front.test"),
        ]);
        assert_eq!(
            s.cors_origins(),
            vec!["http://a.test", "http://b.test", "http://front.test"]
        );
    }

    #[test]
    fn secret_debug_is_redacted() {
        let s = loaded(&[("POSTGRES_PASSWORD", "hunter2")]);
        assert!(!format!("{s:?}").contains("hunter2"));
    }
}
