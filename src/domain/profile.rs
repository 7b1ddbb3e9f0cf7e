//! Deployment enums resolved once at startup.
//!
//! [`Environment`], [`BackendProfile`] and [`PoolMode`] are parsed from
//! their environment-variable spellings and never change afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a string does not name any variant of a deployment enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised value `{0}`")]
pub struct UnknownVariant(pub String);

/// Deployment stage the process runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Developer machine; insecure secrets only warn.
    #[default]
    Local,
    /// Pre-production deployment.
    Staging,
    /// Production deployment.
    Production,
}

impl Environment {
    /// Returns `true` for [`Environment::Local`].
    #[must_use]
    pub const fn is_local(self) -> bool {
        matches!(self, Self::Local)
    }

    /// Returns the lowercase spelling used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which database deployment flavour supplies the connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProfile {
    /// Directly reachable PostgreSQL server (`POSTGRES_*` keys).
    #[default]
    Postgres,
    /// Hosted PostgreSQL behind a pooling proxy (`SUPABASE_DB_*` keys).
    Supabase,
}

impl BackendProfile {
    /// Returns the spelling used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Supabase => "supabase",
        }
    }
}

impl FromStr for BackendProfile {
    type Err = UnknownVariant;

    /// Accepts `postgres`, and either `supabase` or `alternative` for the
    /// hosted profile.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "supabase" | "alternative" => Ok(Self::Supabase),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for BackendProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pooling discipline of the hosted backend's connection proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolMode {
    /// One server connection per client session; prepared statements work.
    #[default]
    Session,
    /// Server connection returned after each transaction; no prepared
    /// statements across transactions.
    Transaction,
}

impl PoolMode {
    /// Port the proxy listens on for this mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Session => 5432,
            Self::Transaction => 6543,
        }
    }

    /// Returns the lowercase spelling used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Transaction => "transaction",
        }
    }
}

impl FromStr for PoolMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "transaction" => Ok(Self::Transaction),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for PoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
