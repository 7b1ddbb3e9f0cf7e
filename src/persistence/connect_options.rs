//! Backend-specific low-level connection options.
//!
//! [`select`] is a pure mapping from the resolved profile to the option
//! set the engine applies to every physical connection.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{BackendProfile, Environment, PoolMode};

/// Schema search path forced on hosted connections.
pub const SEARCH_PATH: &str = "public";

/// Server-side statement timeout for hosted connections, in milliseconds.
pub const STATEMENT_TIMEOUT_MS: i64 = 60_000;

/// Option names understood by the engine builder.
pub mod keys {
    /// Schema search path (server setting).
    pub const SEARCH_PATH: &str = "search_path";
    /// Statement timeout in milliseconds (server setting).
    pub const STATEMENT_TIMEOUT: &str = "statement_timeout";
    /// TCP keep-alive switch.
    pub const KEEPALIVES: &str = "keepalives";
    /// Seconds of idleness before the first keep-alive probe.
    pub const KEEPALIVES_IDLE: &str = "keepalives_idle";
    /// Seconds between keep-alive probes.
    pub const KEEPALIVES_INTERVAL: &str = "keepalives_interval";
    /// Unanswered probes before the connection is dropped.
    pub const KEEPALIVES_COUNT: &str = "keepalives_count";
    /// Executions before a statement is prepared; `0` disables caching.
    pub const PREPARE_THRESHOLD: &str = "prepare_threshold";
}

/// Value of a single connection option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Text value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Flag value.
    Bool(bool),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Ordered mapping from option name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions(BTreeMap<&'static str, OptionValue>);

impl ConnectionOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: &'static str, value: OptionValue) {
        self.0.insert(key, value);
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// Returns the integer value for `key`, if it holds one.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(OptionValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Returns `true` when no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of options set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Prepared-statement threshold, when the backend restricts it.
    #[must_use]
    pub fn prepare_threshold(&self) -> Option<i64> {
        self.get_int(keys::PREPARE_THRESHOLD)
    }
}

impl fmt::Display for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Selects connection options for the resolved backend profile.
///
/// The direct profile needs nothing beyond driver defaults. The hosted
/// profile always pins the search path and statement timeout; session
/// mode adds TCP keep-alive tuning, and transaction mode disables
/// prepared statements because the proxy hands the server connection to
/// another client after every transaction.
///
/// No stage currently changes the options; `environment` is accepted so
/// callers pass the full deployment context.
#[must_use]
pub fn select(
    profile: BackendProfile,
    pool_mode: PoolMode,
    _environment: Environment,
) -> ConnectionOptions {
    let mut options = ConnectionOptions::new();
    if profile == BackendProfile::Postgres {
        return options;
    }

    options.insert(keys::SEARCH_PATH, OptionValue::Str(SEARCH_PATH.to_string()));
    options.insert(keys::STATEMENT_TIMEOUT, OptionValue::Int(STATEMENT_TIMEOUT_MS));

    match pool_mode {
        PoolMode::Session => {
            options.insert(keys::KEEPALIVES, OptionValue::Int(1));
            options.insert(keys::KEEPALIVES_IDLE, OptionValue::Int(30));
            options.insert(keys::KEEPALIVES_INTERVAL, OptionValue::Int(10));
            options.insert(keys::KEEPALIVES_COUNT, OptionValue::Int(5));
        }
        PoolMode::Transaction => {
            options.insert(keys::PREPARE_THRESHOLD, OptionValue::Int(0));
        }
    }

    options
}
