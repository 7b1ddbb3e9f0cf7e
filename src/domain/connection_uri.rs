//! Structured database connection URI with a masked rendering.
//!
//! [`ConnectionUri`] keeps the connection components apart so the driver
//! can be configured field by field. Its `Display` and `Debug` output
//! replace the password with [`PASSWORD_MASK`]; the raw password is only
//! reachable from inside the crate.

use std::fmt;

/// Placeholder rendered instead of the password.
pub const PASSWORD_MASK: &str = "****";

/// Scheme used for every PostgreSQL connection URI.
pub const POSTGRES_SCHEME: &str = "postgresql";

/// Connection components for one database.
///
/// Built once from settings at startup and immutable thereafter.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionUri {
    scheme: String,
    username: String,
    password: String,
    host: String,
    port: u16,
    database: String,
}

impl ConnectionUri {
    /// Creates a PostgreSQL URI from its components.
    #[must_use]
    pub fn postgres(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
    ) -> Self {
        Self {
            scheme: POSTGRES_SCHEME.to_string(),
            username: username.into(),
            password: password.into(),
            host: host.into(),
            port,
            database: database.into(),
        }
    }

    /// URI scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Login role.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Server host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Database name (the URI path without its leading `/`).
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Renders the URI with the password replaced by [`PASSWORD_MASK`].
    ///
    /// This is the only form that may be written to logs.
    #[must_use]
    pub fn masked(&self) -> String {
        let credentials = if self.password.is_empty() {
            self.username.clone()
        } else {
            format!("{}:{PASSWORD_MASK}", self.username)
        };
        format!(
            "{}://{credentials}@{}:{}/{}",
            self.scheme, self.host, self.port, self.database
        )
    }
}

impl fmt::Display for ConnectionUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl fmt::Debug for ConnectionUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionUri").field(&self.masked()).finish()
    }
}
