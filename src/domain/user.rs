//! Persisted user account.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the `"user"` table.
///
/// The authentication gate only reads users. Rows are created by the
/// bootstrap routine or an administrative flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Primary key; also the `sub` claim of issued tokens.
    pub id: Uuid,
    /// Unique login e-mail.
    pub email: String,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Inactive users are rejected by the gate.
    pub is_active: bool,
    /// Grants access to privileged operations.
    pub is_superuser: bool,
}

/// Fields needed to insert a new [`User`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login e-mail.
    pub email: String,
    /// Already hashed password.
    pub hashed_password: String,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Superuser flag.
    pub is_superuser: bool,
}

impl NewUser {
    /// Materialises the row with a fresh id. New users start active.
    #[must_use]
    pub fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            email: self.email,
            hashed_password: self.hashed_password,
            full_name: self.full_name,
            is_active: true,
            is_superuser: self.is_superuser,
        }
    }
}
