//! DTOs for user endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::User;

/// User as exposed over the API; never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    /// Primary key.
    pub id: Uuid,
    /// Login e-mail.
    pub email: String,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Account enabled.
    pub is_active: bool,
    /// Superuser flag.
    pub is_superuser: bool,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
        }
    }
}
