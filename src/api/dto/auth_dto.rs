//! DTOs for the login endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OAuth2 password-grant form (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginForm {
    /// Login e-mail.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Response body of `POST /login/access-token`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed access token.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

impl TokenResponse {
    /// Wraps a token with the `bearer` type.
    #[must_use]
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
