//! Application error types with HTTP status code mapping.
//!
//! [`AppError`] is the central request-time error type. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Messages never include connection credentials.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2003,
///     "message": "inactive user"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`AppError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status          |
/// |-----------|-----------------|----------------------|
/// | 1000–1999 | Authentication  | 401 / 403            |
/// | 2000–2999 | Account state   | 400 / 404            |
/// | 3000–3999 | Server          | 500                  |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No bearer token was supplied.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Token signature, expiry, or payload failed validation.
    #[error("could not validate credentials")]
    Unauthenticated,

    /// Authenticated user lacks the superuser flag.
    #[error("the user doesn't have enough privileges")]
    InsufficientPrivilege,

    /// Token subject does not match any user.
    #[error("user not found")]
    UserNotFound,

    /// Resolved user is deactivated.
    #[error("inactive user")]
    InactiveAccount,

    /// Login e-mail or password is wrong.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Pool exhausted, backend unreachable, or connection dropped.
    #[error("database connection error: {0}")]
    Connection(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::NotAuthenticated => 1001,
            Self::Unauthenticated => 1002,
            Self::InsufficientPrivilege => 1003,
            Self::UserNotFound => 2001,
            Self::InvalidCredentials => 2002,
            Self::InactiveAccount => 2003,
            Self::Internal(_) => 3000,
            Self::Connection(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthenticated | Self::InsufficientPrivilege => StatusCode::FORBIDDEN,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::InactiveAccount | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::Connection(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::Connection(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_documented_statuses() {
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InactiveAccount.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InsufficientPrivilege.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotAuthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn pool_timeout_is_a_connection_error() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Connection(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn row_not_found_is_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn into_response_sets_status() {
        let response = AppError::InactiveAccount.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_codes_are_unique() {
        let all = [
            AppError::NotAuthenticated,
            AppError::Unauthenticated,
            AppError::InsufficientPrivilege,
            AppError::UserNotFound,
            AppError::InvalidCredentials,
            AppError::InactiveAccount,
            AppError::Connection(String::new()),
            AppError::Internal(String::new()),
        ];
        let mut codes: Vec<u32> = all.iter().map(AppError::error_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
