//! Access tokens and password hashing.
//!
//! Tokens are HS256 JWTs signed with `SECRET_KEY` whose `sub` claim is the
//! user's primary key. Passwords are stored as Argon2id PHC strings.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Signature algorithm for every access token.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's primary key as a string.
    pub sub: String,
    /// Expiry as a Unix timestamp in seconds.
    pub exp: i64,
}

/// Issues a signed access token for `subject`, valid for `ttl`.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the expiry is not representable or
/// signing fails.
pub fn create_access_token(
    subject: &str,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, AppError> {
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(format!("token lifetime {ttl} is out of range")))?;
    let claims = TokenClaims {
        sub: subject.to_string(),
        exp: expires_at.timestamp(),
    };
    jsonwebtoken::encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
}

/// Verifies signature and expiry and returns the claims.
///
/// A single algorithm and secret are tried; there is no fallback key.
///
/// # Errors
///
/// Returns [`AppError::Unauthenticated`] for a bad signature, an expired
/// token, or a malformed payload.
pub fn decode_access_token(token: &str, secret: &str) -> Result<TokenClaims, AppError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.set_required_spec_claims(&["exp", "sub"]);

    jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "access token rejected");
        AppError::Unauthenticated
    })
}

/// Hashes a password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

/// Checks `password` against a stored PHC string.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the stored hash is malformed.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|e| AppError::Internal(format!("stored password hash is invalid: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!("failed to verify password: {e}"))),
    }
}
