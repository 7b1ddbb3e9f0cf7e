//! Login handlers: token issuance and token check.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Map, Value};

use crate::api::dto::{LoginForm, TokenResponse, UserPublic};
use crate::api::extractors::{CurrentUser, LoginCredentials};
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};

/// `POST /login/access-token`: OAuth2 password grant.
///
/// Takes a URL-encoded form or the same fields as a JSON object.
///
/// # Errors
///
/// Returns [`AppError::InvalidCredentials`] or
/// [`AppError::InactiveAccount`].
#[utoipa::path(
    post,
    path = "/api/v1/login/access-token",
    tag = "Login",
    summary = "Obtain an access token",
    description = "Exchanges e-mail and password for a bearer token.",
    request_body(
        content = LoginForm,
        content_type = "application/x-www-form-urlencoded",
        description = "Also accepted as `application/json`."
    ),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Wrong credentials or inactive user", body = ErrorResponse),
    )
)]
pub async fn login_access_token(
    State(state): State<AppState>,
    LoginCredentials(form): LoginCredentials,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .auth
        .authenticate_credentials(&form.username, &form.password)
        .await?;
    let token = state.auth.issue_token(&user)?;

    let mut traits = Map::new();
    traits.insert("email".to_string(), Value::String(user.email.clone()));
    state.analytics.identify(&user.id.to_string(), traits);

    tracing::info!(user_id = %user.id, "access token issued");
    Ok(Json(TokenResponse::bearer(token)))
}

/// `POST /login/test-token`: Echo the token's user.
///
/// # Errors
///
/// Returns the authentication gate's error when the token is rejected.
#[utoipa::path(
    post,
    path = "/api/v1/login/test-token",
    tag = "Login",
    summary = "Test an access token",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token is valid", body = UserPublic),
        (status = 401, description = "No token", body = ErrorResponse),
        (status = 403, description = "Invalid token", body = ErrorResponse),
    )
)]
pub async fn test_token(CurrentUser(user): CurrentUser) -> Json<UserPublic> {
    Json(user.into())
}

/// Login routes, relative to the API prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login/access-token", post(login_access_token))
        .route("/login/test-token", post(test_token))
}
