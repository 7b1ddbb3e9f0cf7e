//! User read handlers.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::UserPublic;
use crate::api::extractors::CurrentUser;
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};
use crate::service::AuthService;

/// `GET /users/me`: The authenticated user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    summary = "Current user",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Authenticated user", body = UserPublic),
        (status = 400, description = "Inactive user", body = ErrorResponse),
        (status = 403, description = "Invalid token", body = ErrorResponse),
        (status = 404, description = "Token subject unknown", body = ErrorResponse),
    )
)]
pub async fn read_user_me(CurrentUser(user): CurrentUser) -> Json<UserPublic> {
    Json(user.into())
}

/// `GET /users/{id}`: A user by id; superusers only, except for oneself.
///
/// # Errors
///
/// Returns [`AppError::InsufficientPrivilege`] when a regular user asks
/// for someone else, [`AppError::UserNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "User by id",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserPublic),
        (status = 403, description = "Not enough privileges", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn read_user_by_id(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserPublic>, AppError> {
    if caller.id == id {
        return Ok(Json(caller.into()));
    }
    AuthService::require_superuser(&caller)?;

    let user = state
        .auth
        .users()
        .get_by_id(id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(Json(user.into()))
}

/// User routes, relative to the API prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(read_user_me))
        .route("/users/{id}", get(read_user_by_id))
}
