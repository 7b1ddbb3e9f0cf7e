//! REST endpoint handlers organized by resource.

pub mod login;
pub mod system;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under the API prefix.
pub fn routes() -> Router<AppState> {
    Router::new().merge(login::routes()).merge(users::routes())
}
