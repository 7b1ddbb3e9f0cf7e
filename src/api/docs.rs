//! OpenAPI document.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::{LoginForm, TokenResponse, UserPublic};
use super::handlers::{login, system, users};
use crate::error::{ErrorBody, ErrorResponse};

/// Prefix the versioned paths are declared with in [`ApiDoc`].
pub const DOCUMENTED_API_PREFIX: &str = "/api/v1";

/// Generated OpenAPI description of every REST endpoint.
///
/// Versioned paths are declared under [`DOCUMENTED_API_PREFIX`]; use
/// [`openapi_for_prefix`] to match a different `API_V1_STR`.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        system::health_handler,
        system::db_health_handler,
        login::login_access_token,
        login::test_token,
        users::read_user_me,
        users::read_user_by_id,
    ),
    components(schemas(
        LoginForm,
        TokenResponse,
        UserPublic,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Liveness and readiness"),
        (name = "Login", description = "Access tokens"),
        (name = "Users", description = "User accounts"),
    )
)]
pub struct ApiDoc;

/// The OpenAPI document with versioned paths moved under `prefix`.
#[must_use]
pub fn openapi_for_prefix(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let prefix = prefix.trim_end_matches('/');
    if prefix == DOCUMENTED_API_PREFIX {
        return doc;
    }
    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| match path.strip_prefix(DOCUMENTED_API_PREFIX) {
            Some(rest) if rest.starts_with('/') => (format!("{prefix}{rest}"), item),
            _ => (path, item),
        })
        .collect();
    doc
}

/// Registers the `bearer` JWT security scheme.
#[derive(Debug)]
pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
