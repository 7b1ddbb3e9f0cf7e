//! Startup routine: connection report and first superuser.

use crate::config::Settings;
use crate::domain::{BackendProfile, NewUser, User};
use crate::error::AppError;
use crate::persistence::{Engine, UserStore};

use super::security;

/// Logs masked connection info and ensures the first superuser exists.
///
/// Idempotent: an existing user with the configured e-mail is returned
/// untouched.
///
/// # Errors
///
/// Returns an [`AppError`] if the store is unreachable or hashing fails.
pub async fn init_db(
    settings: &Settings,
    engine: &Engine,
    users: &dyn UserStore,
) -> Result<User, AppError> {
    log_connection_info(settings, engine);

    if let Some(existing) = users.get_by_email(&settings.first_superuser).await? {
        tracing::debug!(email = %existing.email, "first superuser already present");
        return Ok(existing);
    }

    let hashed_password = security::hash_password(settings.first_superuser_password.expose())?;
    let user = users
        .create(NewUser {
            email: settings.first_superuser.clone(),
            hashed_password,
            full_name: None,
            is_superuser: true,
        })
        .await?;
    tracing::info!(email = %user.email, "first superuser created");
    Ok(user)
}

/// Writes the masked URL and profile details to the log.
pub fn log_connection_info(settings: &Settings, engine: &Engine) {
    tracing::info!(
        url = %engine.uri(),
        database_type = %settings.database_type,
        "database connection info"
    );
    if settings.database_type == BackendProfile::Supabase {
        tracing::info!(
            pool_mode = %settings.supabase.pool_mode,
            port = settings.hosted_port(),
            "hosted database pooling"
        );
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryUserStore;

    fn settings() -> Settings {
        match Settings::from_lookup(|key| match key {
            "FIRST_SUPERUSER" => Some("root@example.com".to_string()),
            "FIRST_SUPERUSER_PASSWORD" => Some("changeme".to_string()),
            _ => None,
        }) {
            Ok(s) => s,
            Err(e) => panic!("settings failed: {e}"),
        }
    }

    #[tokio::test]
    async fn creates_superuser_once() {
        let settings = settings();
        let engine = Engine::from_settings(&settings);
        let store = InMemoryUserStore::new();

        let Ok(first) = init_db(&settings, &engine, &store).await else {
            panic!("bootstrap failed");
        };
        assert!(first.is_superuser);
        assert!(first.is_active);
        assert_eq!(first.email, "root@example.com");
        assert!(matches!(
            security::verify_password("changeme", &first.hashed_password),
            Ok(true)
        ));

        let Ok(second) = init_db(&settings, &engine, &store).await else {
            panic!("second bootstrap failed");
        };
        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }
}
