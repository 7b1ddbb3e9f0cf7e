//! Authentication gate: resolves bearer tokens to active users.

use std::sync::Arc;

use uuid::Uuid;

use super::security;
use crate::config::Secret;
use crate::domain::User;
use crate::error::AppError;
use crate::persistence::UserStore;

/// Validates tokens and credentials against the user store.
///
/// Stateless per call: nothing decoded or resolved is cached between
/// requests. Every call follows decode → resolve → check active.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    secret: Secret,
    token_ttl: chrono::Duration,
}

impl AuthService {
    /// Creates a gate over `users`, signing with `secret`.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, secret: Secret, token_ttl: chrono::Duration) -> Self {
        Self {
            users,
            secret,
            token_ttl,
        }
    }

    /// Underlying user store.
    #[must_use]
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Resolves a bearer token to an active user.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthenticated`] if the token fails validation or
    ///   its subject is not a user id.
    /// - [`AppError::UserNotFound`] if no user has that id.
    /// - [`AppError::InactiveAccount`] if the user is deactivated.
    /// - [`AppError::Connection`] if the store is unavailable.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = security::decode_access_token(token, self.secret.expose())?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthenticated)?;

        let user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.is_active {
            return Err(AppError::InactiveAccount);
        }
        Ok(user)
    }

    /// Checks that the caller holds the superuser flag.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InsufficientPrivilege`] for regular users.
    pub fn require_superuser(user: &User) -> Result<(), AppError> {
        if user.is_superuser {
            Ok(())
        } else {
            Err(AppError::InsufficientPrivilege)
        }
    }

    /// Verifies e-mail and password for the login flow.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidCredentials`] for an unknown e-mail or a
    ///   wrong password.
    /// - [`AppError::InactiveAccount`] if the user is deactivated.
    pub async fn authenticate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !security::verify_password(password, &user.hashed_password)? {
            return Err(AppError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AppError::InactiveAccount);
        }
        Ok(user)
    }

    /// Issues an access token for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if signing fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        security::create_access_token(&user.id.to_string(), self.secret.expose(), self.token_ttl)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryUserStore;

    const SECRET: &str = "gate-secret";

    fn user(active: bool, superuser: bool) -> User {
        let Ok(hashed_password) = security::hash_password("pw") else {
            panic!("hashing failed");
        };
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            hashed_password,
            full_name: None,
            is_active: active,
            is_superuser: superuser,
        }
    }

    async fn gate_with(users: &[User]) -> AuthService {
        let store = InMemoryUserStore::new();
        for u in users {
            store.insert(u.clone()).await;
        }
        AuthService::new(
            Arc::new(store),
            Secret::new(SECRET),
            chrono::Duration::minutes(10),
        )
    }

    fn token_for(subject: &str, ttl: chrono::Duration) -> String {
        match security::create_access_token(subject, SECRET, ttl) {
            Ok(token) => token,
            Err(e) => panic!("encoding failed: {e}"),
        }
    }

    #[tokio::test]
    async fn valid_token_for_active_user_succeeds() {
        let u = user(true, false);
        let gate = gate_with(std::slice::from_ref(&u)).await;
        let Ok(token) = gate.issue_token(&u) else {
            panic!("issue failed");
        };
        let Ok(resolved) = gate.authenticate(&token).await else {
            panic!("authentication failed");
        };
        assert_eq!(resolved, u);
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let gate = gate_with(&[]).await;
        let token = token_for(&Uuid::new_v4().to_string(), chrono::Duration::minutes(5));
        let result = gate.authenticate(&token).await;
        assert!(matches!(result, Err(AppError::UserNotFound)));
    }

    #[tokio::test]
    async fn inactive_user_is_rejected() {
        let u = user(false, false);
        let gate = gate_with(std::slice::from_ref(&u)).await;
        let token = token_for(&u.id.to_string(), chrono::Duration::minutes(5));
        let result = gate.authenticate(&token).await;
        assert!(matches!(result, Err(AppError::InactiveAccount)));
    }

    #[tokio::test]
    async fn expired_token_is_unauthenticated() {
        let u = user(true, false);
        let gate = gate_with(std::slice::from_ref(&u)).await;
        let token = token_for(&u.id.to_string(), chrono::Duration::hours(-1));
        let result = gate.authenticate(&token).await;
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn non_uuid_subject_is_unauthenticated() {
        let gate = gate_with(&[]).await;
        let token = token_for("42", chrono::Duration::minutes(5));
        let result = gate.authenticate(&token).await;
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn regular_user_lacks_superuser_privilege() {
        let u = user(true, false);
        let gate = gate_with(std::slice::from_ref(&u)).await;
        let token = token_for(&u.id.to_string(), chrono::Duration::minutes(5));
        let Ok(resolved) = gate.authenticate(&token).await else {
            panic!("authentication failed");
        };
        let result = AuthService::require_superuser(&resolved);
        assert!(matches!(result, Err(AppError::InsufficientPrivilege)));

        assert!(AuthService::require_superuser(&user(true, true)).is_ok());
    }

    #[tokio::test]
    async fn credentials_check_password_and_active_flag() {
        let active = user(true, false);
        let inactive = user(false, false);
        let gate = gate_with(&[active.clone(), inactive.clone()]).await;

        assert!(gate.authenticate_credentials(&active.email, "pw").await.is_ok());
        assert!(matches!(
            gate.authenticate_credentials(&active.email, "nope").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            gate.authenticate_credentials("missing@example.com", "pw").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            gate.authenticate_credentials(&inactive.email, "pw").await,
            Err(AppError::InactiveAccount)
        ));
    }
}
