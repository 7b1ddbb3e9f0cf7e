//! In-memory [`UserStore`] for tests and local experiments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserStore;
use crate::domain::{NewUser, User};
use crate::error::AppError;

/// User store backed by a `HashMap` behind a Tokio `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed user, replacing any row with the same id.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` when no user is stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Internal(format!(
                "user with email {} already exists",
                user.email
            )));
        }
        let user = user.into_user();
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            hashed_password: "hash".to_string(),
            full_name: None,
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn create_then_lookup() {
        let store = InMemoryUserStore::new();
        let Ok(user) = store.create(new_user("a@example.com")).await else {
            panic!("create failed");
        };
        assert!(user.is_active);

        let by_id = store.get_by_id(user.id).await.ok().flatten();
        assert_eq!(by_id.as_ref(), Some(&user));

        let by_email = store.get_by_email("a@example.com").await.ok().flatten();
        assert_eq!(by_email, Some(user));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryUserStore::new();
        assert!(store.create(new_user("a@example.com")).await.is_ok());
        assert!(store.create(new_user("a@example.com")).await.is_err());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_user_is_none() {
        let store = InMemoryUserStore::new();
        assert!(store.is_empty().await);
        let found = store.get_by_id(Uuid::new_v4()).await;
        assert!(matches!(found, Ok(None)));
    }
}
