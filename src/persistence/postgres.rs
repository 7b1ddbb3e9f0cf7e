//! PostgreSQL implementation of [`UserStore`].

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::{Engine, UserStore};
use crate::domain::{NewUser, User};
use crate::error::AppError;

/// PostgreSQL-backed user store sharing the process-wide [`Engine`].
#[derive(Debug, Clone)]
pub struct PgUserStore {
    engine: Arc<Engine>,
}

impl PgUserStore {
    /// Creates a store on top of the given engine.
    #[must_use]
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Engine the store runs on.
    #[must_use]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let mut uow = self.engine.unit_of_work().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, hashed_password, full_name, is_active, is_superuser \
             FROM \"user\" WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(uow.connection())
        .await?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut uow = self.engine.unit_of_work().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, hashed_password, full_name, is_active, is_superuser \
             FROM \"user\" WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(uow.connection())
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let user = user.into_user();
        let mut uow = self.engine.unit_of_work().await?;
        sqlx::query(
            "INSERT INTO \"user\" (id, email, hashed_password, full_name, is_active, is_superuser) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.full_name)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .execute(uow.connection())
        .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }
}
