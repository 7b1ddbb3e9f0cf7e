//! Persistence layer: engine construction and user storage.
//!
//! The [`Engine`] owns the PostgreSQL pool. User lookups go through the
//! [`UserStore`] trait so request handlers can run against either the
//! PostgreSQL implementation or the in-memory one used in tests.

pub mod connect_options;
pub mod engine;
pub mod memory;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewUser, User};
use crate::error::AppError;

pub use connect_options::{ConnectionOptions, OptionValue};
pub use engine::{Engine, PoolPolicy, UnitOfWork};
pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

/// Read access to users, plus insertion for the bootstrap routine.
#[async_trait]
pub trait UserStore: Debug + Send + Sync {
    /// Looks a user up by primary key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] when the backend is unavailable.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Looks a user up by e-mail.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] when the backend is unavailable.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Inserts a new user and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] on storage failure or duplicate e-mail.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
}
