//! Service layer: authentication, security primitives, bootstrap, and
//! analytics.
//!
//! [`AuthService`] is the authentication gate every protected request
//! passes through. [`bootstrap::init_db`] runs once at startup.

pub mod analytics;
pub mod auth_service;
pub mod bootstrap;
pub mod security;

pub use analytics::{Analytics, AnalyticsEvent, NoopAnalytics, PostHogAnalytics};
pub use auth_service::AuthService;
