//! # forge-backend
//!
//! Web backend core: environment-driven database configuration, a
//! process-wide PostgreSQL engine, and the bearer-token authentication
//! gate every protected request passes through.
//!
//! ## Architecture
//!
//! ```text
//! Settings (config/)                  environment → URI, profile, flags
//!     │
//!     ├── connect_options::select     profile → driver options
//!     ├── Engine (persistence/)       one pooled handle per process
//!     │
//!     ├── AuthService (service/)      token → active user
//!     ├── REST handlers (api/)        login, users, health
//!     │
//!     └── PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
