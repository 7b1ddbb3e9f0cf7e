//! Domain layer: deployment enums, connection URI, and the user entity.
//!
//! These types carry no I/O. They are produced by the configuration
//! resolver and consumed by the persistence and service layers.

pub mod connection_uri;
pub mod profile;
pub mod user;

pub use connection_uri::ConnectionUri;
pub use profile::{BackendProfile, Environment, PoolMode, UnknownVariant};
pub use user::{NewUser, User};
