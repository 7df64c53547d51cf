//! # Tollgate Infrastructure
//!
//! Concrete implementations of the ports defined in `tollgate-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL stores via SeaORM
//! - `auth` - JWT token codec + Argon2 password hashing
//! - `webhook` - Webhook notifier via reqwest

pub mod database;
pub mod memory;
pub mod notify;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - Database
pub use database::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use database::{
    PostgresRecoveryTokenRepository, PostgresRoleRepository, PostgresUserRepository,
};

// Re-exports - In-Memory
pub use memory::InMemoryStore;
pub use notify::LogNotifier;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenCodec};

#[cfg(feature = "webhook")]
pub use notify::WebhookNotifier;
