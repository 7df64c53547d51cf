//! Database connection management and PostgreSQL stores.

mod connections;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;
#[cfg(feature = "postgres")]
pub mod schema;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::connect;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresRecoveryTokenRepository, PostgresRoleRepository, PostgresUserRepository,
};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
