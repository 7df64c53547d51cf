//! SeaORM entities.

pub mod recovery_token;
pub mod role;
pub mod user;
