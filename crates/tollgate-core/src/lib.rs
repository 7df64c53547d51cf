//! # Tollgate Core
//!
//! The domain layer of the Tollgate session service.
//! Token lifecycle, authorization rules and the session protocol live here,
//! written against ports only. Adapters are provided by `tollgate-infra`.

pub mod auth;
pub mod domain;
pub mod error;
pub mod ports;

pub use error::{AuthError, DomainError, RepoError};
