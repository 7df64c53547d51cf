//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business rule failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Authentication and authorization failures.
///
/// The credential variants carry no detail on purpose: callers must not be
/// able to tell an unknown username from a wrong password, or an expired
/// token from a forged one.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Refresh token is not valid")]
    RefreshTokenNotValid,

    #[error("Invalid password update token")]
    InvalidPasswordUpdateToken,

    #[error("User not found")]
    UserNotFound,

    /// Codec-level failure: bad signature, wrong algorithm, malformed or expired.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Token encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}
