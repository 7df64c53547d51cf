use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewUser, PasswordRecoveryToken, Role, User};
use crate::error::RepoError;

/// Lookup by primary key, shared by every store.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User store. Users are returned with their role loaded.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Insert a new user. Fails with `RepoError::Constraint` on a duplicate username or email.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), RepoError>;

    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<User, RepoError>;
}

/// Role store.
#[async_trait]
pub trait RoleRepository: BaseRepository<Role, i64> {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepoError>;

    /// Return the role with this name, creating it when absent.
    async fn ensure(&self, name: &str) -> Result<Role, RepoError>;
}

/// Password recovery token store.
#[async_trait]
pub trait RecoveryTokenRepository: Send + Sync {
    async fn create(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordRecoveryToken>, RepoError>;

    /// Mark a token used. Returns false when it was unknown or already used.
    async fn consume(&self, token: &str) -> Result<bool, RepoError>;

    /// Consume the token and store the new password hash as one unit of work.
    ///
    /// Returns false, writing nothing, when the token was unknown or already used.
    async fn redeem(
        &self,
        token: &str,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, RepoError>;
}
