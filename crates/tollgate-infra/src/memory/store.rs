//! In-memory implementation of the user, role and recovery token stores.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use tollgate_core::domain::{NewUser, PasswordRecoveryToken, Role, User};
use tollgate_core::error::RepoError;
use tollgate_core::ports::{
    BaseRepository, Clock, RecoveryTokenRepository, RoleRepository, SystemClock, UserRepository,
};

struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role_id: Option<i64>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, UserRow>,
    roles: BTreeMap<i64, Role>,
    recovery_tokens: HashMap<String, PasswordRecoveryToken>,
    next_user_id: i64,
    next_role_id: i64,
}

impl Tables {
    fn materialize(&self, row: &UserRow) -> User {
        User {
            id: row.id,
            username: row.username.clone(),
            email: row.email.clone(),
            password_hash: row.password_hash.clone(),
            role: row.role_id.and_then(|id| self.roles.get(&id).cloned()),
        }
    }

    fn find_user(&self, pred: impl Fn(&UserRow) -> bool) -> Option<User> {
        self.users
            .values()
            .find(|row| pred(row))
            .map(|row| self.materialize(row))
    }
}

/// All tables behind one async `RwLock`, so a multi-row write is atomic.
///
/// Data is lost on process restart. Used and expired recovery tokens are
/// dropped whenever a new one is stored.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Judge recovery token expiry by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }

    /// Remove a user outright. Accounts are never deleted by the service itself;
    /// this exists for administration and tests.
    pub async fn remove_user(&self, id: i64) -> bool {
        self.tables.write().await.users.remove(&id).is_some()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|row| tables.materialize(row)))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.find_user(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.find_user(|u| u.email == email))
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepoError::Constraint("User already exists".to_string()));
        }

        tables.next_user_id += 1;
        let row = UserRow {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role_id: None,
        };
        let created = tables.materialize(&row);
        tables.users.insert(row.id, row);

        Ok(created)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let row = tables.users.get_mut(&id).ok_or(RepoError::NotFound)?;
        row.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.roles.contains_key(&role_id) {
            return Err(RepoError::Constraint(format!("Unknown role id {}", role_id)));
        }

        let row = tables.users.get_mut(&user_id).ok_or(RepoError::NotFound)?;
        row.role_id = Some(role_id);

        let tables = &*tables;
        tables
            .users
            .get(&user_id)
            .map(|row| tables.materialize(row))
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl BaseRepository<Role, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, RepoError> {
        Ok(self.tables.read().await.roles.get(&id).cloned())
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepoError> {
        Ok(self
            .tables
            .read()
            .await
            .roles
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn ensure(&self, name: &str) -> Result<Role, RepoError> {
        let mut tables = self.tables.write().await;

        if let Some(role) = tables.roles.values().find(|r| r.name == name) {
            return Ok(role.clone());
        }

        tables.next_role_id += 1;
        let role = Role {
            id: tables.next_role_id,
            name: name.to_string(),
        };
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }
}

#[async_trait]
impl RecoveryTokenRepository for InMemoryStore {
    async fn create(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let now = self.clock.now();
        let mut tables = self.tables.write().await;

        let before = tables.recovery_tokens.len();
        tables
            .recovery_tokens
            .retain(|_, record| record.is_redeemable(now));
        let pruned = before - tables.recovery_tokens.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned stale recovery tokens");
        }

        if tables.recovery_tokens.contains_key(token) {
            return Err(RepoError::Constraint("Recovery token already exists".to_string()));
        }

        tables.recovery_tokens.insert(
            token.to_string(),
            PasswordRecoveryToken::new(token.to_string(), email.to_string(), expires_at),
        );
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordRecoveryToken>, RepoError> {
        Ok(self.tables.read().await.recovery_tokens.get(token).cloned())
    }

    async fn consume(&self, token: &str) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;

        match tables.recovery_tokens.get_mut(token) {
            Some(record) if !record.used => {
                record.used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn redeem(
        &self,
        token: &str,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;

        let redeemable = tables
            .recovery_tokens
            .get(token)
            .is_some_and(|record| !record.used);
        if !redeemable || !tables.users.contains_key(&user_id) {
            return Ok(false);
        }

        if let Some(record) = tables.recovery_tokens.get_mut(token) {
            record.used = true;
        }
        if let Some(row) = tables.users.get_mut(&user_id) {
            row.password_hash = password_hash.to_string();
        }

        Ok(true)
    }
}
