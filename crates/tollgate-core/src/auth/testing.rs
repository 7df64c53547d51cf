//! Test doubles for the auth services.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewUser, PasswordRecoveryToken, Role, User};
use crate::error::{AuthError, RepoError};
use crate::ports::{
    BaseRepository, Clock, ManualClock, Notifier, NotifierError, PasswordService,
    RecoveryTokenRepository, RoleRepository, TokenClaims, TokenCodec, UserRepository,
};

/// Unsigned codec: plain JSON, with expiry enforced against the injected clock.
///
/// Like a JWT library, it refuses a `sub` that is not a string.
pub struct FakeCodec {
    clock: Arc<ManualClock>,
}

impl FakeCodec {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self { clock }
    }
}

impl TokenCodec for FakeCodec {
    fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        serde_json::to_string(claims).map_err(|e| AuthError::Encoding(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let raw: serde_json::Value =
            serde_json::from_str(token).map_err(|_| AuthError::InvalidToken)?;
        if raw.get("sub").is_some_and(|sub| !sub.is_string()) {
            return Err(AuthError::InvalidToken);
        }
        let claims: TokenClaims =
            serde_json::from_value(raw).map_err(|_| AuthError::InvalidToken)?;
        if self.clock.now().timestamp() > claims.exp {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}

pub fn start_clock() -> ManualClock {
    ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
}

pub fn admin_role() -> Role {
    Role {
        id: 1,
        name: "admin".to_string(),
    }
}

pub fn user_role() -> Role {
    Role {
        id: 2,
        name: "user".to_string(),
    }
}

pub fn admin_user() -> User {
    User {
        id: 1,
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        password_hash: "hash".to_string(),
        role: Some(admin_role()),
    }
}

pub fn regular_user(id: i64) -> User {
    User {
        id,
        username: format!("user{}", id),
        email: format!("user{}@example.com", id),
        password_hash: "hash".to_string(),
        role: Some(user_role()),
    }
}

/// Users and roles kept in vectors.
pub struct FakeStore {
    users: Mutex<Vec<User>>,
    roles: Vec<Role>,
}

impl FakeStore {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            roles: vec![admin_role(), user_role()],
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn find_user(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| pred(u)).cloned()
    }
}

#[async_trait]
impl BaseRepository<User, i64> for FakeStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.find_user(|u| u.id == id))
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self.find_user(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.find_user(|u| u.email == email))
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        let created = User {
            id: users.len() as i64 + 1,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: None,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), RepoError> {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id == id).ok_or(RepoError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<User, RepoError> {
        let role = self.roles.iter().find(|r| r.id == role_id).cloned();
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(RepoError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }
}

#[async_trait]
impl BaseRepository<Role, i64> for FakeStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, RepoError> {
        Ok(self.roles.iter().find(|r| r.id == id).cloned())
    }
}

#[async_trait]
impl RoleRepository for FakeStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepoError> {
        Ok(self.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn ensure(&self, name: &str) -> Result<Role, RepoError> {
        self.find_by_name(name).await?.ok_or(RepoError::NotFound)
    }
}

/// Password service that accepts exactly one stored hash and counts calls.
pub struct CountingPasswords {
    accepted_hash: String,
    verify_calls: AtomicUsize,
    hash_calls: AtomicUsize,
    last_hash: Mutex<Option<String>>,
}

impl CountingPasswords {
    pub fn accepting(hash: &str) -> Self {
        Self {
            accepted_hash: hash.to_string(),
            verify_calls: AtomicUsize::new(0),
            hash_calls: AtomicUsize::new(0),
            last_hash: Mutex::new(None),
        }
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn hash_calls(&self) -> usize {
        self.hash_calls.load(Ordering::SeqCst)
    }

    /// Stored hash passed to the most recent `verify`.
    pub fn last_hash(&self) -> Option<String> {
        self.last_hash.lock().unwrap().clone()
    }
}

impl PasswordService for CountingPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        self.hash_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("hashed:{}", password))
    }

    fn verify(&self, _password: &str, hash: &str) -> bool {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_hash.lock().unwrap() = Some(hash.to_string());
        hash == self.accepted_hash
    }
}

#[derive(Default)]
pub struct FakeRecoveryTokens {
    tokens: Mutex<HashMap<String, PasswordRecoveryToken>>,
}

#[async_trait]
impl RecoveryTokenRepository for FakeRecoveryTokens {
    async fn create(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let record = PasswordRecoveryToken::new(token.to_string(), email.to_string(), expires_at);
        self.tokens.lock().unwrap().insert(token.to_string(), record);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordRecoveryToken>, RepoError> {
        Ok(self.tokens.lock().unwrap().get(token).cloned())
    }

    async fn consume(&self, token: &str) -> Result<bool, RepoError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get_mut(token) {
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
        _user_id: i64,
        _password_hash: &str,
    ) -> Result<bool, RepoError> {
        self.consume(token).await
    }
}

pub struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn send_password_recovery_email(
        &self,
        _email: &str,
        _recovery_url: &str,
    ) -> Result<(), NotifierError> {
        Ok(())
    }
}
