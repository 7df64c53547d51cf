//! Session protocol: login, refresh, logout, registration and password flows.

use std::sync::Arc;

use crate::auth::{AccessControl, AuthConfig, TokenIssuer, TokenValidator};
use crate::domain::{IssuedTokens, NewUser, RefreshToken, User, mask_email};
use crate::error::{AuthError, DomainError, RepoError};
use crate::ports::{
    BaseRepository, Clock, Notifier, PasswordService, RecoveryTokenRepository, RoleRepository,
    TokenCodec, UserRepository,
};

/// Well-formed Argon2id hash with default cost parameters, verified against
/// when the username is unknown so that both login failures cost one hash.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$dG9sbGdhdGUtdW5rbm93bi11c2VyLWR1bW15LWhhc2g";

/// Collaborators the session service is wired with.
#[derive(Clone)]
pub struct SessionPorts {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub recovery_tokens: Arc<dyn RecoveryTokenRepository>,
    pub codec: Arc<dyn TokenCodec>,
    pub passwords: Arc<dyn PasswordService>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

/// Authenticated password change request.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub new_password: String,
    /// Current password of the target account, checked when present.
    pub current_password: Option<String>,
    /// Account to change; defaults to the acting user.
    pub user_id: Option<i64>,
}

/// Orchestrates the token issuer, validator and access control per request.
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    recovery_tokens: Arc<dyn RecoveryTokenRepository>,
    passwords: Arc<dyn PasswordService>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    issuer: TokenIssuer,
    validator: TokenValidator,
    access: AccessControl,
    config: AuthConfig,
}

impl SessionService {
    pub fn new(ports: SessionPorts, config: AuthConfig) -> Self {
        let issuer = TokenIssuer::new(
            ports.codec.clone(),
            ports.users.clone(),
            ports.clock.clone(),
            config.clone(),
        );
        let validator = TokenValidator::new(ports.codec, ports.clock.clone());
        let access = AccessControl::new(ports.users.clone(), ports.roles.clone());

        Self {
            users: ports.users,
            roles: ports.roles,
            recovery_tokens: ports.recovery_tokens,
            passwords: ports.passwords,
            notifier: ports.notifier,
            clock: ports.clock,
            issuer,
            validator,
            access,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// Unknown username and wrong password fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedTokens, AuthError> {
        let user = self.users.find_by_username(username).await?;

        let Some(user) = user else {
            self.verify_password(password, DUMMY_PASSWORD_HASH).await?;
            tracing::debug!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::debug!(user_id = user.id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issuer.issue_pair(&user).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(tokens)
    }

    /// Exchange a valid refresh token for a new access token and a new refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, AuthError> {
        let record = self.validator.validate_refresh(refresh_token)?;

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or(AuthError::RefreshTokenNotValid)?;

        let tokens = self.issuer.issue_pair(&user).await.map_err(|e| match e {
            AuthError::UserNotFound => AuthError::RefreshTokenNotValid,
            other => other,
        })?;

        tracing::debug!(user_id = user.id, "Refresh token rotated");
        Ok(tokens)
    }

    /// Check the presented refresh token before the client drops its cookie.
    ///
    /// Nothing is recorded server-side.
    pub async fn logout(&self, refresh_token: &str) -> Result<RefreshToken, AuthError> {
        let record = self.validator.validate_refresh(refresh_token)?;
        tracing::info!(user_id = record.user_id, "User logged out");
        Ok(record)
    }

    /// Resolve a bearer access token to the acting user.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let token_data = self.validator.validate(access_token)?;
        self.access.resolve_user(&token_data).await
    }

    /// Create an account without a role.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(DomainError::Validation("Username is required".to_string()).into());
        }
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".to_string()).into());
        }
        self.check_password_strength(password)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::Duplicate("Username already registered".to_string()).into());
        }
        if self.users.find_by_email(email).await?.is_some() {
            return Err(DomainError::Duplicate("Email already registered".to_string()).into());
        }

        let password_hash = self.hash_password(password).await?;

        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepoError::Constraint(msg) => AuthError::Domain(DomainError::Duplicate(msg)),
                other => AuthError::Repo(other),
            })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Send a recovery link when the email belongs to an account.
    ///
    /// The outcome is the same whether or not the account exists.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let masked = mask_email(email);

        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::debug!(user_email = %masked, "Password recovery requested for unknown email");
            return Ok(());
        };

        let (token, expires_at) = self.issuer.issue_recovery_token(&user)?;
        self.recovery_tokens
            .create(&user.email, &token, expires_at)
            .await?;

        let url = recovery_url(&self.config.password_recovery_url, &token);
        if let Err(e) = self
            .notifier
            .send_password_recovery_email(&user.email, &url)
            .await
        {
            tracing::error!(user_id = user.id, error = %e, "Failed to send password recovery email");
        } else {
            tracing::info!(user_id = user.id, user_email = %masked, "Password recovery email sent");
        }

        Ok(())
    }

    /// Set a new password using a recovery token. The token works once.
    pub async fn recover_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let claims = self.validator.validate_recovery(token)?;

        let record = self
            .recovery_tokens
            .find_by_token(token)
            .await?
            .ok_or(AuthError::InvalidPasswordUpdateToken)?;

        if !record.is_redeemable(self.clock.now()) || record.email != claims.email {
            return Err(AuthError::InvalidPasswordUpdateToken);
        }

        let user = self
            .users
            .find_by_email(&claims.email)
            .await?
            .ok_or(AuthError::InvalidPasswordUpdateToken)?;

        if user.id != claims.user_id {
            return Err(AuthError::InvalidPasswordUpdateToken);
        }

        self.check_password_strength(new_password)?;
        let password_hash = self.hash_password(new_password).await?;

        if !self
            .recovery_tokens
            .redeem(token, user.id, &password_hash)
            .await?
        {
            // lost a race with another redemption of the same token
            return Err(AuthError::InvalidPasswordUpdateToken);
        }

        tracing::info!(user_id = user.id, "Password recovered");
        Ok(())
    }

    /// Change a password on behalf of an authenticated user.
    pub async fn reset_password(&self, acting_user: &User, reset: PasswordReset) -> Result<(), AuthError> {
        let target_id = reset.user_id.unwrap_or(acting_user.id);
        AccessControl::has_access_to_user(target_id, acting_user)?;

        let target = if target_id == acting_user.id {
            acting_user.clone()
        } else {
            self.users
                .find_by_id(target_id)
                .await?
                .ok_or(AuthError::UserNotFound)?
        };

        if let Some(current) = reset.current_password.as_deref() {
            if !self.verify_password(current, &target.password_hash).await? {
                return Err(AuthError::InvalidCredentials);
            }
        }

        self.check_password_strength(&reset.new_password)?;
        let password_hash = self.hash_password(&reset.new_password).await?;
        self.users
            .update_password_hash(target.id, &password_hash)
            .await?;

        tracing::info!(user_id = target.id, acting_user_id = acting_user.id, "Password reset");
        Ok(())
    }

    /// Load a user the actor is allowed to see.
    pub async fn get_user(&self, acting_user: &User, user_id: i64) -> Result<User, AuthError> {
        AccessControl::has_access_to_user(user_id, acting_user)?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Give a user the named role. Admin only.
    pub async fn assign_role(
        &self,
        acting_user: User,
        user_id: i64,
        role_name: &str,
    ) -> Result<User, AuthError> {
        let admin = self.access.has_admin_role(acting_user).await?;

        let role = self
            .roles
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| DomainError::Validation(format!("Unknown role: {}", role_name)))?;

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        let user = self.users.assign_role(user_id, role.id).await?;
        tracing::info!(user_id, role = %role.name, acting_user_id = admin.id, "Role assigned");
        Ok(user)
    }

    // Argon2 is CPU bound; keep it off the async workers.
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let passwords = self.passwords.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let passwords = self.passwords.clone();
        let (password, hash) = (password.to_string(), hash.to_string());
        tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn check_password_strength(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        Ok(())
    }
}

fn recovery_url(base: &str, token: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}token={}", base, separator, token)
}
