//! Token Issuer and Token Validator.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::auth::AuthConfig;
use crate::domain::{IdentitySnapshot, IssuedTokens, RefreshToken, TokenData, User};
use crate::error::AuthError;
use crate::ports::{BaseRepository, Clock, TokenClaims, TokenCodec, UserRepository};

/// Value of the `purpose` claim on password recovery tokens.
pub const RECOVERY_PURPOSE: &str = "password_recovery";

/// Mints access, refresh and recovery tokens.
pub struct TokenIssuer {
    codec: Arc<dyn TokenCodec>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl TokenIssuer {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            codec,
            users,
            clock,
            config,
        }
    }

    /// Issue a token whose `sub` is the user's identity snapshot as JSON text.
    pub fn issue_access_token(&self, user: &User, ttl_minutes: i64) -> Result<String, AuthError> {
        let subject = serde_json::to_string(&IdentitySnapshot::from(user))
            .map_err(|e| AuthError::Encoding(e.to_string()))?;

        let now = self.clock.now();
        let exp = now + TimeDelta::minutes(ttl_minutes);

        // jti keeps two tokens minted in the same second distinct
        let claims = TokenClaims::new(exp.timestamp())
            .with_subject(subject)
            .issued_at(now.timestamp())
            .with_claim("jti", Uuid::new_v4().to_string());

        self.codec.encode(&claims)
    }

    /// Load the user and issue a long-lived token in the access token format.
    pub async fn issue_refresh_token(&self, user_id: i64, ttl_days: i64) -> Result<String, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.issue_access_token(&user, ttl_days * 24 * 60)
    }

    /// Access and refresh token pair using the configured lifetimes.
    pub async fn issue_pair(&self, user: &User) -> Result<IssuedTokens, AuthError> {
        let access_token = self.issue_access_token(user, self.config.access_token_ttl_minutes)?;
        let refresh_token = self
            .issue_refresh_token(user.id, self.config.refresh_token_ttl_days)
            .await?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_ttl_seconds(),
        })
    }

    /// Issue a recovery token scoped to the user's email. Returns the token and its expiry.
    pub fn issue_recovery_token(&self, user: &User) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = self.clock.now();
        let expires_at = now + TimeDelta::minutes(self.config.recovery_token_ttl_minutes);

        let claims = TokenClaims::new(expires_at.timestamp())
            .issued_at(now.timestamp())
            .with_claim("purpose", RECOVERY_PURPOSE)
            .with_claim("email", user.email.clone())
            .with_claim("user_id", user.id)
            .with_claim("jti", Uuid::new_v4().to_string());

        let token = self.codec.encode(&claims)?;
        Ok((token, expires_at))
    }
}

/// Claims of a decoded password recovery token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryClaims {
    pub email: String,
    pub user_id: i64,
}

/// Decodes incoming tokens and maps codec failures onto the auth taxonomy.
pub struct TokenValidator {
    codec: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    pub fn new(codec: Arc<dyn TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self { codec, clock }
    }

    /// Validate an access token.
    ///
    /// Undecodable or expired tokens are `NotAuthenticated`; a token that decodes
    /// but carries no usable subject is `InvalidCredentials`.
    pub fn validate(&self, token: &str) -> Result<TokenData, AuthError> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|_| AuthError::NotAuthenticated)?;

        let snapshot = subject_of(&claims).ok_or(AuthError::InvalidCredentials)?;

        Ok(TokenData {
            username: snapshot.username.clone(),
            snapshot,
        })
    }

    /// Validate a refresh token and return its structured record.
    ///
    /// Expiry is checked again against the clock after the codec has accepted the token.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshToken, AuthError> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|_| AuthError::RefreshTokenNotValid)?;

        let snapshot = subject_of(&claims).ok_or(AuthError::RefreshTokenNotValid)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::RefreshTokenNotValid)?;

        if self.clock.now() > expires_at {
            tracing::debug!(user_id = snapshot.id, "Refresh token past expiry");
            return Err(AuthError::RefreshTokenNotValid);
        }

        Ok(RefreshToken {
            user_id: snapshot.id,
            refresh_token: token.to_string(),
            expires_at,
            valid: true,
        })
    }

    /// Validate a password recovery token's signature, expiry and purpose.
    pub fn validate_recovery(&self, token: &str) -> Result<RecoveryClaims, AuthError> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|_| AuthError::InvalidPasswordUpdateToken)?;

        if claims.claim_str("purpose") != Some(RECOVERY_PURPOSE) {
            return Err(AuthError::InvalidPasswordUpdateToken);
        }

        match (claims.claim_str("email"), claims.claim_i64("user_id")) {
            (Some(email), Some(user_id)) => Ok(RecoveryClaims {
                email: email.to_string(),
                user_id,
            }),
            _ => Err(AuthError::InvalidPasswordUpdateToken),
        }
    }
}

fn subject_of(claims: &TokenClaims) -> Option<IdentitySnapshot> {
    let snapshot: IdentitySnapshot = serde_json::from_str(claims.sub.as_deref()?).ok()?;
    snapshot.is_supported().then_some(snapshot)
}
