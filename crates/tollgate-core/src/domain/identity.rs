//! Identity carried inside tokens, and the records derived from validated tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// Current schema version of [`IdentitySnapshot`].
pub const SNAPSHOT_VERSION: u16 = 1;

/// Minimal user snapshot embedded as the `sub` claim of access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    pub v: u16,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Option<String>,
}

impl IdentitySnapshot {
    /// Snapshots written by a newer schema cannot be trusted to mean the same thing.
    pub fn is_supported(&self) -> bool {
        self.v >= 1 && self.v <= SNAPSHOT_VERSION
    }
}

impl From<&User> for IdentitySnapshot {
    fn from(user: &User) -> Self {
        Self {
            v: SNAPSHOT_VERSION,
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role_name().map(str::to_string),
        }
    }
}

/// Lightweight descriptor returned by access token validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub username: String,
    pub snapshot: IdentitySnapshot,
}

/// Structured view of a validated refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub user_id: i64,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub valid: bool,
}

/// Token pair handed to the client after login or refresh.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn test_snapshot_from_user() {
        let user = User {
            id: 3,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            role: Some(Role {
                id: 1,
                name: "admin".to_string(),
            }),
        };

        let snapshot = IdentitySnapshot::from(&user);

        assert_eq!(snapshot.v, SNAPSHOT_VERSION);
        assert_eq!(snapshot.id, 3);
        assert_eq!(snapshot.role.as_deref(), Some("admin"));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_future_snapshot_version_is_unsupported() {
        let snapshot = IdentitySnapshot {
            v: SNAPSHOT_VERSION + 1,
            id: 1,
            username: "x".to_string(),
            email: "x@example.com".to_string(),
            role: None,
        };
        assert!(!snapshot.is_supported());
    }
}
