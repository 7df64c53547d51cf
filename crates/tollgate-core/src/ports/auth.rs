//! Token codec and credential hashing ports.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AuthError;

/// Claims carried by a signed token.
///
/// `sub` and `exp` are the claims every token in the system understands;
/// anything else (purpose, email, jti) travels in `extra`. `sub` is always a
/// string; structured subjects are serialized to JSON text first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    pub fn new(exp: i64) -> Self {
        Self {
            sub: None,
            exp,
            iat: None,
            extra: Map::new(),
        }
    }

    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    pub fn issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn claim_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn claim_i64(&self, key: &str) -> Option<i64> {
        self.extra.get(key).and_then(Value::as_i64)
    }
}

/// Signs and verifies tokens.
///
/// `decode` enforces both the signature and `exp`; every failure is reported
/// as [`AuthError::InvalidToken`] regardless of cause.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError>;

    fn decode(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh random salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash. Malformed hashes verify as false.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claims_serialize_flat() {
        let claims = TokenClaims::new(1_700_000_000)
            .with_subject(r#"{"id":1}"#)
            .with_claim("purpose", "password_recovery");

        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["exp"], 1_700_000_000);
        assert_eq!(value["purpose"], "password_recovery");
        assert_eq!(value["sub"], r#"{"id":1}"#);
        assert!(value.get("iat").is_none());
    }

    #[test]
    fn test_claims_deserialize_without_subject() {
        let claims: TokenClaims =
            serde_json::from_value(json!({"exp": 10, "email": "a@example.com", "user_id": 4}))
                .unwrap();

        assert!(claims.sub.is_none());
        assert_eq!(claims.claim_str("email"), Some("a@example.com"));
        assert_eq!(claims.claim_i64("user_id"), Some(4));
        assert_eq!(claims.claim_str("user_id"), None);
    }

    #[test]
    fn test_claims_reject_object_subject() {
        let result: Result<TokenClaims, _> =
            serde_json::from_value(json!({"exp": 10, "sub": {"v": 1, "id": 1}}));

        assert!(result.is_err());
    }
}
