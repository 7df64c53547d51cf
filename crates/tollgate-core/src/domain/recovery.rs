use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted password recovery token, bound to the email it was sent to.
///
/// A record can be redeemed once; `used` flips to true on redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRecoveryToken {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl PasswordRecoveryToken {
    pub fn new(token: String, email: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            email,
            expires_at,
            used: false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Redeemable when unused and not yet expired.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_redeemable_until_expiry_or_use() {
        let now = Utc::now();
        let mut record = PasswordRecoveryToken::new(
            "tok".to_string(),
            "a@example.com".to_string(),
            now + TimeDelta::minutes(5),
        );

        assert!(record.is_redeemable(now));
        assert!(record.is_redeemable(record.expires_at));
        assert!(!record.is_redeemable(now + TimeDelta::minutes(6)));

        record.used = true;
        assert!(!record.is_redeemable(now));
    }
}
