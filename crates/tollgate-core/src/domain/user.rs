use serde::{Deserialize, Serialize};

use super::role::{ADMIN_ROLE, Role};

/// User entity - an account that can authenticate.
///
/// `username` and `email` are unique across all users. The role is loaded
/// alongside the user so that its name can be embedded in tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
}

impl User {
    pub fn role_id(&self) -> Option<i64> {
        self.role.as_ref().map(|r| r.id)
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.name.as_str())
    }

    /// Whether the user holds the admin role. A user without a role is never admin.
    pub fn is_admin(&self) -> bool {
        self.role_name() == Some(ADMIN_ROLE)
    }
}

/// Fields required to create a user. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Mask an email for logging: `alice@example.com` becomes `a***@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{}***", first),
                _ => "***".to_string(),
            };
            format!("{}{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}
