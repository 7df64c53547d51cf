use serde::{Deserialize, Serialize};

/// Name of the role that grants administrative access.
pub const ADMIN_ROLE: &str = "admin";

/// Name of the baseline role for regular accounts.
pub const USER_ROLE: &str = "user";

/// Role entity - a named authorization group. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}
