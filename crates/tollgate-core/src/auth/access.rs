//! Identity and role resolution.

use std::sync::Arc;

use crate::domain::{ADMIN_ROLE, TokenData, User};
use crate::error::AuthError;
use crate::ports::{RoleRepository, UserRepository};

/// Resolves validated tokens to users and answers authorization questions.
///
/// Every check fails closed: unknown users, unknown roles and missing role
/// assignments all deny.
pub struct AccessControl {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl AccessControl {
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { users, roles }
    }

    /// Load the user a validated token refers to.
    ///
    /// An unknown username is an authentication failure, not a 404.
    pub async fn resolve_user(&self, token_data: &TokenData) -> Result<User, AuthError> {
        self.users
            .find_by_username(&token_data.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    /// Pass the user through when they hold the named role.
    pub async fn has_role(&self, user: User, role_name: &str) -> Result<User, AuthError> {
        let role = self.roles.find_by_name(role_name).await?;

        match role {
            Some(role) if user.role_id() == Some(role.id) => Ok(user),
            _ => {
                tracing::debug!(user_id = user.id, role = role_name, "Role check denied");
                Err(AuthError::PermissionDenied)
            }
        }
    }

    pub async fn has_admin_role(&self, user: User) -> Result<User, AuthError> {
        self.has_role(user, ADMIN_ROLE).await
    }

    /// Self-or-admin rule for user-scoped resources.
    pub fn has_access_to_user(requested_user_id: i64, acting_user: &User) -> Result<(), AuthError> {
        if acting_user.is_admin() || acting_user.id == requested_user_id {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied)
        }
    }
}
