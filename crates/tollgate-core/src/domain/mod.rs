//! Domain entities - the core business objects.

mod identity;
mod recovery;
mod role;
mod user;

pub use identity::{IdentitySnapshot, IssuedTokens, RefreshToken, SNAPSHOT_VERSION, TokenData};
pub use recovery::PasswordRecoveryToken;
pub use role::{ADMIN_ROLE, Role, USER_ROLE};
pub use user::{NewUser, User, mask_email};
