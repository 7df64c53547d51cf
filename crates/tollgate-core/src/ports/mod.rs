//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod clock;
mod notifier;
mod repository;

pub use auth::{PasswordService, TokenClaims, TokenCodec};
pub use clock::{Clock, ManualClock, SystemClock};
pub use notifier::{Notifier, NotifierError};
pub use repository::{BaseRepository, RecoveryTokenRepository, RoleRepository, UserRepository};
