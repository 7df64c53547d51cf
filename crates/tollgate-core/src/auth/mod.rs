//! Token lifecycle, authorization and the session protocol.

mod access;
mod config;
mod session;
mod tokens;

#[cfg(test)]
pub(crate) mod testing;

pub use access::AccessControl;
pub use config::AuthConfig;
pub use session::{PasswordReset, SessionPorts, SessionService};
pub use tokens::{RECOVERY_PURPOSE, RecoveryClaims, TokenIssuer, TokenValidator};
