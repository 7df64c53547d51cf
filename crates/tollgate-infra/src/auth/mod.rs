//! Authentication implementations.

mod jwt;
mod password;

pub use jwt::{JwtConfig, JwtConfigError, JwtTokenCodec};
pub use password::Argon2PasswordService;
