//! JWT token codec implementation.

use std::str::FromStr;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use tollgate_core::AuthError;
use tollgate_core::ports::{Clock, TokenClaims, TokenCodec};

/// JWT codec configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            algorithm: Algorithm::HS256,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtConfigError {
    #[error("Unsupported JWT algorithm: {0} (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),
}

impl JwtConfig {
    /// Build a config from a shared secret and an HMAC algorithm name.
    pub fn new(secret: impl Into<String>, algorithm: &str) -> Result<Self, JwtConfigError> {
        Ok(Self {
            secret: secret.into(),
            algorithm: parse_hmac_algorithm(algorithm)?,
        })
    }
}

fn parse_hmac_algorithm(name: &str) -> Result<Algorithm, JwtConfigError> {
    match Algorithm::from_str(&name.trim().to_uppercase()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(JwtConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}

/// HMAC-signed JWT codec.
///
/// Expiry is checked against the injected clock rather than the system time
/// `jsonwebtoken` would use, with zero leeway.
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm: config.algorithm,
            clock,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation()).map_err(|e| {
                tracing::debug!(error = %e, "Token rejected by codec");
                AuthError::InvalidToken
            })?;

        if self.clock.now().timestamp() > token_data.claims.exp {
            tracing::debug!("Token rejected by codec: expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}
