//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use tollgate_core::auth::AuthConfig;
use tollgate_infra::DatabaseConfig;
use tollgate_infra::JwtConfig;
use tollgate_infra::auth::JwtConfigError;

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    Jwt(#[from] JwtConfigError),
}

/// Refresh token cookie settings.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub max_age_seconds: i64,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub cookie: CookieConfig,
    pub notifier_webhook_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing variables fall back to development defaults; a variable that is
    /// set but cannot be parsed is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = match env::var("DATABASE_URL").ok() {
            Some(url) => {
                let mut db = DatabaseConfig::new(url);
                if let Some(max) = parse_var("DB_MAX_CONNECTIONS")? {
                    db.max_connections = max;
                }
                if let Some(min) = parse_var("DB_MIN_CONNECTIONS")? {
                    db.min_connections = min;
                }
                Some(db)
            }
            None => None,
        };

        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if is_production() {
                tracing::error!("JWT_SECRET not set in production, using the built-in default");
            } else {
                tracing::warn!("JWT_SECRET not set, using the built-in development default");
            }
            DEFAULT_JWT_SECRET.to_string()
        });
        let algorithm = env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string());
        let jwt = JwtConfig::new(secret, &algorithm)?;

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            access_token_ttl_minutes: parse_var("ACCESS_TOKEN_EXPIRE_MINUTES")?
                .unwrap_or(defaults.access_token_ttl_minutes),
            refresh_token_ttl_days: parse_var("REFRESH_TOKEN_EXPIRE_DAYS")?
                .unwrap_or(defaults.refresh_token_ttl_days),
            recovery_token_ttl_minutes: parse_var("RECOVERY_TOKEN_EXPIRE_MINUTES")?
                .unwrap_or(defaults.recovery_token_ttl_minutes),
            password_recovery_url: env::var("PASSWORD_RECOVERY_URL")
                .unwrap_or(defaults.password_recovery_url),
            min_password_length: defaults.min_password_length,
        };

        let cookie = CookieConfig {
            name: env::var("REFRESH_TOKEN_COOKIE_NAME")
                .unwrap_or_else(|_| "refresh_token".to_string()),
            domain: env::var("API_SITE_DOMAIN").ok().filter(|d| !d.is_empty()),
            secure: parse_bool("SECURE_COOKIES")?.unwrap_or(true),
            max_age_seconds: auth.refresh_token_ttl_seconds(),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT")?.unwrap_or(8080),
            database,
            jwt,
            auth,
            cookie,
            notifier_webhook_url: env::var("NOTIFIER_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.is_empty()),
        })
    }
}

fn is_production() -> bool {
    env::var("RUST_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production"))
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}

fn parse_bool(key: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid { key, value }),
        },
        Err(_) => Ok(None),
    }
}
