/// Immutable auth settings, built once at start-up and shared by reference.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub recovery_token_ttl_minutes: i64,
    /// Page that receives `?token=` in password recovery emails.
    pub password_recovery_url: String,
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            recovery_token_ttl_minutes: 30,
            password_recovery_url: "http://localhost:5173/password-recovery".to_string(),
            min_password_length: 8,
        }
    }
}

impl AuthConfig {
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_minutes * 60
    }

    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_days * 24 * 60 * 60
    }
}
