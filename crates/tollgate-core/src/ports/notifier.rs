//! Outbound notification port.

use async_trait::async_trait;

/// Delivers account notifications (email, chat webhook, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_password_recovery_email(
        &self,
        email: &str,
        recovery_url: &str,
    ) -> Result<(), NotifierError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Failed to send notification: {0}")]
    SendError(String),
}
