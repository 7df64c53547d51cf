//! Log notifier - writes recovery links to the trace log (for development).

use async_trait::async_trait;

use tollgate_core::domain::mask_email;
use tollgate_core::ports::{Notifier, NotifierError};

/// Emits notifications as `tracing` events instead of sending them.
///
/// The recovery URL contains a live token, so it is only logged at debug level.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_password_recovery_email(
        &self,
        email: &str,
        recovery_url: &str,
    ) -> Result<(), NotifierError> {
        tracing::info!(user_email = %mask_email(email), "Password recovery email (log delivery)");
        tracing::debug!(recovery_url = %recovery_url, "Password recovery link");
        Ok(())
    }
}
