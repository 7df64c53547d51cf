//! Webhook notifier - posts notifications to an HTTP endpoint (mail relay, chat, ...).

use async_trait::async_trait;

use tollgate_core::ports::{Notifier, NotifierError};

/// Posts a JSON document per notification to a configured URL.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_password_recovery_email(
        &self,
        email: &str,
        recovery_url: &str,
    ) -> Result<(), NotifierError> {
        let payload = serde_json::json!({
            "type": "password_recovery",
            "to": email,
            "subject": "Password recovery",
            "recovery_url": recovery_url,
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| NotifierError::SendError(e.to_string()))?;

        Ok(())
    }
}
