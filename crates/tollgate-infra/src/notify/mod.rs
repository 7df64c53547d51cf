//! Notifier implementations - log output and webhook delivery.

mod log;

#[cfg(feature = "webhook")]
mod webhook;

pub use log::LogNotifier;

#[cfg(feature = "webhook")]
pub use webhook::WebhookNotifier;
