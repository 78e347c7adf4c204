//! Notification channel implementations.

pub mod email;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Trait for delivery channels (email, chat webhooks, ...).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is enabled/configured.
    fn enabled(&self) -> bool;

    /// Deliver one message. `body` is HTML.
    async fn send(&self, subject: &str, body: &str) -> Result<(), ChannelError>;
}
