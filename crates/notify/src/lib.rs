//! Delivery side of feedwatch.
//!
//! This crate turns a `(subject, body)` pair into a delivered notification.
//! Callers only see the [`Notifier`], which fans a message out to every
//! enabled [`NotifyChannel`] and reports whether delivery succeeded.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use notify::{EmailChannel, EmailConfig, Notifier};
//!
//! # async fn run(config: EmailConfig) -> Result<(), notify::ChannelError> {
//! let notifier = Notifier::with_channels(vec![Arc::new(EmailChannel::new(config))]);
//! notifier.send("alice posted at 12:00:00", "<p>hello</p>").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for delivery channels
//! - [`EmailChannel`] implements SMTP delivery
//! - [`Notifier`] dispatches a message to all enabled channels

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;

pub use channels::email::{EmailChannel, EmailConfig};
pub use channels::NotifyChannel;
pub use error::ChannelError;

use std::sync::Arc;
use tracing::{debug, info, warn};

/// Central notification dispatcher.
///
/// Unlike a fire-and-forget dispatcher, `send` waits for every channel so the
/// caller learns whether the message went out.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
}

impl Notifier {
    /// Create a notifier with specific channels.
    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>) -> Self {
        let enabled = channels.iter().filter(|c| c.enabled()).count();
        if enabled == 0 {
            warn!("No notification channels configured");
        } else {
            info!(channel_count = enabled, "Notification system initialized");
        }
        Self { channels }
    }

    /// Create a notifier with a single email channel.
    #[must_use]
    pub fn email(config: EmailConfig) -> Self {
        Self::with_channels(vec![Arc::new(EmailChannel::new(config))])
    }

    /// Check if any notification channels are enabled.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        self.channels.iter().any(|c| c.enabled())
    }

    /// Get the number of enabled channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.iter().filter(|c| c.enabled()).count()
    }

    /// Send a message to every enabled channel.
    ///
    /// Succeeds when at least one channel accepted the message. Individual
    /// channel failures are logged; if all channels fail, the last error is
    /// returned.
    pub async fn send(&self, subject: &str, body: &str) -> Result<(), ChannelError> {
        let mut delivered = false;
        let mut last_error = None;

        for channel in &self.channels {
            let channel_name = channel.name();

            if !channel.enabled() {
                debug!(channel = channel_name, "Channel disabled, skipping");
                continue;
            }

            match channel.send(subject, body).await {
                Ok(()) => {
                    debug!(channel = channel_name, "Notification sent");
                    delivered = true;
                }
                Err(e) => {
                    warn!(channel = channel_name, error = %e, "Channel failed to deliver");
                    last_error = Some(e);
                }
            }
        }

        if delivered {
            return Ok(());
        }

        Err(last_error
            .unwrap_or_else(|| ChannelError::NotConfigured("no enabled channels".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChannel {
        enabled: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingChannel {
        fn new(enabled: bool, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                enabled,
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    fn as_channel(channel: &Arc<CountingChannel>) -> Arc<dyn NotifyChannel> {
        channel.clone()
    }

    #[async_trait]
    impl NotifyChannel for CountingChannel {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn send(&self, _subject: &str, _body: &str) -> Result<(), ChannelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ChannelError::Other("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_no_channels_is_not_configured() {
        let notifier = Notifier::with_channels(vec![]);
        assert!(!notifier.has_channels());
        assert_eq!(notifier.channel_count(), 0);

        let err = notifier.send("s", "b").await.unwrap_err();
        assert!(matches!(err, ChannelError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_disabled_channel_is_skipped() {
        let disabled = CountingChannel::new(false, false);
        let notifier = Notifier::with_channels(vec![as_channel(&disabled)]);

        assert!(notifier.send("s", "b").await.is_err());
        assert_eq!(disabled.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_success_is_enough() {
        let failing = CountingChannel::new(true, true);
        let working = CountingChannel::new(true, false);
        let notifier = Notifier::with_channels(vec![as_channel(&failing), as_channel(&working)]);

        assert_eq!(notifier.channel_count(), 2);
        assert!(notifier.send("s", "b").await.is_ok());
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(working.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_failing_returns_error() {
        let failing = CountingChannel::new(true, true);
        let notifier = Notifier::with_channels(vec![as_channel(&failing)]);

        let err = notifier.send("s", "b").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
