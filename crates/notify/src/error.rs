//! Error types for the notification system.

use thiserror::Error;

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// SMTP transport failed
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// A sender or recipient address could not be parsed
    #[error("Invalid email address '{address}': {reason}")]
    Address { address: String, reason: String },

    /// The message could not be assembled
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// Channel is not configured
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}
