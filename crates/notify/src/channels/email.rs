//! Email channel using SMTP with STARTTLS.

use std::sync::LazyLock;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ChannelError;
use crate::NotifyChannel;

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("Invalid line break pattern"));
static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]*\ssrc="([^"]*)"[^>]*>"#).expect("Invalid image pattern")
});
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag pattern"));

/// SMTP settings for the email channel.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// Sender address. Falls back to `username` when empty.
    #[serde(default)]
    pub from: String,
    /// Recipient address.
    pub to: String,
}

const fn default_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl EmailConfig {
    /// The address used in the `From` header.
    #[must_use]
    pub fn sender(&self) -> &str {
        if self.from.is_empty() {
            &self.username
        } else {
            &self.from
        }
    }
}

/// Email delivery channel.
pub struct EmailChannel {
    config: EmailConfig,
}

impl EmailChannel {
    /// Create a new email channel with the given configuration.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn parse_mailbox(address: &str) -> Result<Mailbox, ChannelError> {
        address.parse().map_err(|e: lettre::address::AddressError| {
            ChannelError::Address {
                address: address.to_string(),
                reason: e.to_string(),
            }
        })
    }

    fn build_message(&self, subject: &str, html_body: &str) -> Result<Message, ChannelError> {
        let from = Self::parse_mailbox(self.config.sender())?;
        let to = Self::parse_mailbox(&self.config.to)?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(html_to_text(html_body)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        Ok(message)
    }
}

#[async_trait]
impl NotifyChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        !self.config.host.is_empty() && !self.config.to.is_empty()
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), ChannelError> {
        let message = self.build_message(subject, body)?;

        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
                .port(self.config.port)
                .credentials(creds)
                .build();

        debug!(host = %self.config.host, port = self.config.port, "Connecting to SMTP relay");
        mailer.send(message).await?;

        info!(to = %self.config.to, subject, "Email sent");
        Ok(())
    }
}

/// Render an HTML body as plain text for the alternative part.
///
/// Line breaks become newlines and images are replaced by their URL.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = IMG_TAG.replace_all(&text, "[image: $1]\n");
    ANY_TAG.replace_all(&text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            host: "smtp.example.com".to_string(),
            port: DEFAULT_SMTP_PORT,
            username: "bot@example.com".to_string(),
            password: "secret".to_string(),
            from: String::new(),
            to: "me@example.com".to_string(),
        }
    }

    #[test]
    fn test_sender_falls_back_to_username() {
        let mut cfg = config();
        assert_eq!(cfg.sender(), "bot@example.com");

        cfg.from = "Feed <feed@example.com>".to_string();
        assert_eq!(cfg.sender(), "Feed <feed@example.com>");
    }

    #[test]
    fn test_enabled_requires_host_and_recipient() {
        assert!(EmailChannel::new(config()).enabled());

        let mut cfg = config();
        cfg.to = String::new();
        assert!(!EmailChannel::new(cfg).enabled());
    }

    #[test]
    fn test_html_to_text() {
        let html = r#"<a href="https://weibo.com/1/Ab">Original post</a><br>hello<br />world<img src="https://img/x.jpg" alt="x" />"#;
        let text = html_to_text(html);
        assert_eq!(
            text,
            "Original post\nhello\nworld[image: https://img/x.jpg]"
        );
    }

    #[test]
    fn test_build_message() {
        let channel = EmailChannel::new(config());
        assert!(channel.build_message("subject", "<b>body</b>").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_connecting() {
        let mut cfg = config();
        cfg.to = "not an address".to_string();
        let channel = EmailChannel::new(cfg);

        let err = channel.send("subject", "body").await.unwrap_err();
        assert!(matches!(err, ChannelError::Address { .. }));
    }
}
