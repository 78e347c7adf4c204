//! Poll cycle orchestration: credential, per-account fetch, delivery, and
//! the window advance.

use std::sync::Arc;
use std::time::Duration;

use notify::Notifier;
use tokio::time::{Interval, MissedTickBehavior};

use crate::fetcher::{PaginatedFetcher, DEFAULT_MAX_PAGES};
use crate::source::{CredentialSource, FeedSource};
use crate::weibo::FollowedAccount;
use crate::window::TimeWindow;

/// Result of a single poll cycle.
#[derive(Debug, Default)]
pub struct PollCycleResult {
    /// Number of accounts processed.
    pub accounts: usize,
    /// Number of messages produced.
    pub messages: usize,
    /// Number delivered.
    pub delivered: usize,
    /// Number that failed delivery.
    pub failed: usize,
    /// Errors encountered.
    pub errors: Vec<String>,
}

/// Ticker driving poll cycles.
///
/// Each cycle advances the window by one interval, so ticks missed during a
/// slow cycle fire immediately afterwards until the window has caught up
/// with the clock again.
#[must_use]
pub fn poll_ticker(interval: Duration) -> Interval {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    ticker
}

/// Runs poll cycles over a fixed set of accounts.
///
/// Owns the [`TimeWindow`]; each completed cycle advances it exactly once.
pub struct Pipeline {
    accounts: Vec<FollowedAccount>,
    window: TimeWindow,
    max_pages: u32,
    source: Arc<dyn FeedSource>,
    credentials: Arc<dyn CredentialSource>,
    notifier: Arc<Notifier>,
}

impl Pipeline {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(
        accounts: Vec<FollowedAccount>,
        window: TimeWindow,
        source: Arc<dyn FeedSource>,
        credentials: Arc<dyn CredentialSource>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            accounts,
            window,
            max_pages: DEFAULT_MAX_PAGES,
            source,
            credentials,
            notifier,
        }
    }

    /// Bound the pages walked per account per cycle.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// The current window.
    #[must_use]
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Run a single poll cycle.
    ///
    /// Every failure inside the cycle is logged and recorded; the window is
    /// advanced once at the end regardless, unless the next bound would
    /// overflow. If the returned future is
    /// dropped before completion, the window is left untouched.
    pub async fn poll_cycle(&mut self) -> PollCycleResult {
        let mut result = PollCycleResult::default();
        let window = self.window;

        tracing::info!(
            start = %window.start(),
            end = %window.end(),
            accounts = self.accounts.len(),
            "Starting poll cycle"
        );

        let credential = match self.credentials.credential().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "Continuing without credential");
                result.errors.push(e.to_string());
                String::new()
            }
        };

        let fetcher = PaginatedFetcher::new(self.source.as_ref(), self.max_pages);

        for account in &self.accounts {
            tracing::info!(
                account = account.id,
                name = %account.display_name,
                "Checking account"
            );

            let messages = fetcher.fetch_account(account, &window, &credential).await;
            result.accounts += 1;
            result.messages += messages.len();

            for message in messages {
                tracing::info!(subject = %message.subject, "Delivering");
                match self.notifier.send(&message.subject, &message.body).await {
                    Ok(()) => result.delivered += 1,
                    Err(e) => {
                        tracing::error!(
                            account = account.id,
                            subject = %message.subject,
                            error = %e,
                            "Delivery failed"
                        );
                        result.failed += 1;
                        result
                            .errors
                            .push(format!("{}: delivery failed: {e}", message.subject));
                    }
                }
            }
        }

        if let Err(e) = self.window.advance() {
            tracing::error!(error = %e, "Window not advanced");
            result.errors.push(e.to_string());
        }

        tracing::info!(
            accounts = result.accounts,
            messages = result.messages,
            delivered = result.delivered,
            failed = result.failed,
            errors = result.errors.len(),
            next_start = %self.window.start(),
            next_end = %self.window.end(),
            "Poll cycle complete"
        );

        result
    }
}
