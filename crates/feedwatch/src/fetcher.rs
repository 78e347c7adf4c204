//! Paginated retrieval of one account's new posts.
//!
//! Pages are walked newest first. The walk stops at the first non-pinned
//! post that is not newer than the window start, since everything behind it
//! was covered by an earlier cycle.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::normalize::{normalize_post, NormalizedMessage};
use crate::source::FeedSource;
use crate::weibo::{FollowedAccount, RawPost};
use crate::window::TimeWindow;

/// Default safety bound on pages walked per account per cycle.
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// What to do with a post while scanning a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Already seen; stop paginating.
    Stop,
    /// Inside the window; normalize it.
    Collect,
    /// Pinned old post, or newer than the window end; move on.
    Skip,
}

/// Decide what to do with a post published at `posted_at`.
///
/// Posts at exactly the window start were delivered by the previous cycle
/// (whose window end is inclusive), so they never produce a message here.
#[must_use]
pub fn classify(window: &TimeWindow, posted_at: DateTime<Utc>, pinned: bool) -> Disposition {
    if window.is_seen(posted_at) {
        if pinned {
            Disposition::Skip
        } else {
            Disposition::Stop
        }
    } else if window.contains(posted_at) {
        Disposition::Collect
    } else {
        Disposition::Skip
    }
}

/// Walks an account's feed page by page.
pub struct PaginatedFetcher<'a, S: ?Sized> {
    source: &'a S,
    max_pages: u32,
}

impl<'a, S> PaginatedFetcher<'a, S>
where
    S: FeedSource + ?Sized,
{
    #[must_use]
    pub fn new(source: &'a S, max_pages: u32) -> Self {
        Self {
            source,
            max_pages: max_pages.max(1),
        }
    }

    /// Collect messages for every post of `account` inside `window`.
    ///
    /// A page that fails to fetch or parse is logged and treated as an
    /// empty page that does not stop pagination. A successful empty page is
    /// the end of the feed.
    pub async fn fetch_account(
        &self,
        account: &FollowedAccount,
        window: &TimeWindow,
        credential: &str,
    ) -> Vec<NormalizedMessage> {
        let mut messages = Vec::new();

        for page in 1..=self.max_pages {
            let posts = match self.source.fetch_page(account.id, page, credential).await {
                Ok(posts) => posts,
                Err(e) => {
                    warn!(account = account.id, page, error = %e, "Page failed, continuing");
                    continue;
                }
            };

            if posts.is_empty() {
                debug!(account = account.id, page, "Reached end of feed");
                return messages;
            }

            if self
                .scan_page(account, window, &posts, credential, &mut messages)
                .await
            {
                debug!(account = account.id, page, "Reached already-seen posts");
                return messages;
            }
        }

        warn!(
            account = account.id,
            max_pages = self.max_pages,
            "Page limit reached before finding already-seen posts"
        );
        messages
    }

    /// Scan one page in order, pushing messages. Returns `true` on the stop
    /// condition.
    async fn scan_page(
        &self,
        account: &FollowedAccount,
        window: &TimeWindow,
        posts: &[RawPost],
        credential: &str,
        messages: &mut Vec<NormalizedMessage>,
    ) -> bool {
        for post in posts {
            let posted_at = match post.posted_at() {
                Ok(t) => t,
                Err(e) => {
                    warn!(account = account.id, post = %post.short_id, error = %e, "Skipping post");
                    continue;
                }
            };

            match classify(window, posted_at.with_timezone(&Utc), post.pinned) {
                Disposition::Stop => return true,
                Disposition::Skip => {
                    debug!(post = %post.short_id, pinned = post.pinned, "Outside window");
                }
                Disposition::Collect => {
                    info!(account = account.id, post = %post.short_id, "New post");
                    let message =
                        normalize_post(self.source, account, post, posted_at, credential).await;
                    messages.push(message);
                }
            }
        }
        false
    }
}
