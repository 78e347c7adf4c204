//! Capability traits the pipeline consumes.

use async_trait::async_trait;

use crate::error::FeedError;
use crate::weibo::RawPost;

/// Read access to an upstream feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page (1-based) of an account's posts, newest first.
    async fn fetch_page(
        &self,
        account: u64,
        page: u32,
        credential: &str,
    ) -> Result<Vec<RawPost>, FeedError>;

    /// Fetch the untruncated text of a post, by short id.
    async fn fetch_full_text(&self, short_id: &str, credential: &str) -> Result<String, FeedError>;
}

/// Source of the opaque session credential sent with feed requests.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn credential(&self) -> Result<String, FeedError>;
}
