//! Weibo upstream access.
//!
//! Wire models for the ajax API, the domain types the pipeline works on and
//! the HTTP client implementing [`FeedSource`](crate::source::FeedSource).

mod client;
mod models;
mod types;

pub use client::{WeiboClient, DEFAULT_API_BASE, USER_AGENT};
pub use types::{
    parse_created_at, FollowedAccount, PictureVariants, RawPost, RetweetedPost,
    CREATED_AT_FORMAT,
};

/// Base URL of human-facing post permalinks.
pub const PERMALINK_BASE: &str = "https://weibo.com";

/// Permalink of a post: `https://weibo.com/<author id>/<short id>`.
#[must_use]
pub fn permalink(author_id: u64, short_id: &str) -> String {
    format!("{PERMALINK_BASE}/{author_id}/{short_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permalink() {
        assert_eq!(permalink(1234, "KE1abcdEF"), "https://weibo.com/1234/KE1abcdEF");
    }
}
