//! Feedwatch crate for Weibo feed monitoring.
//!
//! This crate provides:
//! - A time window tracking which posts are new since the last check
//! - Paginated timeline retrieval that stops at already-seen posts
//! - Normalization of posts (long text, pictures, retweets) into HTML messages
//! - A poll cycle orchestrator that hands messages to the `notify` crate

pub mod auth;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod weibo;
pub mod window;

// Re-export main types
pub use auth::CookieSource;
pub use config::Config;
pub use error::FeedError;
pub use fetcher::PaginatedFetcher;
pub use normalize::NormalizedMessage;
pub use pipeline::{Pipeline, PollCycleResult};
pub use source::{CredentialSource, FeedSource};
pub use weibo::{FollowedAccount, RawPost, WeiboClient};
pub use window::TimeWindow;
