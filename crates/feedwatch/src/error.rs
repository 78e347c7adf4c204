//! Error types for the fetch side of the pipeline.
//!
//! None of these are fatal: the orchestrator logs them and carries on.

use thiserror::Error;

/// Errors raised while talking to the upstream feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The session credential could not be obtained.
    #[error("Failed to fetch credential: {0}")]
    CredentialFetch(String),

    /// A feed page could not be retrieved.
    #[error("Failed to fetch page {page} for account {account}: {reason}")]
    PageFetch {
        account: u64,
        page: u32,
        reason: String,
    },

    /// An upstream response body was not in the expected shape.
    #[error("Failed to parse response: {0}")]
    ResponseParse(String),

    /// The full text of a truncated post could not be retrieved.
    #[error("Failed to expand text of post {post}: {reason}")]
    TextExpansion { post: String, reason: String },

    /// A post carried a timestamp in an unknown layout.
    #[error("Unparseable post timestamp '{value}': {source}")]
    TimeParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
