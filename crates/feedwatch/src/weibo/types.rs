//! Weibo data types.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::error::FeedError;

/// Layout of `created_at` in upstream responses (Ruby date format).
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// An account whose posts are watched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowedAccount {
    /// Weibo user id.
    pub id: u64,
    /// Name used in notification subjects.
    pub display_name: String,
}

impl FollowedAccount {
    #[must_use]
    pub fn new(id: u64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// One feed entry as returned by upstream, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawPost {
    /// Numeric post id.
    pub id: u64,
    /// Short id used in permalinks and the long-text endpoint.
    pub short_id: String,
    /// Upstream-formatted creation time, see [`CREATED_AT_FORMAT`].
    pub created_at: String,
    /// Rendered HTML text, possibly ending with the truncation marker.
    pub text: String,
    /// Sticky post shown at the top of the feed.
    pub pinned: bool,
    /// Picture ids in display order.
    pub picture_ids: Vec<String>,
    /// Known image variants per picture id.
    pub pictures: HashMap<String, PictureVariants>,
    /// Embedded retweet, if any.
    pub retweet: Option<RetweetedPost>,
}

impl RawPost {
    /// Parse `created_at`.
    pub fn posted_at(&self) -> Result<DateTime<FixedOffset>, FeedError> {
        parse_created_at(&self.created_at)
    }
}

/// A post embedded in another as a retweet. Carries no further nesting.
#[derive(Debug, Clone, Default)]
pub struct RetweetedPost {
    pub id: u64,
    pub short_id: String,
    /// Id of the retweeted post's own author.
    pub author_id: u64,
    pub text: String,
    pub picture_ids: Vec<String>,
    pub pictures: HashMap<String, PictureVariants>,
}

/// URLs of the image variants upstream offers for one picture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureVariants {
    pub original: Option<String>,
    pub largest: Option<String>,
    pub mw2000: Option<String>,
    pub large: Option<String>,
    pub bmiddle: Option<String>,
    pub thumbnail: Option<String>,
}

impl PictureVariants {
    /// Best available URL, highest quality first.
    #[must_use]
    pub fn best_url(&self) -> Option<&str> {
        [
            &self.original,
            &self.largest,
            &self.mw2000,
            &self.large,
            &self.bmiddle,
            &self.thumbnail,
        ]
        .into_iter()
        .filter_map(|url| url.as_deref())
        .find(|url| !url.is_empty())
    }
}

/// Parse an upstream timestamp such as `Tue Oct 19 12:30:00 +0800 2021`.
pub fn parse_created_at(value: &str) -> Result<DateTime<FixedOffset>, FeedError> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT).map_err(|source| FeedError::TimeParse {
        value: value.to_string(),
        source,
    })
}
