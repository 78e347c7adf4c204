//! Turns a raw post into a notification message.

use chrono::{DateTime, FixedOffset};

use super::html_escape;
use super::pictures::render_pictures;
use super::text::expand_text;
use crate::source::FeedSource;
use crate::weibo::{permalink, FollowedAccount, RawPost, RetweetedPost};

/// Line between a post and the retweet it embeds.
const RETWEET_SEPARATOR: &str = "------------------";

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    /// e.g. `Alice posted at 12:30:05`.
    pub subject: String,
    /// HTML body.
    pub body: String,
    /// Time of day the post was published, `HH:MM:SS` in the post's offset.
    pub post_time: String,
}

/// Build the message for one post published by `account` at `posted_at`.
pub async fn normalize_post<S>(
    source: &S,
    account: &FollowedAccount,
    post: &RawPost,
    posted_at: DateTime<FixedOffset>,
    credential: &str,
) -> NormalizedMessage
where
    S: FeedSource + ?Sized,
{
    let link = html_escape(&permalink(account.id, &post.short_id));
    let text = expand_text(source, &post.short_id, &post.text, credential).await;

    let mut body = format!(r#"<a href="{link}">Original post</a><br>{text}<br>"#);
    body.push_str(&render_pictures(&post.picture_ids, &post.pictures));

    if let Some(retweet) = &post.retweet {
        body.push_str(&render_retweet(source, retweet, credential).await);
    }

    let post_time = posted_at.format("%H:%M:%S").to_string();
    NormalizedMessage {
        subject: format!("{} posted at {post_time}", account.display_name),
        body,
        post_time,
    }
}

/// Render an embedded retweet, linked through its own author.
async fn render_retweet<S>(source: &S, retweet: &RetweetedPost, credential: &str) -> String
where
    S: FeedSource + ?Sized,
{
    let link = html_escape(&permalink(retweet.author_id, &retweet.short_id));
    let text = expand_text(source, &retweet.short_id, &retweet.text, credential).await;

    let mut html =
        format!(r#"{RETWEET_SEPARATOR}<br><a href="{link}">Retweeted post</a><br>{text}<br>"#);
    html.push_str(&render_pictures(&retweet.picture_ids, &retweet.pictures));
    html
}
