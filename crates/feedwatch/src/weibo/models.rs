//! Weibo ajax API response models.
//!
//! Only the fields the pipeline reads are modelled. Everything is
//! `#[serde(default)]` because upstream omits fields freely.

use std::collections::HashMap;

use serde::Deserialize;

use super::types::{PictureVariants, RawPost, RetweetedPost};

// ============================================================================
// Timeline
// ============================================================================

/// Response of `/ajax/statuses/mymblog`.
#[derive(Debug, Deserialize)]
pub struct TimelineResponse {
    /// 1 on success.
    #[serde(default)]
    pub ok: i64,
    #[serde(default)]
    pub data: Option<TimelineData>,
}

/// Timeline payload.
#[derive(Debug, Default, Deserialize)]
pub struct TimelineData {
    #[serde(default)]
    pub list: Vec<Status>,
}

/// One status in a timeline page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Status {
    pub created_at: String,
    pub id: u64,
    pub mblogid: String,
    pub user: Option<User>,
    pub text: String,
    pub pic_ids: Vec<String>,
    pub pic_infos: Option<HashMap<String, PicInfo>>,
    #[serde(rename = "isTop")]
    pub is_top: i64,
    pub retweeted_status: Option<RetweetedStatus>,
}

/// A status embedded as a retweet.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RetweetedStatus {
    pub id: u64,
    pub mblogid: String,
    pub user: Option<User>,
    pub text: String,
    pub pic_ids: Vec<String>,
    pub pic_infos: Option<HashMap<String, PicInfo>>,
}

/// Post author.
#[derive(Debug, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: u64,
}

/// Image variants for one picture.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PicInfo {
    pub thumbnail: Option<Image>,
    pub bmiddle: Option<Image>,
    pub large: Option<Image>,
    pub original: Option<Image>,
    pub largest: Option<Image>,
    pub mw2000: Option<Image>,
}

/// A single image variant.
#[derive(Debug, Default, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: String,
}

// ============================================================================
// Long text
// ============================================================================

/// Response of `/ajax/statuses/longtext`.
#[derive(Debug, Deserialize)]
pub struct LongTextResponse {
    #[serde(default)]
    pub ok: i64,
    #[serde(default)]
    pub data: Option<LongTextData>,
}

/// Long text payload.
#[derive(Debug, Default, Deserialize)]
pub struct LongTextData {
    #[serde(rename = "longTextContent", default)]
    pub long_text_content: String,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<PicInfo> for PictureVariants {
    fn from(info: PicInfo) -> Self {
        let url = |image: Option<Image>| image.map(|i| i.url).filter(|u| !u.is_empty());
        Self {
            original: url(info.original),
            largest: url(info.largest),
            mw2000: url(info.mw2000),
            large: url(info.large),
            bmiddle: url(info.bmiddle),
            thumbnail: url(info.thumbnail),
        }
    }
}

/// Picture ids in display order plus their variants.
///
/// Upstream lists `pic_ids` for top-level posts but sometimes only
/// `pic_infos` for retweets; in that case the map keys are used, sorted.
fn pictures(
    pic_ids: Vec<String>,
    pic_infos: Option<HashMap<String, PicInfo>>,
) -> (Vec<String>, HashMap<String, PictureVariants>) {
    let variants: HashMap<String, PictureVariants> = pic_infos
        .unwrap_or_default()
        .into_iter()
        .map(|(id, info)| (id, info.into()))
        .collect();

    let ids = if pic_ids.is_empty() {
        let mut keys: Vec<String> = variants.keys().cloned().collect();
        keys.sort();
        keys
    } else {
        pic_ids
    };

    (ids, variants)
}

impl From<RetweetedStatus> for RetweetedPost {
    fn from(status: RetweetedStatus) -> Self {
        let (picture_ids, pictures) = pictures(status.pic_ids, status.pic_infos);
        Self {
            id: status.id,
            short_id: status.mblogid,
            author_id: status.user.map_or(0, |u| u.id),
            text: status.text,
            picture_ids,
            pictures,
        }
    }
}

impl From<Status> for RawPost {
    fn from(status: Status) -> Self {
        let (picture_ids, pictures) = pictures(status.pic_ids, status.pic_infos);
        Self {
            id: status.id,
            short_id: status.mblogid,
            created_at: status.created_at,
            text: status.text,
            pinned: status.is_top != 0,
            picture_ids,
            pictures,
            // Upstream sends an all-zero struct for "no retweet" on some pages.
            retweet: status
                .retweeted_status
                .filter(|rt| rt.id != 0)
                .map(RetweetedPost::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "ok": 1,
        "data": {
            "since_id": "",
            "list": [
                {
                    "created_at": "Tue Oct 19 12:30:05 +0800 2021",
                    "id": 4694000000000001,
                    "mblogid": "KE1abcdEF",
                    "user": {"id": 1234},
                    "text": "hello<span class=\"expand\">展开</span>",
                    "pic_ids": ["p1", "p2"],
                    "pic_infos": {
                        "p1": {
                            "thumbnail": {"url": "https://img/thumb/p1.jpg"},
                            "original": {"url": "https://img/orig/p1.jpg"}
                        }
                    },
                    "isTop": 1,
                    "retweeted_status": {
                        "id": 4693000000000002,
                        "mblogid": "KDzyxwVU",
                        "user": {"id": 5678},
                        "text": "inner",
                        "pic_infos": {
                            "r2": {"large": {"url": "https://img/large/r2.jpg"}},
                            "r1": {"bmiddle": {"url": "https://img/bmiddle/r1.jpg"}}
                        }
                    }
                },
                {
                    "created_at": "Tue Oct 19 11:00:00 +0800 2021",
                    "id": 4694000000000000,
                    "mblogid": "KE0aaaaAA",
                    "text": "plain"
                }
            ]
        }
    }"#;

    fn parse_page() -> Vec<RawPost> {
        let response: TimelineResponse = serde_json::from_str(PAGE).unwrap();
        assert_eq!(response.ok, 1);
        response
            .data
            .unwrap()
            .list
            .into_iter()
            .map(RawPost::from)
            .collect()
    }

    #[test]
    fn test_status_conversion() {
        let posts = parse_page();
        assert_eq!(posts.len(), 2);

        let post = &posts[0];
        assert_eq!(post.short_id, "KE1abcdEF");
        assert!(post.pinned);
        assert_eq!(post.picture_ids, vec!["p1", "p2"]);
        assert_eq!(
            post.pictures["p1"].best_url(),
            Some("https://img/orig/p1.jpg")
        );
        assert!(!post.pictures.contains_key("p2"));

        let retweet = post.retweet.as_ref().unwrap();
        assert_eq!(retweet.author_id, 5678);
        assert_eq!(retweet.short_id, "KDzyxwVU");
        assert_eq!(retweet.picture_ids, vec!["r1", "r2"]);
    }

    #[test]
    fn test_missing_optional_fields() {
        let posts = parse_page();
        let post = &posts[1];
        assert!(!post.pinned);
        assert!(post.picture_ids.is_empty());
        assert!(post.pictures.is_empty());
        assert!(post.retweet.is_none());
    }

    #[test]
    fn test_zero_id_retweet_is_absent() {
        let status: Status = serde_json::from_str(
            r#"{"id": 1, "mblogid": "a", "retweeted_status": {"id": 0, "text": ""}}"#,
        )
        .unwrap();
        assert!(RawPost::from(status).retweet.is_none());
    }

    #[test]
    fn test_long_text_response() {
        let response: LongTextResponse = serde_json::from_str(
            r#"{"ok": 1, "http_code": 200, "data": {"longTextContent": "line one\nline two"}}"#,
        )
        .unwrap();
        assert_eq!(
            response.data.unwrap().long_text_content,
            "line one\nline two"
        );
    }
}
