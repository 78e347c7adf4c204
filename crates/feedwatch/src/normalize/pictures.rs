//! Picture id to image URL resolution.

use std::collections::HashMap;

use super::html_escape;
use crate::weibo::PictureVariants;

/// Base of the constructed URL for pictures upstream lists without info.
pub const FALLBACK_PICTURE_BASE: &str = "https://wx2.sinaimg.cn/wap360/";

/// A picture ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPicture {
    pub id: String,
    pub url: String,
}

impl ResolvedPicture {
    /// Render as an HTML `<img>` element.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            r#"<img src="{}"  alt="{}" />"#,
            html_escape(&self.url),
            html_escape(&self.id)
        )
    }
}

/// Constructed URL for a picture id: `<base><id>.jpg`.
#[must_use]
pub fn fallback_url(picture_id: &str) -> String {
    format!("{FALLBACK_PICTURE_BASE}{picture_id}.jpg")
}

/// Resolve every id, in order, to its best URL or the fallback.
pub fn resolve_pictures(
    picture_ids: &[String],
    pictures: &HashMap<String, PictureVariants>,
) -> Vec<ResolvedPicture> {
    picture_ids
        .iter()
        .map(|id| {
            let url = pictures
                .get(id)
                .and_then(PictureVariants::best_url)
                .map_or_else(|| fallback_url(id), str::to_string);
            ResolvedPicture {
                id: id.clone(),
                url,
            }
        })
        .collect()
}

/// Resolve and render as a run of `<img>` elements.
pub fn render_pictures(
    picture_ids: &[String],
    pictures: &HashMap<String, PictureVariants>,
) -> String {
    resolve_pictures(picture_ids, pictures)
        .iter()
        .map(ResolvedPicture::to_html)
        .collect()
}
