//! Post normalization.
//!
//! Expands truncated text, resolves pictures and formats embedded retweets
//! into a single HTML message body.

mod content;
mod pictures;
mod text;

pub use content::{normalize_post, NormalizedMessage};
pub use pictures::{
    fallback_url, render_pictures, resolve_pictures, ResolvedPicture, FALLBACK_PICTURE_BASE,
};
pub use text::{expand_text, is_truncated, render_long_text, TRUNCATION_MARKER};

/// Escape a value for use inside a double-quoted HTML attribute.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
