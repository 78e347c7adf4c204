//! Expansion of truncated post text.

use tracing::{debug, warn};

use crate::source::FeedSource;

/// Trailing fragment upstream appends to shortened post text.
///
/// It is the localized "expand" link markup, so any change to upstream's
/// rendering or locale breaks detection.
pub const TRUNCATION_MARKER: &str = "展开</span>";

/// Whether rendered text was shortened by upstream.
#[must_use]
pub fn is_truncated(text: &str) -> bool {
    text.trim_end().ends_with(TRUNCATION_MARKER)
}

/// Render plain long text as HTML: newlines become `<br />`.
#[must_use]
pub fn render_long_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br />")
}

/// Return the full text of a post.
///
/// Untruncated text is returned as is. Truncated text is replaced by the
/// expanded version; if expansion fails the truncated text is kept.
pub async fn expand_text<S>(source: &S, short_id: &str, text: &str, credential: &str) -> String
where
    S: FeedSource + ?Sized,
{
    if !is_truncated(text) {
        return text.to_string();
    }

    match source.fetch_full_text(short_id, credential).await {
        Ok(full) => {
            debug!(post = short_id, "Expanded truncated text");
            render_long_text(&full)
        }
        Err(e) => {
            warn!(post = short_id, error = %e, "Keeping truncated text");
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::weibo::RawPost;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LongText {
        result: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl LongText {
        fn new(result: Option<&'static str>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedSource for LongText {
        async fn fetch_page(
            &self,
            _account: u64,
            _page: u32,
            _credential: &str,
        ) -> Result<Vec<RawPost>, FeedError> {
            Ok(Vec::new())
        }

        async fn fetch_full_text(
            &self,
            short_id: &str,
            _credential: &str,
        ) -> Result<String, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map(str::to_string)
                .ok_or_else(|| FeedError::TextExpansion {
                    post: short_id.to_string(),
                    reason: "unavailable".to_string(),
                })
        }
    }

    const TRUNCATED: &str = "the beginning of a long<a href=\"/status/Ab\"><span class=\"expand\">展开</span>";

    #[test]
    fn test_is_truncated() {
        assert!(is_truncated(TRUNCATED));
        assert!(is_truncated("text 展开</span>\n"));
        assert!(!is_truncated("a short post"));
        assert!(!is_truncated("展开</span> in the middle"));
    }

    #[test]
    fn test_render_long_text() {
        assert_eq!(render_long_text("one\ntwo\r\nthree"), "one<br />two<br />three");
    }

    #[tokio::test]
    async fn test_untruncated_text_is_not_expanded() {
        let source = LongText::new(Some("unused"));
        let text = expand_text(&source, "Ab", "a short post", "").await;
        assert_eq!(text, "a short post");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_truncated_text_is_replaced() {
        let source = LongText::new(Some("the beginning of a long\nstory"));
        let text = expand_text(&source, "Ab", TRUNCATED, "").await;
        assert_eq!(text, "the beginning of a long<br />story");
        assert!(!text.contains(TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn test_failed_expansion_keeps_truncated_text() {
        let source = LongText::new(None);
        let text = expand_text(&source, "Ab", TRUNCATED, "").await;
        assert_eq!(text, TRUNCATED);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
