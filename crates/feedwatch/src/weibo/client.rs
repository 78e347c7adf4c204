//! Weibo ajax API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, REFERER};
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use super::models::{LongTextResponse, TimelineResponse};
use super::types::RawPost;
use crate::error::FeedError;
use crate::source::FeedSource;

/// Default upstream base URL.
pub const DEFAULT_API_BASE: &str = "https://weibo.com";

/// Upstream rejects requests that do not look like they come from a browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/94.0.4606.81 Safari/537.36";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Browser-identifying headers sent with every request.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            "\"Chromium\";v=\"94\", \"Google Chrome\";v=\"94\", \";Not A Brand\";v=\"99\"",
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"macOS\""));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert(
        "x-requested-with",
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers
}

/// Client for the timeline and long-text endpoints.
#[derive(Clone)]
pub struct WeiboClient {
    client: Client,
    api_base: String,
}

impl WeiboClient {
    /// Create a client against `api_base` (e.g. [`DEFAULT_API_BASE`]).
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(api_base: impl Into<String>) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Attach the session credential, if there is one.
    fn with_cookie(request: RequestBuilder, credential: &str) -> RequestBuilder {
        if credential.is_empty() {
            request
        } else {
            request.header(COOKIE, credential)
        }
    }

    /// GET a URL and return the body text if the status was a success.
    async fn get_text(request: RequestBuilder) -> Result<String, String> {
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(format!("HTTP {status}: {}", truncate(&body, 200)))
        }
    }
}

#[async_trait]
impl FeedSource for WeiboClient {
    async fn fetch_page(
        &self,
        account: u64,
        page: u32,
        credential: &str,
    ) -> Result<Vec<RawPost>, FeedError> {
        let url = format!("{}/ajax/statuses/mymblog", self.api_base);
        debug!(account, page, url = %url, "Fetching timeline page");

        let request = self
            .client
            .get(&url)
            .query(&[
                ("uid", account.to_string()),
                ("page", page.to_string()),
                ("feature", "0".to_string()),
            ])
            .header(REFERER, format!("{}/u/{account}", self.api_base));
        let request = Self::with_cookie(request, credential);

        let body = Self::get_text(request)
            .await
            .map_err(|reason| FeedError::PageFetch {
                account,
                page,
                reason,
            })?;

        let response: TimelineResponse = serde_json::from_str(&body).map_err(|e| {
            FeedError::ResponseParse(format!(
                "timeline page {page} of {account}: {e}; body: {}",
                truncate(&body, 200)
            ))
        })?;

        if response.ok != 1 {
            return Err(FeedError::PageFetch {
                account,
                page,
                reason: format!("upstream returned ok={}", response.ok),
            });
        }

        let posts: Vec<RawPost> = response
            .data
            .unwrap_or_default()
            .list
            .into_iter()
            .map(RawPost::from)
            .collect();

        debug!(account, page, posts = posts.len(), "Fetched timeline page");
        Ok(posts)
    }

    async fn fetch_full_text(&self, short_id: &str, credential: &str) -> Result<String, FeedError> {
        let url = format!("{}/ajax/statuses/longtext", self.api_base);
        debug!(post = short_id, "Fetching long text");

        let request = self.client.get(&url).query(&[("id", short_id)]);
        let request = Self::with_cookie(request, credential);

        let expansion_error = |reason: String| FeedError::TextExpansion {
            post: short_id.to_string(),
            reason,
        };

        let body = Self::get_text(request)
            .await
            .map_err(expansion_error)?;

        let response: LongTextResponse = serde_json::from_str(&body)
            .map_err(|e| expansion_error(format!("unparseable response: {e}")))?;

        if response.ok != 1 {
            return Err(expansion_error(format!(
                "upstream returned ok={}",
                response.ok
            )));
        }

        let text = response.data.unwrap_or_default().long_text_content;
        if text.is_empty() {
            return Err(expansion_error("empty long text".to_string()));
        }

        Ok(text)
    }
}

/// Truncate text for log output, respecting UTF-8 character boundaries.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = WeiboClient::new("http://localhost:1234/").unwrap();
        assert_eq!(client.api_base, "http://localhost:1234");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("微博微博微博", 2), "微博...");
    }
}
