//! Session cookie acquisition.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use reqwest::Client;

use crate::error::FeedError;
use crate::source::CredentialSource;
use crate::weibo::USER_AGENT;

/// Fetches a fresh visitor session from a configured URL.
///
/// The credential is the `Cookie` header value assembled from every
/// `Set-Cookie` the URL responds with.
#[derive(Clone)]
pub struct CookieSource {
    client: Client,
    url: String,
}

impl CookieSource {
    /// Create a cookie source for `url`.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(url: impl Into<String>) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CredentialSource for CookieSource {
    async fn credential(&self) -> Result<String, FeedError> {
        tracing::debug!(url = %self.url, "Fetching session cookie");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::CredentialFetch(e.to_string()))?;

        let cookies = cookie_header(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        );

        if cookies.is_empty() {
            return Err(FeedError::CredentialFetch(format!(
                "{} (HTTP {}) set no cookies",
                self.url,
                response.status()
            )));
        }

        tracing::debug!(cookies = cookies.split("; ").count(), "Obtained session cookie");
        Ok(cookies)
    }
}

/// Build a `Cookie` header value from `Set-Cookie` values, keeping only each
/// `name=value` pair and dropping attributes such as `Path` or `Expires`.
pub fn cookie_header<'a>(set_cookies: impl IntoIterator<Item = &'a str>) -> String {
    set_cookies
        .into_iter()
        .filter_map(|set_cookie| set_cookie.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect::<Vec<_>>()
        .join("; ")
}
