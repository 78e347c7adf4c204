//! Service configuration, loaded once at startup from YAML.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use notify::EmailConfig;
use serde::Deserialize;

use crate::fetcher::DEFAULT_MAX_PAGES;
use crate::weibo::{FollowedAccount, DEFAULT_API_BASE};
use crate::window::TimeWindow;

/// Environment variable overriding `email.password`.
pub const ENV_SMTP_PASSWORD: &str = "FEEDWATCH_SMTP_PASSWORD";

/// Longest accepted `interval` or `start_offset`: 100 years, in seconds.
pub const MAX_SPAN_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SMTP delivery settings.
    pub email: EmailConfig,
    /// Followed accounts: user id -> display name.
    pub following: BTreeMap<u64, String>,
    /// URL whose `Set-Cookie` headers form the session credential.
    pub sub_url: String,
    /// Seconds between poll cycles; also the window step.
    pub interval: u64,
    /// Seconds to look back on the first cycle.
    #[serde(default)]
    pub start_offset: u64,
    /// Pages walked per account per cycle at most.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Upstream API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Directory for daily log files. Logs go to stdout only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

const fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Config {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        if let Ok(password) = std::env::var(ENV_SMTP_PASSWORD) {
            config.email.password = password;
        }

        Ok(config)
    }

    /// Parse and validate YAML content.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            bail!("interval must be greater than zero");
        }
        if self.following.is_empty() {
            bail!("following must list at least one account");
        }
        if self.sub_url.trim().is_empty() {
            bail!("sub_url must not be empty");
        }
        if self.max_pages == 0 {
            bail!("max_pages must be greater than zero");
        }
        if self.interval > MAX_SPAN_SECS {
            bail!("interval must be at most {MAX_SPAN_SECS} seconds");
        }
        if self.start_offset > MAX_SPAN_SECS {
            bail!("start_offset must be at most {MAX_SPAN_SECS} seconds");
        }
        Ok(())
    }

    /// Followed accounts, ordered by id.
    #[must_use]
    pub fn accounts(&self) -> Vec<FollowedAccount> {
        self.following
            .iter()
            .map(|(id, name)| FollowedAccount::new(*id, name.clone()))
            .collect()
    }

    /// Time between poll cycles.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// The first window: `[now - start_offset, now]`, stepping by `interval`.
    pub fn initial_window(&self, now: DateTime<Utc>) -> Result<TimeWindow> {
        let look_back = TimeDelta::try_seconds(self.start_offset as i64)
            .context("start_offset out of range")?;
        let step =
            TimeDelta::try_seconds(self.interval as i64).context("interval out of range")?;
        Ok(TimeWindow::looking_back(now, look_back, step)?)
    }
}
