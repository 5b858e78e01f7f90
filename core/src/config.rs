//! Client configuration.
//!
//! `ClientConfig` is plain data: it deserializes from any serde format and
//! can also be read from `PASTE_*` environment variables. The host pattern
//! defaults to the base URL's host when not given explicitly.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{ApiError, Result};
use crate::identity::HostPattern;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Static API token, sent as `Authorization: Bearer <token>`.
    pub token: Option<String>,
    /// Hosts whose URLs are accepted as document links. Derived from
    /// `base_url` when `None`.
    pub host_pattern: Option<HostPattern>,
    /// Per-request timeout in milliseconds. Must be non-zero.
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            host_pattern: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: format!("paste-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_host_pattern(mut self, pattern: HostPattern) -> Self {
        self.host_pattern = Some(pattern);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Read `PASTE_BASE_URL`, `PASTE_TOKEN`, `PASTE_HOST_PATTERN` and
    /// `PASTE_TIMEOUT_MS`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("PASTE_BASE_URL") {
            config.base_url = base_url;
        }
        config.token = lookup("PASTE_TOKEN").filter(|token| !token.is_empty());
        if let Some(pattern) = lookup("PASTE_HOST_PATTERN") {
            config.host_pattern = Some(HostPattern::new(&pattern)?);
        }
        if let Some(ms) = lookup("PASTE_TIMEOUT_MS") {
            config.timeout_ms = ms.parse().map_err(|_| {
                ApiError::InvalidConfig(format!("PASTE_TIMEOUT_MS is not a number: {ms}"))
            })?;
        }
        Ok(config)
    }

    /// The request timeout; zero would abort every request and is rejected.
    pub fn timeout(&self) -> Result<Duration> {
        if self.timeout_ms == 0 {
            return Err(ApiError::InvalidConfig("timeout must be greater than zero".to_string()));
        }
        Ok(Duration::from_millis(self.timeout_ms))
    }

    /// Parse `base_url`; it must be an absolute http(s) URL with a host.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("{}: {e}", self.base_url)))?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ApiError::InvalidConfig(self.base_url.clone()));
        }
        Ok(url)
    }

    /// The configured host pattern, or one matching the base URL's host.
    pub fn effective_host_pattern(&self) -> Result<HostPattern> {
        match &self.host_pattern {
            Some(pattern) => Ok(pattern.clone()),
            None => {
                let url = self.parsed_base_url()?;
                let host = url
                    .host_str()
                    .ok_or_else(|| ApiError::InvalidConfig(self.base_url.clone()))?;
                HostPattern::for_host(host)
            }
        }
    }
}
