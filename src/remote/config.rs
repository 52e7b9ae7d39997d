//! Remote connection settings.

use std::time::Duration;

/// Endpoint the hosted client falls back to when nothing is configured.
/// Treated as "not configured".
pub const PLACEHOLDER_URL: &str = "https://placeholder.supabase.co";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint URL, access key and request timeout for the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub key: Option<String>,
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            key: Some(key.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True only for a present, non-empty, non-placeholder endpoint.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        match self.url.as_deref().map(str::trim) {
            None | Some("" | "undefined") => false,
            Some(url) => url.trim_end_matches('/') != PLACEHOLDER_URL,
        }
    }

    /// Key to send, falling back to the placeholder the hosted client uses.
    #[must_use]
    pub fn key_or_placeholder(&self) -> &str {
        self.key.as_deref().filter(|k| !k.is_empty()).unwrap_or("placeholder")
    }
}
