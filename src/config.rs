//! Client configuration for the shelter backend and the identity provider.
//!
//! DESIGN
//! ======
//! The backend base URL and the identity API key are fixed at build time via
//! `option_env!`. Everything else has a compiled-in default. The CLI may
//! override base URL and timeout per invocation; the library never reads
//! runtime environment variables.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://gs-sentinel-api.azurewebsites.net";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Build-time API base URL, falling back to the production host.
const BUILD_API_URL: Option<&str> = option_env!("SENTINEL_API_URL");
const BUILD_IDENTITY_API_KEY: Option<&str> = option_env!("SENTINEL_IDENTITY_API_KEY");

// =============================================================================
// BACKEND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self { base_url: normalize_base_url(base_url), timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS) }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join an API path (leading slash expected) onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(BUILD_API_URL.unwrap_or(DEFAULT_API_URL))
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl IdentityConfig {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: DEFAULT_IDENTITY_ENDPOINT.to_owned(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = normalize_base_url(endpoint);
        self
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self::new(BUILD_IDENTITY_API_KEY.map(str::to_owned))
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
