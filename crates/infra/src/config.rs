//! Backend connection settings.

use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_JOIN_ORG_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Where the internal backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: DEFAULT_JOIN_ORG_TIMEOUT,
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Reads `BACKEND_INTERNAL_URL` and `JOIN_ORG_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let base_url = std::env::var("BACKEND_INTERNAL_URL").unwrap_or_else(|_| {
            tracing::warn!("BACKEND_INTERNAL_URL not set; using {DEFAULT_BACKEND_URL}");
            DEFAULT_BACKEND_URL.to_string()
        });

        let timeout = match std::env::var("JOIN_ORG_TIMEOUT_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(value = %raw, "invalid JOIN_ORG_TIMEOUT_MS; using default");
                    DEFAULT_JOIN_ORG_TIMEOUT
                }
            },
            Err(_) => DEFAULT_JOIN_ORG_TIMEOUT,
        };

        Self { base_url, timeout }
    }

    /// Absolute URL for a backend path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
