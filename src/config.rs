use crate::error::{PaymentError, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for the payment API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let config = Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(PaymentError::Config("timeout_ms must be > 0".into()));
        }
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| PaymentError::Config(format!("invalid base URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PaymentError::Config(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
