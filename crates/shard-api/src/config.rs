use reqwest::Url;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the remote authority, without a trailing slash.
    pub base_url: String,
    /// Sent as `x-record-key` when set.
    pub record_key: Option<String>,
    /// Per-request timeout; `0` disables it.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            record_key: None,
            timeout_ms: 0,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_record_key(mut self, key: impl Into<String>) -> Self {
        self.record_key = Some(key.into());
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ApiError::InvalidConfig("base url is empty".into()));
        }
        let parsed = self.base_url()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "base url must be http(s): {url}"
            )));
        }
        if self.record_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(ApiError::InvalidConfig("record key is empty".into()));
        }
        Ok(())
    }

    /// Parsed base URL; trailing slashes are dropped when path segments are appended.
    pub(crate) fn base_url(&self) -> Result<Url, ApiError> {
        Url::parse(self.base_url.trim())
            .map_err(|e| ApiError::InvalidConfig(format!("invalid base url {}: {e}", self.base_url)))
    }
}
