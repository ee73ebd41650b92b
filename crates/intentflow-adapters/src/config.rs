//! Workflow client configuration.
//!
//! [`WorkflowClientConfig`] is built once at process start and handed to
//! [`crate::N8nClient::new`].  Every request is bounded by `timeout`.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

/// Connection settings for the workflow-automation service.
#[derive(Debug, Clone)]
pub struct WorkflowClientConfig {
    /// Service root, e.g. `http://localhost:5678`.  No trailing slash.
    pub base_url: String,

    /// Value of the `X-N8N-API-KEY` header.
    pub api_key: String,

    /// Per-request timeout.
    ///
    /// Default: **30 s**.
    pub timeout: Duration,

    /// Page size for workflow listings.
    ///
    /// Default: **100**.
    pub list_limit: u32,

    /// Default page size for execution listings.
    ///
    /// Default: **10**.
    pub executions_limit: u32,
}

impl WorkflowClientConfig {
    /// Create a configuration, validating and normalising `base_url`.
    pub fn new(base_url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let raw = base_url.as_ref().trim();
        let parsed = Url::parse(raw)
            .map_err(|e| ClientError::Config(format!("invalid base url `{raw}`: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "unsupported url scheme `{}`",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            list_limit: 100,
            executions_limit: 10,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_list_limit(mut self, limit: u32) -> Self {
        self.list_limit = limit;
        self
    }

    pub fn with_executions_limit(mut self, limit: u32) -> Self {
        self.executions_limit = limit;
        self
    }
}
