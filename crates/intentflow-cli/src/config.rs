//! Application configuration.
//!
//! Reads `config/default.toml` (or the path given with `--config`), then
//! applies environment overrides.  A missing file means all defaults.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use intentflow_adapters::WorkflowClientConfig;
use intentflow_agent::LlmClientConfig;
use intentflow_intent::{CoordinatorConfig, DEFAULT_CONFIDENCE_THRESHOLD};

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Everything the binary needs, one field per TOML section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub workflow: WorkflowSection,
    pub classifier: ClassifierSection,
    pub coordinator: CoordinatorConfig,
}

/// `[workflow]`: the automation service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowSection {
    pub base_url: Option<String>,
    pub api_key: String,
    pub timeout_secs: u64,
    pub list_limit: u32,
    pub executions_limit: u32,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: String::new(),
            timeout_secs: 30,
            list_limit: 100,
            executions_limit: 10,
        }
    }
}

/// `[classifier]`: keyword threshold and the optional LLM tier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub confidence_threshold: f64,
    pub llm_base_url: String,
    pub model: String,
    /// Usually supplied through `OPENAI_API_KEY` rather than the file.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            llm_base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load from `path` and apply process environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Apply overrides from `lookup`.  Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("N8N_API_URL") {
            self.workflow.base_url = Some(url);
        }
        if let Some(key) = get("N8N_API_KEY") {
            self.workflow.api_key = key;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.classifier.api_key = Some(key);
        }
        if let Some(url) = get("INTENTFLOW_LLM_BASE_URL") {
            self.classifier.llm_base_url = url;
        }
        if let Some(model) = get("INTENTFLOW_LLM_MODEL") {
            self.classifier.model = model;
        }
    }

    /// Client settings for the automation service.
    pub fn workflow_client(&self) -> Result<WorkflowClientConfig> {
        let Some(base_url) = self.workflow.base_url.as_deref() else {
            bail!("workflow service url is not configured; set N8N_API_URL or [workflow].base_url");
        };

        let config = WorkflowClientConfig::new(base_url, self.workflow.api_key.clone())
            .context("invalid workflow service configuration")?
            .with_timeout(Duration::from_secs(self.workflow.timeout_secs.max(1)))
            .with_list_limit(self.workflow.list_limit)
            .with_executions_limit(self.workflow.executions_limit);
        Ok(config)
    }

    /// LLM settings, or `None` when no API key is available.
    pub fn llm_client(&self) -> Option<LlmClientConfig> {
        let api_key = self.classifier.api_key.as_deref()?;
        Some(
            LlmClientConfig::openai_compatible(
                api_key,
                self.classifier.model.clone(),
                self.classifier.llm_base_url.clone(),
            )
            .with_timeout(Duration::from_secs(self.classifier.timeout_secs.max(1))),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file(&dir.path().join("nope.toml")).unwrap();

        assert!(config.workflow.base_url.is_none());
        assert_eq!(config.workflow.timeout_secs, 30);
        assert_eq!(config.classifier.model, "gpt-4o-mini");
        assert_eq!(config.coordinator.turn_timeout, Duration::from_secs(90));
    }

    #[test]
    fn file_values_are_read_and_partial_sections_keep_defaults() {
        let file = write_config(
            r#"
            [workflow]
            base_url = "http://n8n.internal:5678/"
            api_key = "file-key"
            list_limit = 25

            [coordinator]
            turn_timeout = 20
            "#,
        );
        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.workflow.list_limit, 25);
        assert_eq!(config.workflow.executions_limit, 10);
        assert_eq!(config.coordinator.turn_timeout, Duration::from_secs(20));
        assert_eq!(config.classifier.confidence_threshold, 0.5);

        let client = config.workflow_client().unwrap();
        assert_eq!(client.base_url, "http://n8n.internal:5678");
        assert_eq!(client.api_key, "file-key");
        assert_eq!(client.list_limit, 25);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_config("[workflow\nbase_url = ");
        assert!(AppConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("[workflow]\nbase_url = \"http://from-file:5678\"\n");
        let mut config = AppConfig::from_file(file.path()).unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("N8N_API_URL", "https://n8n.example.com"),
            ("N8N_API_KEY", "env-key"),
            ("OPENAI_API_KEY", "sk-test"),
            ("INTENTFLOW_LLM_MODEL", "gpt-4o"),
            ("INTENTFLOW_LLM_BASE_URL", ""),
        ]);
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.workflow.base_url.as_deref(), Some("https://n8n.example.com"));
        assert_eq!(config.workflow.api_key, "env-key");
        assert_eq!(config.classifier.model, "gpt-4o");
        assert_eq!(config.classifier.llm_base_url, "https://api.openai.com/v1");

        let llm = config.llm_client().unwrap();
        assert_eq!(llm.api_key, "sk-test");
        assert_eq!(llm.default_model, "gpt-4o");
    }

    #[test]
    fn missing_base_url_is_a_startup_error() {
        let err = AppConfig::default().workflow_client().unwrap_err();
        assert!(err.to_string().contains("N8N_API_URL"));
    }

    #[test]
    fn no_llm_without_api_key() {
        assert!(AppConfig::default().llm_client().is_none());
    }
}
