//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization and construction of the workflow client,
//! classifier and coordinator from [`AppConfig`].

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use intentflow_adapters::N8nClient;
use intentflow_agent::LlmClient;
use intentflow_intent::{Classifier, Coordinator, IntentClassifier, IntentRouter};
use intentflow_kernel::WorkflowDirectory;

use crate::config::AppConfig;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Build the HTTP client for the automation service.
pub fn build_client(config: &AppConfig) -> Result<Arc<N8nClient>> {
    let client_config = config.workflow_client()?;
    info!(base_url = %client_config.base_url, "workflow service configured");
    let client = N8nClient::new(client_config).context("failed to build workflow client")?;
    Ok(Arc::new(client))
}

/// Build the classifier, with the LLM tier when an API key is available.
pub fn build_classifier(config: &AppConfig) -> Result<Arc<dyn Classifier>> {
    let threshold = config.classifier.confidence_threshold;

    let Some(llm_config) = config.llm_client() else {
        info!("no LLM API key configured, classifying with keywords only");
        return Ok(Arc::new(IntentClassifier::new(threshold)));
    };

    let llm = LlmClient::new(llm_config).context("failed to build LLM client")?;
    let model = llm.default_model().to_string();
    info!(model = %model, "LLM classification enabled");
    Ok(Arc::new(IntentClassifier::with_llm(threshold, Arc::new(llm), model)))
}

/// Build a coordinator over a fresh directory.
pub fn build_coordinator(config: &AppConfig) -> Result<Coordinator> {
    let router = IntentRouter::new(WorkflowDirectory::new(), build_client(config)?);
    Ok(Coordinator::new(
        build_classifier(config)?,
        router,
        config.coordinator.clone(),
    ))
}
