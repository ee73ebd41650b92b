//! Turn coordinator.
//!
//! Sequences classification, routing and reply shaping for one user turn,
//! and owns every fallback decision.  [`Coordinator::handle_turn`] always
//! returns a [`Reply`]; no error reaches the presentation layer.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::classifier::{Classifier, ConversationContext, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::error::{IntentError, RouteError};
use crate::reply::{FallbackReason, Reply};
use crate::router::{IntentRouter, RouteRequest};

/// Coordinator tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Upper bound for each of classification and routing.
    #[serde(with = "seconds")]
    pub turn_timeout: Duration,
    /// Classifications below this confidence never reach the router.
    pub confidence_threshold: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(90),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

/// Runs user turns end to end.
pub struct Coordinator {
    classifier: Arc<dyn Classifier>,
    router: IntentRouter,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(classifier: Arc<dyn Classifier>, router: IntentRouter, config: CoordinatorConfig) -> Self {
        Self {
            classifier,
            router,
            config,
        }
    }

    pub fn router(&self) -> &IntentRouter {
        &self.router
    }

    /// Handle one user message.
    ///
    /// Routing runs on its own task: if this future is dropped or the turn
    /// times out, in-flight workflow calls still finish and their result is
    /// discarded.
    pub async fn handle_turn(&self, message: &str, context: &ConversationContext) -> Reply {
        let timeout = self.config.turn_timeout;

        let classified =
            tokio::time::timeout(timeout, self.classifier.classify(message, context)).await;
        let classification = match classified {
            Ok(Ok(c)) if c.confidence >= self.config.confidence_threshold => c,
            Ok(Ok(c)) => {
                info!(intent = %c.intent, confidence = c.confidence, "classification below threshold");
                return Reply::fallback(FallbackReason::LowConfidence);
            }
            Ok(Err(IntentError::LowConfidence { intent, confidence })) => {
                info!(%intent, confidence, "classification below threshold");
                return Reply::fallback(FallbackReason::LowConfidence);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "classification failed");
                return Reply::fallback(FallbackReason::ClassificationFailed);
            }
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "classification timed out");
                return Reply::fallback(FallbackReason::ClassificationTimeout);
            }
        };

        let request = RouteRequest {
            intent: classification.intent,
            parameters: classification.parameters,
            context: context.clone(),
        };
        let router = self.router.clone();
        let routing = tokio::spawn(async move { router.route(&request).await });

        match tokio::time::timeout(timeout, routing).await {
            Ok(Ok(Ok(outcome))) => {
                if !outcome.result.is_success() {
                    warn!(workflow_id = %outcome.workflow.id_str(), "workflow did not complete");
                }
                Reply::from_execution(&outcome.workflow, &outcome.result)
            }
            Ok(Ok(Err(RouteError::Unroutable { intent }))) => {
                info!(%intent, "no workflow for intent");
                Reply::fallback(FallbackReason::Unroutable)
            }
            Ok(Ok(Err(RouteError::RoutingFailed { reason }))) => {
                warn!(%reason, "routing failed");
                Reply::fallback(FallbackReason::RoutingFailed)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "routing task aborted");
                Reply::fallback(FallbackReason::RoutingFailed)
            }
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "routing timed out, leaving it to finish in the background");
                Reply::fallback(FallbackReason::RoutingTimeout)
            }
        }
    }
}
