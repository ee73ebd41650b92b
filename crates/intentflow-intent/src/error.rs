//! Intent layer error types.
//!
//! Classification failures surface through [`IntentError`]; routing failures
//! through [`RouteError`].  The coordinator turns both into fallback replies.

/// Errors produced while classifying a user message.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    /// The message could not be turned into a classification.
    #[error("failed to classify message: {reason}")]
    ParseFailed { reason: String },

    /// The classifier produced an intent but is not confident in it.
    #[error("low confidence ({confidence:.2}) for intent: {intent}")]
    LowConfidence { intent: String, confidence: f64 },

    /// An error propagated from the LLM client.
    #[error("agent error: {0}")]
    Agent(#[from] intentflow_agent::AgentError),
}

/// Convenience alias used throughout the intent crate.
pub type Result<T> = std::result::Result<T, IntentError>;

/// Errors produced while routing a classified intent to a workflow.
///
/// Transport and remote failures from the workflow client never escape the
/// router raw; they arrive here as [`RouteError::RoutingFailed`].
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// No template exists for the intent.  No remote call was made.
    #[error("no workflow template for intent: {intent}")]
    Unroutable { intent: String },

    /// Provisioning or execution failed after a template was found.
    #[error("routing failed: {reason}")]
    RoutingFailed { reason: String },
}

impl RouteError {
    pub(crate) fn failed(reason: impl std::fmt::Display) -> Self {
        Self::RoutingFailed {
            reason: reason.to_string(),
        }
    }
}
