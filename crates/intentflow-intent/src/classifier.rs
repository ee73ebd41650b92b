//! Message classification.
//!
//! Turns raw user text into an [`IntentType`] plus the parameters the
//! workflow will need.  [`IntentClassifier`] uses two tiers:
//!
//! 1. **Fast path**: keyword matching for phrasing that is unambiguous on
//!    its own (e.g. "please approve ...", "generate a report").
//! 2. **Slow path**: an LLM asked for a single JSON object describing the
//!    intent, its confidence and any extracted parameters.
//!
//! Anything below the confidence threshold is rejected with
//! [`IntentError::LowConfidence`] so the router is never consulted for it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use intentflow_agent::{ChatRequest, LlmClient, Message};
use intentflow_kernel::IntentType;

use crate::error::{IntentError, Result};

/// Default minimum confidence for a classification to be routed.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// How many prior messages are shown to the LLM.
const HISTORY_WINDOW: usize = 6;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-conversation state handed to the classifier and the router.
///
/// Opaque to routing apart from `session_id` and `user_id`, which are merged
/// into execution parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    pub session_id: String,
    pub user_id: String,
    #[serde(default)]
    pub history: Vec<Message>,
}

impl ConversationContext {
    /// Start a new conversation for `user_id` with a fresh session id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            session_id: uuid::Uuid::now_v7().to_string(),
            user_id: user_id.into(),
            history: Vec::new(),
        }
    }

    /// Append one completed exchange to the history.
    pub fn record_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.history.push(Message::user(user));
        self.history.push(Message::assistant(assistant));
    }

    fn recent_history(&self) -> &[Message] {
        let start = self.history.len().saturating_sub(HISTORY_WINDOW);
        &self.history[start..]
    }
}

/// The classifier's verdict on one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: IntentType,
    /// Parameters extracted from the message, keyed by parameter name.
    pub parameters: Map<String, Value>,
    /// Confidence score between 0.0 and 1.0.
    pub confidence: f64,
    pub source: ClassificationSource,
}

/// The tier that produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Keyword,
    Llm,
    /// Produced outside [`IntentClassifier`].
    External,
}

/// Anything that can classify a message.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, message: &str, context: &ConversationContext)
    -> Result<Classification>;
}

// ---------------------------------------------------------------------------
// System prompt for LLM-based classification
// ---------------------------------------------------------------------------

const LLM_SYSTEM_PROMPT: &str = r#"You classify messages sent to a business intelligence assistant.

Respond ONLY with a JSON object, no markdown and no extra text:
{
  "intent_type": "one of the intent types below",
  "confidence": 0.0-1.0,
  "parameters": {"name": "value", ...}
}

Intent types and the parameters they use:
- data_analysis (data_source, analysis_type, output_format)
- document_processing (document_type, extraction_fields, output_format)
- task_management (task_type, priority, assignee)
- approval_request (approval_type, approver, deadline)
- notification (notification_type, recipients, message)
- report_generation (report_type, data_source, format)
- general_chat (no parameters)

Only include parameters that the message states or clearly implies."#;

// ---------------------------------------------------------------------------
// Keyword table
// ---------------------------------------------------------------------------

/// Fast-path rules, checked in order.  The first rule with a matching
/// keyword wins, so more specific intents come first.
const KEYWORD_RULES: &[(&[&str], IntentType, f64)] = &[
    (&["approve", "approval", "sign off", "sign-off"], IntentType::ApprovalRequest, 0.8),
    (&["notify", "notification", "alert", "remind"], IntentType::Notification, 0.8),
    (&["report"], IntentType::ReportGeneration, 0.75),
    (&["analy", "trend", "metrics", "kpi"], IntentType::DataAnalysis, 0.75),
    (&["document", "extract", "invoice", "pdf"], IntentType::DocumentProcessing, 0.75),
    (&["task", "assign", "todo", "to-do"], IntentType::TaskManagement, 0.75),
];

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Two-tier classifier: keyword fast path, then optional LLM fallback.
pub struct IntentClassifier {
    /// Minimum confidence threshold.  Classifications below it are rejected.
    confidence_threshold: f64,

    /// Optional LLM client for messages the fast path cannot place.
    llm: Option<Arc<LlmClient>>,

    /// Model identifier for LLM requests.  Empty means the client default.
    model: String,
}

impl IntentClassifier {
    /// Create a keyword-only classifier.
    ///
    /// Messages that no keyword rule matches are rejected as low confidence.
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
            llm: None,
            model: String::new(),
        }
    }

    /// Create a classifier with LLM fallback.
    pub fn with_llm(
        confidence_threshold: f64,
        llm: Arc<LlmClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            confidence_threshold,
            llm: Some(llm),
            model: model.into(),
        }
    }

    async fn llm_classify(
        &self,
        llm: &LlmClient,
        text: &str,
        context: &ConversationContext,
    ) -> Result<Classification> {
        let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
        messages.push(Message::system(LLM_SYSTEM_PROMPT));
        messages.extend(context.recent_history().iter().cloned());
        messages.push(Message::user(text));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(0.0),
            max_tokens: Some(256),
        };

        let response = llm.chat(&request).await?;
        self.parse_llm_json_response(response.text(), text)
    }

    /// Parse the raw JSON text returned by the LLM.
    ///
    /// Models sometimes wrap the object in a markdown code fence.
    fn parse_llm_json_response(&self, json_text: &str, original_text: &str) -> Result<Classification> {
        let cleaned = json_text.trim();
        let cleaned = cleaned.strip_prefix("```json").unwrap_or(cleaned);
        let cleaned = cleaned.strip_prefix("```").unwrap_or(cleaned);
        let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned);
        let cleaned = cleaned.trim();

        let parsed: Value = serde_json::from_str(cleaned).map_err(|e| IntentError::ParseFailed {
            reason: format!("failed to parse LLM response as JSON: {e}"),
        })?;

        let intent = IntentType::parse(parsed["intent_type"].as_str().unwrap_or("general_chat"));
        let confidence = parsed["confidence"].as_f64().unwrap_or(0.0);
        let parameters = parsed["parameters"]
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter(|(_, v)| v.is_string() || v.is_number() || v.is_boolean())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        if confidence < self.confidence_threshold {
            return Err(IntentError::LowConfidence {
                intent: intent.to_string(),
                confidence,
            });
        }

        info!(
            intent = %intent,
            confidence,
            text = original_text,
            "message classified via LLM"
        );
        Ok(Classification {
            intent,
            parameters,
            confidence,
            source: ClassificationSource::Llm,
        })
    }

    /// Keyword fast path.  `None` means the LLM (if any) should decide.
    fn try_fast_match(&self, text: &str) -> Option<Classification> {
        let lower = text.to_lowercase();

        KEYWORD_RULES
            .iter()
            .find(|(keywords, _, _)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, intent, confidence)| Classification {
                intent: intent.clone(),
                parameters: Map::new(),
                confidence: *confidence,
                source: ClassificationSource::Keyword,
            })
    }
}

#[async_trait]
impl Classifier for IntentClassifier {
    async fn classify(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> Result<Classification> {
        let text = message.trim();
        if text.is_empty() {
            return Err(IntentError::ParseFailed {
                reason: "empty message".into(),
            });
        }

        debug!(text, "classifying message");

        if let Some(classification) = self.try_fast_match(text)
            && classification.confidence >= self.confidence_threshold
        {
            info!(
                intent = %classification.intent,
                confidence = classification.confidence,
                "message classified via keywords"
            );
            return Ok(classification);
        }

        if let Some(llm) = &self.llm {
            return self.llm_classify(llm, text, context).await;
        }

        Err(IntentError::LowConfidence {
            intent: IntentType::GeneralChat.to_string(),
            confidence: 0.0,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
