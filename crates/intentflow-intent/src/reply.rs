//! Reply shaping.
//!
//! The presentation layer only ever sees a [`Reply`]: the text to show and
//! a tag saying which path produced it.

use serde::Serialize;
use serde_json::Value;

use intentflow_kernel::{ExecutionResult, WorkflowDefinition};

/// Longest payload excerpt included in a reply, in characters.
const SUMMARY_LIMIT: usize = 800;

const GENERIC_FALLBACK: &str =
    "I'm not sure I understand. Could you please rephrase your request?";
const NO_WORKFLOW_FALLBACK: &str =
    "I don't have a specific workflow for that type of request yet.";
const ROUTING_FALLBACK: &str = "I'm having trouble setting up the workflow for your request.";

/// Why a turn ended without a workflow result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    LowConfidence,
    ClassificationFailed,
    Unroutable,
    RoutingFailed,
    ClassificationTimeout,
    RoutingTimeout,
}

/// Which path produced a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyKind {
    /// A workflow ran and completed.
    Workflow {
        workflow_id: String,
        workflow_name: String,
    },
    /// A workflow ran but reported failure.
    WorkflowFailed {
        workflow_id: String,
        workflow_name: String,
        reason: String,
    },
    Fallback { reason: FallbackReason },
}

/// The final answer for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
}

impl Reply {
    pub fn fallback(reason: FallbackReason) -> Self {
        let text = match reason {
            FallbackReason::LowConfidence
            | FallbackReason::ClassificationFailed
            | FallbackReason::ClassificationTimeout => GENERIC_FALLBACK,
            FallbackReason::Unroutable => NO_WORKFLOW_FALLBACK,
            FallbackReason::RoutingFailed | FallbackReason::RoutingTimeout => ROUTING_FALLBACK,
        };
        Self {
            text: text.to_string(),
            kind: ReplyKind::Fallback { reason },
        }
    }

    /// Shape a reply from the result of running `workflow`.
    pub fn from_execution(workflow: &WorkflowDefinition, result: &ExecutionResult) -> Self {
        let workflow_id = workflow.id_str().to_string();
        let workflow_name = workflow.name.clone();

        match result {
            ExecutionResult::Success(payload) => Self {
                text: summarize_payload(&workflow_name, payload),
                kind: ReplyKind::Workflow {
                    workflow_id,
                    workflow_name,
                },
            },
            ExecutionResult::Failure(reason) => Self {
                text: format!("I started the {workflow_name} but it did not complete: {reason}"),
                kind: ReplyKind::WorkflowFailed {
                    workflow_id,
                    workflow_name,
                    reason: reason.clone(),
                },
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.kind, ReplyKind::Fallback { .. })
    }
}

/// Turn an execution payload into reply text.
///
/// A top-level `message` string is used verbatim.  Anything else is shown
/// as pretty JSON, cut at [`SUMMARY_LIMIT`] characters.
pub fn summarize_payload(workflow_name: &str, payload: &Value) -> String {
    if let Some(message) = payload.get("message").and_then(Value::as_str)
        && !message.trim().is_empty()
    {
        return message.to_string();
    }

    let empty = match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if empty {
        return format!("The {workflow_name} completed successfully.");
    }

    let body = match payload {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    format!("The {workflow_name} completed:\n{}", truncate(&body, SUMMARY_LIMIT))
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workflow() -> WorkflowDefinition {
        serde_json::from_value(json!({"id": "wf-1", "name": "Report Generation Workflow"})).unwrap()
    }

    #[test]
    fn message_field_is_used_verbatim() {
        let reply = Reply::from_execution(
            &workflow(),
            &ExecutionResult::Success(json!({"message": "Report sent to finance", "rows": 12})),
        );
        assert_eq!(reply.text, "Report sent to finance");
        assert_eq!(
            reply.kind,
            ReplyKind::Workflow {
                workflow_id: "wf-1".into(),
                workflow_name: "Report Generation Workflow".into()
            }
        );
    }

    #[test]
    fn empty_payload_gets_completion_text() {
        let text = summarize_payload("Notification Workflow", &Value::Null);
        assert_eq!(text, "The Notification Workflow completed successfully.");
    }

    #[test]
    fn large_payload_is_truncated() {
        let payload = json!({"blob": "x".repeat(5000)});
        let text = summarize_payload("Data Analysis Workflow", &payload);
        assert!(text.ends_with('…'));
        assert!(text.chars().count() < SUMMARY_LIMIT + 60);
    }

    #[test]
    fn failure_wording_differs_from_no_workflow() {
        let failed = Reply::from_execution(&workflow(), &ExecutionResult::Failure("node crashed".into()));
        let none = Reply::fallback(FallbackReason::Unroutable);
        assert!(failed.text.starts_with("I started the Report Generation Workflow"));
        assert!(failed.text.contains("node crashed"));
        assert_ne!(failed.text, none.text);
        assert!(!failed.is_fallback());
        assert!(none.is_fallback());
    }

    #[test]
    fn fallback_texts() {
        assert_eq!(Reply::fallback(FallbackReason::LowConfidence).text, GENERIC_FALLBACK);
        assert_eq!(Reply::fallback(FallbackReason::ClassificationFailed).text, GENERIC_FALLBACK);
        assert_eq!(Reply::fallback(FallbackReason::RoutingFailed).text, ROUTING_FALLBACK);
        assert_eq!(Reply::fallback(FallbackReason::RoutingTimeout).text, ROUTING_FALLBACK);
        assert_eq!(
            Reply::fallback(FallbackReason::ClassificationTimeout).text,
            GENERIC_FALLBACK
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé…");
        assert_eq!(truncate("hi", 5), "hi");
    }
}
