//! Workflow data model.
//!
//! These types describe workflows as the remote automation service sees
//! them.  The node graph and its connections are opaque JSON: the core
//! builds a scaffold for new workflows and only reads an existing graph to
//! validate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// One automatable unit of work held by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Assigned by the remote service on creation; `None` before that.
    #[serde(default, with = "id_string::option")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parameter names the workflow expects, in documentation order.
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub nodes: Value,
    #[serde(default)]
    pub connections: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkflowDefinition {
    /// The remote id, or an empty string when the workflow was never created.
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// Scaffold used to synthesize a new workflow for an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
}

impl WorkflowTemplate {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// Everything the remote service needs to create a workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWorkflow {
    pub name: String,
    pub description: String,
    pub nodes: Value,
    pub connections: Value,
    pub parameters: Vec<String>,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// A single invocation of a workflow.  Built fresh for every execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRequest {
    pub workflow_id: String,
    pub parameters: Map<String, Value>,
}

/// Outcome reported by the remote service for one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success(Value),
    Failure(String),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// A past execution as listed by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    #[serde(with = "id_string")]
    pub id: String,
    #[serde(default, with = "id_string::option")]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stopped_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Identifier encoding
// ---------------------------------------------------------------------------

/// Remote ids arrive as either strings or integers depending on the service
/// version; both are normalised to `String`.
mod id_string {
    use std::fmt;

    use serde::{Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = String;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer id")
            }

            fn visit_str<E>(self, value: &str) -> Result<String, E>
            where
                E: serde::de::Error,
            {
                Ok(value.to_string())
            }

            fn visit_string<E>(self, value: String) -> Result<String, E>
            where
                E: serde::de::Error,
            {
                Ok(value)
            }

            fn visit_i64<E>(self, value: i64) -> Result<String, E>
            where
                E: serde::de::Error,
            {
                Ok(value.to_string())
            }

            fn visit_u64<E>(self, value: u64) -> Result<String, E>
            where
                E: serde::de::Error,
            {
                Ok(value.to_string())
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }

    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<Value>::deserialize(deserializer)? {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s)),
                Some(Value::Number(n)) => Ok(Some(n.to_string())),
                Some(other) => Err(serde::de::Error::custom(format!(
                    "expected a string or integer id, got {other}"
                ))),
            }
        }

        pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(id) => serializer.serialize_some(id),
                None => serializer.serialize_none(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
