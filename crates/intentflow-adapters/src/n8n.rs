//! n8n REST API client.
//!
//! Implements [`WorkflowService`] against the n8n public API (`/api/v1`)
//! and its webhook endpoints.  Every request carries the `X-N8N-API-KEY`
//! header and is bounded by the configured timeout.  Ids and webhook paths
//! are percent-encoded as single path segments, so user input cannot change
//! which endpoint is called.  Response bodies are
//! normalised into kernel types; non-success statuses become
//! [`ClientError::Remote`] (or [`ClientError::NotFound`] for id-addressed
//! calls that hit a 404).

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};
use url::Url;

use intentflow_kernel::{ExecutionRecord, ExecutionResult, NewWorkflow, WorkflowDefinition};

use crate::config::WorkflowClientConfig;
use crate::error::{ClientError, Result};
use crate::traits::WorkflowService;

/// Header carrying the API credential.
const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Execution statuses that mean the run did not complete.
const FAILED_STATUSES: [&str; 3] = ["error", "failed", "crashed"];

/// HTTP client for an n8n instance.
#[derive(Debug, Clone)]
pub struct N8nClient {
    config: WorkflowClientConfig,
    base: Url,
    client: reqwest::Client,
}

impl N8nClient {
    /// Build a client from configuration.
    pub fn new(config: WorkflowClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("intentflow/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        let base = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base url `{}`: {e}", config.base_url)))?;

        Ok(Self {
            config,
            base,
            client,
        })
    }

    pub fn config(&self) -> &WorkflowClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    /// `{base}/api/v1/{segments..}`.
    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        self.endpoint(&["api", "v1"], segments)
    }

    /// `{base}/webhook/{path}`.  Empty segments of `path` are dropped.
    fn webhook_url(&self, path: &str) -> Result<Url> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.endpoint(&["webhook"], &segments)
    }

    fn endpoint(&self, prefix: &[&str], segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::Config(format!("base url `{}` cannot carry a path", self.base))
            })?
            .pop_if_empty()
            .extend(prefix)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Accept", "application/json")
            .header(API_KEY_HEADER, &self.config.api_key)
    }

    /// Send a request and return the JSON body of a success response.
    ///
    /// An empty success body is returned as `Value::Null`.
    async fn send(&self, request: reqwest::RequestBuilder, operation: &str) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("{operation} timed out after {}s", self.config.timeout.as_secs())
            } else {
                format!("{operation} request failed: {e}")
            };
            warn!(operation, %reason, "workflow service unreachable");
            ClientError::Transport { reason }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Transport {
            reason: format!("failed to read {operation} response body: {e}"),
        })?;

        if !status.is_success() {
            let reason = remote_reason(&body, status);
            debug!(operation, status = status.as_u16(), %reason, "workflow service rejected request");
            return Err(ClientError::Remote {
                status: status.as_u16(),
                reason,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            reason: format!("{operation} response is not JSON: {e}"),
        })
    }

    /// Like [`Self::send`], but maps a 404 to `NotFound { id }`.
    async fn send_for(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
        id: &str,
    ) -> Result<Value> {
        self.send(request, operation).await.map_err(|e| match e {
            ClientError::Remote { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                ClientError::NotFound { id: id.to_string() }
            }
            other => other,
        })
    }
}

#[async_trait]
impl WorkflowService for N8nClient {
    async fn list(&self) -> Result<Vec<WorkflowDefinition>> {
        let request = self
            .request(Method::GET, self.api_url(&["workflows"])?)
            .query(&[("limit", self.config.list_limit)]);
        let body = self.send(request, "list workflows").await?;
        let workflows: Vec<WorkflowDefinition> = decode(data_array(body), "workflow list")?;
        debug!(count = workflows.len(), "listed workflows");
        Ok(workflows)
    }

    async fn get(&self, id: &str) -> Result<WorkflowDefinition> {
        let request = self.request(Method::GET, self.api_url(&["workflows", id])?);
        let body = self.send_for(request, "get workflow", id).await?;
        decode(body, "workflow")
    }

    async fn create(&self, workflow: &NewWorkflow) -> Result<WorkflowDefinition> {
        let payload = json!({
            "name": workflow.name,
            "nodes": workflow.nodes,
            "connections": workflow.connections,
            "settings": { "executionOrder": "v1" },
        });
        let request = self
            .request(Method::POST, self.api_url(&["workflows"])?)
            .json(&payload);
        let body = self.send(request, "create workflow").await?;

        // Some versions wrap the created workflow in `data`.
        let body = match body {
            Value::Object(mut obj) if obj.contains_key("data") && !obj.contains_key("id") => {
                obj.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        let mut created: WorkflowDefinition = decode(body, "created workflow")?;
        if created.id.is_none() {
            return Err(ClientError::Decode {
                reason: format!("service did not assign an id to `{}`", workflow.name),
            });
        }

        // The remote schema has no place for these; keep what we asked for.
        created.description.clone_from(&workflow.description);
        created.parameters.clone_from(&workflow.parameters);

        info!(workflow_id = %created.id_str(), name = %created.name, "workflow created");
        Ok(created)
    }

    async fn execute(&self, id: &str, parameters: &Map<String, Value>) -> Result<ExecutionResult> {
        let request = self
            .request(Method::POST, self.api_url(&["workflows", id, "execute"])?)
            .json(parameters);
        let body = self.send_for(request, "execute workflow", id).await?;
        let result = interpret_execution(body);
        info!(workflow_id = %id, success = result.is_success(), "workflow executed");
        Ok(result)
    }

    async fn activate(&self, id: &str) -> Result<()> {
        let request = self.request(Method::POST, self.api_url(&["workflows", id, "activate"])?);
        self.send_for(request, "activate workflow", id).await?;
        info!(workflow_id = %id, "workflow activated");
        Ok(())
    }

    async fn deactivate(&self, id: &str) -> Result<()> {
        let request = self.request(Method::POST, self.api_url(&["workflows", id, "deactivate"])?);
        self.send_for(request, "deactivate workflow", id).await?;
        info!(workflow_id = %id, "workflow deactivated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, self.api_url(&["workflows", id])?);
        match self.send_for(request, "delete workflow", id).await {
            Ok(_) => {
                info!(workflow_id = %id, "workflow deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(workflow_id = %id, "workflow already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn list_executions(&self, id: &str, limit: u32) -> Result<Vec<ExecutionRecord>> {
        let request = self
            .request(Method::GET, self.api_url(&["executions"])?)
            .query(&[("workflowId", id.to_string()), ("limit", limit.to_string())]);
        let body = self.send(request, "list executions").await?;
        decode(data_array(body), "execution list")
    }

    async fn get_execution(&self, id: &str) -> Result<ExecutionRecord> {
        let request = self.request(Method::GET, self.api_url(&["executions", id])?);
        let body = self.send_for(request, "get execution", id).await?;
        decode(body, "execution")
    }

    async fn trigger_webhook(&self, path: &str, payload: &Value) -> Result<ExecutionResult> {
        let request = self
            .request(Method::POST, self.webhook_url(path)?)
            .json(payload);
        let body = self.send(request, "trigger webhook").await?;
        let result = interpret_execution(body);
        info!(path, success = result.is_success(), "webhook triggered");
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Body helpers
// ---------------------------------------------------------------------------

/// Extract the error message from a failure body, falling back to the raw
/// text or the status reason.
fn remote_reason(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

/// Listing endpoints return `{ "data": [...] }`; older ones return a bare array.
fn data_array(body: Value) -> Value {
    match body {
        Value::Object(mut obj) => obj.remove("data").unwrap_or(Value::Array(vec![])),
        Value::Null => Value::Array(vec![]),
        other => other,
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: Value, what: &str) -> Result<T> {
    serde_json::from_value(body).map_err(|e| ClientError::Decode {
        reason: format!("unexpected {what} shape: {e}"),
    })
}

/// Classify an execution response body as success or failure.
///
/// A body is a failure when `success` is `false` or `status` names a failed
/// run.  The failure reason comes from `error` (string or `{message}`), then
/// `message`.  Success payloads prefer `result`, then `data`, then the body.
pub fn interpret_execution(body: Value) -> ExecutionResult {
    let explicit_failure = body.get("success").and_then(Value::as_bool) == Some(false);
    let failed_status = body
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| FAILED_STATUSES.contains(&s.to_ascii_lowercase().as_str()));

    if explicit_failure || failed_status {
        let reason = body
            .get("error")
            .and_then(|e| {
                e.as_str()
                    .or_else(|| e.get("message").and_then(Value::as_str))
            })
            .or_else(|| body.get("message").and_then(Value::as_str))
            .unwrap_or("workflow reported a failed run")
            .to_string();
        return ExecutionResult::Failure(reason);
    }

    let payload = body.get("result").or_else(|| body.get("data")).cloned();
    ExecutionResult::Success(payload.unwrap_or(body))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_prefers_result_payload() {
        let result = interpret_execution(json!({
            "success": true,
            "status": "completed",
            "result": {"message": "done"}
        }));
        assert_eq!(result, ExecutionResult::Success(json!({"message": "done"})));
    }

    #[test]
    fn success_falls_back_to_data_then_body() {
        let result = interpret_execution(json!({"data": [1, 2]}));
        assert_eq!(result, ExecutionResult::Success(json!([1, 2])));

        let result = interpret_execution(json!({"ok": 1}));
        assert_eq!(result, ExecutionResult::Success(json!({"ok": 1})));

        assert_eq!(
            interpret_execution(Value::Null),
            ExecutionResult::Success(Value::Null)
        );
    }

    #[test]
    fn failure_from_success_flag() {
        let result = interpret_execution(json!({"success": false, "message": "quota exceeded"}));
        assert_eq!(result, ExecutionResult::Failure("quota exceeded".into()));
    }

    #[test]
    fn failure_from_status_with_nested_error() {
        let result = interpret_execution(json!({
            "status": "Crashed",
            "error": {"message": "node threw"}
        }));
        assert_eq!(result, ExecutionResult::Failure("node threw".into()));
    }

    #[test]
    fn failure_without_reason_gets_default() {
        let result = interpret_execution(json!({"status": "error"}));
        assert!(matches!(result, ExecutionResult::Failure(r) if r.contains("failed run")));
    }

    #[test]
    fn remote_reason_prefers_json_message() {
        assert_eq!(
            remote_reason(r#"{"message":"Not Found"}"#, StatusCode::NOT_FOUND),
            "Not Found"
        );
        assert_eq!(remote_reason("plain", StatusCode::BAD_REQUEST), "plain");
        assert_eq!(
            remote_reason("", StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }

    #[test]
    fn data_array_unwraps_envelope() {
        assert_eq!(data_array(json!({"data": [1]})), json!([1]));
        assert_eq!(data_array(json!([2])), json!([2]));
        assert_eq!(data_array(json!({"nextCursor": null})), json!([]));
    }

    #[test]
    fn webhook_url_strips_leading_slash() {
        let cfg = WorkflowClientConfig::new("http://n8n.local", "k").unwrap();
        let client = N8nClient::new(cfg).unwrap();
        assert_eq!(
            client.webhook_url("/document-processing").unwrap().as_str(),
            "http://n8n.local/webhook/document-processing"
        );
        assert_eq!(
            client.api_url(&["workflows"]).unwrap().as_str(),
            "http://n8n.local/api/v1/workflows"
        );
    }

    #[test]
    fn ids_are_encoded_as_one_segment() {
        let cfg = WorkflowClientConfig::new("http://n8n.local/automation/", "k").unwrap();
        let client = N8nClient::new(cfg).unwrap();
        assert_eq!(
            client.api_url(&["workflows", "a/b?c#d", "execute"]).unwrap().as_str(),
            "http://n8n.local/automation/api/v1/workflows/a%2Fb%3Fc%23d/execute"
        );
        assert_eq!(
            client.webhook_url("forms/intake?x=1").unwrap().as_str(),
            "http://n8n.local/automation/webhook/forms/intake%3Fx=1"
        );
    }
}
