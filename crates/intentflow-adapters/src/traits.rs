//! The workflow service seam.
//!
//! The router depends on [`WorkflowService`] rather than on a concrete HTTP
//! client, so the remote automation product can be swapped or faked.

use async_trait::async_trait;
use serde_json::{Map, Value};

use intentflow_kernel::{ExecutionRecord, ExecutionResult, NewWorkflow, WorkflowDefinition};

use crate::error::Result;

/// CRUD and execution operations against a workflow-automation service.
///
/// Implementations hold no durable state beyond their connection settings.
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// List workflows known to the service.
    async fn list(&self) -> Result<Vec<WorkflowDefinition>>;

    /// Fetch a single workflow.  Unknown ids yield `ClientError::NotFound`.
    async fn get(&self, id: &str) -> Result<WorkflowDefinition>;

    /// Create a workflow; the service assigns its id.
    async fn create(&self, workflow: &NewWorkflow) -> Result<WorkflowDefinition>;

    /// Run a workflow with the given parameters.
    async fn execute(&self, id: &str, parameters: &Map<String, Value>) -> Result<ExecutionResult>;

    /// Activate a workflow.  Activating an active workflow is a no-op success.
    async fn activate(&self, id: &str) -> Result<()>;

    /// Deactivate a workflow.  Idempotent.
    async fn deactivate(&self, id: &str) -> Result<()>;

    /// Delete a workflow.  Deleting an unknown id is a no-op success.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Recent executions of a workflow, newest first, at most `limit`.
    async fn list_executions(&self, id: &str, limit: u32) -> Result<Vec<ExecutionRecord>>;

    /// Status of one execution.  Unknown ids yield `ClientError::NotFound`.
    async fn get_execution(&self, id: &str) -> Result<ExecutionRecord>;

    /// Trigger a webhook-started workflow at `path`.
    async fn trigger_webhook(&self, path: &str, payload: &Value) -> Result<ExecutionResult>;
}
