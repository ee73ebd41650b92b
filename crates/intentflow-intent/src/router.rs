//! Intent router.
//!
//! Maps a classified intent to a runnable workflow and runs it:
//!
//! 1. Look the intent up in the [`WorkflowDirectory`].
//! 2. On a miss, fetch the catalog template.  No template means the intent
//!    is [`RouteError::Unroutable`] and nothing remote is touched.
//! 3. Create the workflow from the template's scaffold and record it.
//! 4. Execute it with the turn's parameters.
//! 5. If the service says the recorded workflow no longer exists, forget the
//!    mapping, provision again and execute once more.  There is no second
//!    retry: if that execution errors too, the outcome is a failed run.
//!
//! Creation is not serialized across concurrent turns.  Two turns that both
//! miss on the same intent each create a workflow; `record` is last-write-wins
//! so the directory converges on one of them.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use intentflow_adapters::{ClientError, WorkflowService};
use intentflow_kernel::{
    ExecutionRequest, ExecutionResult, IntentType, WorkflowDefinition, WorkflowDirectory, catalog,
};

use crate::classifier::ConversationContext;
use crate::error::RouteError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One routing request, built from a classification.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub intent: IntentType,
    pub parameters: Map<String, Value>,
    pub context: ConversationContext,
}

/// A workflow ran; `result` says whether it completed.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub workflow: WorkflowDefinition,
    pub result: ExecutionResult,
    /// A workflow was created during this request.
    pub provisioned: bool,
    /// The first execution hit a stale id and was retried.
    pub retried: bool,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Routes intents to workflows, creating them on first use.  Cheap to clone.
#[derive(Clone)]
pub struct IntentRouter {
    directory: WorkflowDirectory,
    service: Arc<dyn WorkflowService>,
}

impl IntentRouter {
    pub fn new(directory: WorkflowDirectory, service: Arc<dyn WorkflowService>) -> Self {
        Self { directory, service }
    }

    pub fn directory(&self) -> &WorkflowDirectory {
        &self.directory
    }

    /// Route `request` to a workflow and execute it.
    pub async fn route(&self, request: &RouteRequest) -> Result<RouteOutcome, RouteError> {
        let intent = &request.intent;

        let (workflow, provisioned) = match self.directory.lookup(intent) {
            Ok(workflow) => {
                debug!(intent = %intent, workflow_id = %workflow.id_str(), "using recorded workflow");
                (workflow, false)
            }
            Err(_) => (self.provision(intent).await?, true),
        };

        match self.execute(&workflow, request).await {
            Ok(result) => Ok(RouteOutcome {
                workflow,
                result,
                provisioned,
                retried: false,
            }),
            Err(e) if e.is_not_found() => {
                warn!(
                    intent = %intent,
                    workflow_id = %workflow.id_str(),
                    "recorded workflow is gone, provisioning a replacement"
                );
                self.directory.forget_if(intent, workflow.id_str());
                let workflow = self.provision(intent).await?;

                let result = match self.execute(&workflow, request).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(
                            workflow_id = %workflow.id_str(),
                            error = %e,
                            "retried execution failed"
                        );
                        ExecutionResult::Failure(retry_failure_reason(&e).to_string())
                    }
                };
                Ok(RouteOutcome {
                    workflow,
                    result,
                    provisioned: true,
                    retried: true,
                })
            }
            Err(e) => Err(RouteError::failed(e)),
        }
    }

    /// Adopt remote workflows whose names match catalog templates.
    ///
    /// Intents that already have a mapping are left alone.  When several
    /// remote workflows share a template name, an active one is preferred.
    /// Returns the number of mappings added.
    pub async fn reconcile(&self) -> Result<usize, ClientError> {
        let mut remote = self.service.list().await?;
        remote.sort_by_key(|w| !w.active);

        let mut adopted = 0;
        for workflow in remote {
            let Some(intent) = self.directory.intent_for_template_name(&workflow.name) else {
                continue;
            };
            if workflow.id.is_none() || self.directory.lookup(&intent).is_ok() {
                continue;
            }

            // Listings omit the fields we keep locally.
            let mut workflow = workflow;
            if let Ok(template) = self.directory.template(&intent) {
                if workflow.description.is_empty() {
                    workflow.description = template.description;
                }
                if workflow.parameters.is_empty() {
                    workflow.parameters = template.parameters;
                }
            }

            if self.directory.record(intent, workflow).is_ok() {
                adopted += 1;
            }
        }

        info!(adopted, mapped = self.directory.len(), "directory reconciled with remote workflows");
        Ok(adopted)
    }

    /// Create the workflow for `intent` from its template and record it.
    async fn provision(&self, intent: &IntentType) -> Result<WorkflowDefinition, RouteError> {
        let template = self.directory.template(intent).map_err(|_| {
            debug!(intent = %intent, "no template for intent");
            RouteError::Unroutable {
                intent: intent.to_string(),
            }
        })?;

        let created = self
            .service
            .create(&catalog::scaffold(&template))
            .await
            .map_err(|e| {
                warn!(intent = %intent, error = %e, "workflow creation failed");
                RouteError::failed(e)
            })?;

        info!(
            intent = %intent,
            workflow_id = %created.id_str(),
            name = %created.name,
            "workflow provisioned"
        );

        self.directory
            .record(intent.clone(), created.clone())
            .map_err(RouteError::failed)?;
        Ok(created)
    }

    async fn execute(
        &self,
        workflow: &WorkflowDefinition,
        request: &RouteRequest,
    ) -> Result<ExecutionResult, ClientError> {
        let execution = prepare_execution(workflow, request);
        info!(
            workflow_id = %execution.workflow_id,
            name = %workflow.name,
            parameters = execution.parameters.len(),
            "executing workflow"
        );
        self.service
            .execute(&execution.workflow_id, &execution.parameters)
            .await
    }
}

/// User-facing reason for a retried execution that errored.  The client
/// error itself only goes to the log.
fn retry_failure_reason(error: &ClientError) -> &'static str {
    if error.is_not_found() {
        "the workflow could not be found"
    } else {
        "the workflow service could not run it"
    }
}

// ---------------------------------------------------------------------------
// Parameter preparation
// ---------------------------------------------------------------------------

/// Build the execution request for one run of `workflow`.
///
/// Turn context (`session_id`, `user_id`, `timestamp`, `workflow_type`) is
/// merged in without overwriting caller-supplied keys.  Declared parameters
/// the caller did not supply are left absent.
pub fn prepare_execution(workflow: &WorkflowDefinition, request: &RouteRequest) -> ExecutionRequest {
    let mut parameters = request.parameters.clone();

    let missing: Vec<&str> = workflow
        .parameters
        .iter()
        .filter(|p| !parameters.contains_key(p.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        debug!(workflow = %workflow.name, ?missing, "declared parameters not supplied");
    }

    let context = &request.context;
    parameters
        .entry("session_id")
        .or_insert_with(|| Value::String(context.session_id.clone()));
    parameters
        .entry("user_id")
        .or_insert_with(|| Value::String(context.user_id.clone()));
    parameters
        .entry("timestamp")
        .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
    parameters
        .entry("workflow_type")
        .or_insert_with(|| Value::String(workflow.name.clone()));

    ExecutionRequest {
        workflow_id: workflow.id_str().to_string(),
        parameters,
    }
}
