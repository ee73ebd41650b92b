//! Administrative commands: `workflows`, `trigger` and `templates`.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde_json::Value;

use intentflow_adapters::WorkflowService;
use intentflow_kernel::{ExecutionResult, WorkflowDirectory};

use crate::cli::WorkflowAction;
use crate::config::AppConfig;
use crate::helpers::build_client;

// ---------------------------------------------------------------------------
// Subcommand: workflows
// ---------------------------------------------------------------------------

pub async fn cmd_workflows(config: &AppConfig, action: WorkflowAction) -> Result<()> {
    let client = build_client(config)?;

    match action {
        WorkflowAction::List => {
            let workflows = client.list().await.context("failed to list workflows")?;
            if workflows.is_empty() {
                println!("  No workflows found.");
                return Ok(());
            }
            println!("  {:<24} {:<8} NAME", "ID", "ACTIVE");
            for w in &workflows {
                let active = if w.active { "yes" } else { "no" };
                println!("  {:<24} {:<8} {}", w.id_str(), active, w.name);
            }
        }
        WorkflowAction::Get { id } => {
            let workflow = client
                .get(&id)
                .await
                .with_context(|| format!("failed to fetch workflow {id}"))?;
            println!("{}", serde_json::to_string_pretty(&workflow)?);
        }
        WorkflowAction::Activate { id } => {
            client
                .activate(&id)
                .await
                .with_context(|| format!("failed to activate workflow {id}"))?;
            println!("  Workflow {id} activated.");
        }
        WorkflowAction::Deactivate { id } => {
            client
                .deactivate(&id)
                .await
                .with_context(|| format!("failed to deactivate workflow {id}"))?;
            println!("  Workflow {id} deactivated.");
        }
        WorkflowAction::Delete { id } => {
            client
                .delete(&id)
                .await
                .with_context(|| format!("failed to delete workflow {id}"))?;
            println!("  Workflow {id} deleted.");
        }
        WorkflowAction::Executions { id, limit } => {
            let limit = limit.unwrap_or(client.config().executions_limit);
            let records = client
                .list_executions(&id, limit)
                .await
                .with_context(|| format!("failed to list executions for {id}"))?;
            if records.is_empty() {
                println!("  No executions for workflow {id}.");
                return Ok(());
            }
            println!("  {:<12} {:<10} {:<10} STARTED", "ID", "STATUS", "MODE");
            for r in &records {
                println!(
                    "  {:<12} {:<10} {:<10} {}",
                    r.id,
                    r.status.as_deref().unwrap_or("-"),
                    r.mode.as_deref().unwrap_or("-"),
                    fmt_time(r.started_at)
                );
            }
        }
        WorkflowAction::Execution { id } => {
            let record = client
                .get_execution(&id)
                .await
                .with_context(|| format!("failed to fetch execution {id}"))?;
            println!("  Execution {}", record.id);
            println!("    workflow: {}", record.workflow_id.as_deref().unwrap_or("-"));
            println!("    status:   {}", record.status.as_deref().unwrap_or("-"));
            println!("    finished: {}", if record.finished { "yes" } else { "no" });
            println!("    mode:     {}", record.mode.as_deref().unwrap_or("-"));
            println!("    started:  {}", fmt_time(record.started_at));
            println!("    stopped:  {}", fmt_time(record.stopped_at));
        }
        WorkflowAction::Validate { id } => {
            let workflow = client
                .get(&id)
                .await
                .with_context(|| format!("failed to fetch workflow {id}"))?;
            let report = workflow.validate();
            for error in &report.errors {
                println!("  error:   {error}");
            }
            for warning in &report.warnings {
                println!("  warning: {warning}");
            }
            if !report.valid {
                bail!("workflow {id} has {} error(s)", report.errors.len());
            }
            println!("  Workflow {id} ({}) is valid.", workflow.name);
        }
    }

    Ok(())
}

fn fmt_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into())
}

// ---------------------------------------------------------------------------
// Subcommand: trigger
// ---------------------------------------------------------------------------

pub async fn cmd_trigger(config: &AppConfig, path: &str, data: &str) -> Result<()> {
    let payload: Value = serde_json::from_str(data).context("--data must be valid JSON")?;
    let client = build_client(config)?;

    let result = client
        .trigger_webhook(path, &payload)
        .await
        .with_context(|| format!("failed to trigger webhook {path}"))?;

    match result {
        ExecutionResult::Success(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        ExecutionResult::Failure(reason) => {
            println!("  Webhook workflow failed: {reason}");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: templates
// ---------------------------------------------------------------------------

pub fn cmd_templates() {
    for (intent, template) in WorkflowDirectory::new().templates() {
        println!("  {intent}");
        println!("    {} -- {}", template.name, template.description);
        println!("    parameters: {}", template.parameters.join(", "));
    }
}
