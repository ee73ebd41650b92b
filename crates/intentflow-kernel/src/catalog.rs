//! Static workflow template catalog and scaffold graph synthesis.
//!
//! The catalog answers "what would a workflow for this intent look like?"
//! for the intents the platform automates out of the box.  The scaffold
//! builder turns a template into a minimal node graph the remote service
//! accepts: a manual trigger, a node that lifts the declared parameters out
//! of the incoming JSON, and a code node that echoes them back.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use crate::intent::IntentType;
use crate::workflow::{NewWorkflow, WorkflowTemplate};

/// Horizontal distance between scaffold nodes in the editor canvas.
const NODE_SPACING: i64 = 200;

/// Canvas position of the first scaffold node.
const ORIGIN: (i64, i64) = (200, 300);

/// Build the default intent → template table.
pub fn default_templates() -> HashMap<IntentType, WorkflowTemplate> {
    let mut templates = HashMap::new();
    templates.insert(
        IntentType::DataAnalysis,
        WorkflowTemplate::new(
            "Data Analysis Workflow",
            "Analyzes data and generates insights",
            &["data_source", "analysis_type", "output_format"],
        ),
    );
    templates.insert(
        IntentType::DocumentProcessing,
        WorkflowTemplate::new(
            "Document Processing Workflow",
            "Processes and extracts information from documents",
            &["document_type", "extraction_fields", "output_format"],
        ),
    );
    templates.insert(
        IntentType::TaskManagement,
        WorkflowTemplate::new(
            "Task Management Workflow",
            "Manages tasks and project workflows",
            &["task_type", "priority", "assignee"],
        ),
    );
    templates.insert(
        IntentType::ApprovalRequest,
        WorkflowTemplate::new(
            "Approval Workflow",
            "Handles approval requests and notifications",
            &["approval_type", "approver", "deadline"],
        ),
    );
    templates.insert(
        IntentType::Notification,
        WorkflowTemplate::new(
            "Notification Workflow",
            "Sends notifications and alerts",
            &["notification_type", "recipients", "message"],
        ),
    );
    templates.insert(
        IntentType::ReportGeneration,
        WorkflowTemplate::new(
            "Report Generation Workflow",
            "Generates reports and summaries",
            &["report_type", "data_source", "format"],
        ),
    );
    templates
}

/// Synthesize a creatable workflow from a template.
pub fn scaffold(template: &WorkflowTemplate) -> NewWorkflow {
    let nodes = scaffold_nodes(template);
    let connections = linear_connections(&nodes);
    NewWorkflow {
        name: template.name.clone(),
        description: template.description.clone(),
        nodes: Value::Array(nodes),
        connections,
        parameters: template.parameters.clone(),
    }
}

fn scaffold_nodes(template: &WorkflowTemplate) -> Vec<Value> {
    let values: Vec<Value> = template
        .parameters
        .iter()
        .map(|p| json!({ "name": p, "value": format!("={{{{$json.{p}}}}}") }))
        .collect();

    let echoed = template
        .parameters
        .iter()
        .map(|p| format!("  {p}: params.{p},"))
        .collect::<Vec<_>>()
        .join("\n");
    let code = format!(
        "// {name}\nconst params = $input.first().json;\nconst result = {{\n{echoed}\n  timestamp: new Date().toISOString(),\n  status: \"completed\"\n}};\nreturn [{{json: result}}];",
        name = template.name,
    );

    let specs = [
        ("Manual Trigger", "n8n-nodes-base.manualTrigger", json!({})),
        (
            "Set Parameters",
            "n8n-nodes-base.set",
            json!({ "values": values }),
        ),
        (
            template.name.as_str(),
            "n8n-nodes-base.code",
            json!({ "jsCode": code }),
        ),
    ];

    specs
        .into_iter()
        .enumerate()
        .map(|(i, (name, kind, parameters))| {
            json!({
                "id": (i + 1).to_string(),
                "name": name,
                "type": kind,
                "typeVersion": 1,
                "position": [ORIGIN.0 + NODE_SPACING * i as i64, ORIGIN.1],
                "parameters": parameters,
            })
        })
        .collect()
}

/// Chain each node's `main` output to the next node in order.
fn linear_connections(nodes: &[Value]) -> Value {
    let mut connections = Map::new();
    for pair in nodes.windows(2) {
        let (Some(from), Some(to)) = (pair[0]["name"].as_str(), pair[1]["name"].as_str()) else {
            continue;
        };
        connections.insert(
            from.to_string(),
            json!({ "main": [[{ "node": to, "type": "main", "index": 0 }]] }),
        );
    }
    Value::Object(connections)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
