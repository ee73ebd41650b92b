//! Structural checks for workflow node graphs.
//!
//! The automation service accepts almost any JSON as a node graph and only
//! fails when the workflow runs.  [`validate_graph`] catches the mistakes
//! that make a graph unrunnable before that happens.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::workflow::{NewWorkflow, WorkflowDefinition};

/// Result of validating one node graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Problems that stop the workflow from running.
    pub errors: Vec<String>,
    /// Suspicious but runnable.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn finish(mut self) -> Self {
        self.valid = self.errors.is_empty();
        self
    }
}

/// Validate a node array and its connection map.
///
/// Errors: no nodes, a node without a name or type, duplicate node names,
/// connections from or to a node that does not exist.  Warnings: no
/// trigger node, nodes that nothing connects to or from.
pub fn validate_graph(nodes: &Value, connections: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(nodes) = nodes.as_array().filter(|n| !n.is_empty()) else {
        report.errors.push("workflow has no nodes".into());
        return report.finish();
    };

    let mut names = HashSet::new();
    let mut has_trigger = false;
    for (i, node) in nodes.iter().enumerate() {
        let name = node.get("name").and_then(Value::as_str).unwrap_or_default();
        let kind = node.get("type").and_then(Value::as_str).unwrap_or_default();

        if name.is_empty() {
            report.errors.push(format!("node #{} has no name", i + 1));
        } else if !names.insert(name) {
            report.errors.push(format!("duplicate node name `{name}`"));
        }
        if kind.is_empty() {
            report.errors.push(format!("node #{} has no type", i + 1));
        }

        let kind = kind.to_ascii_lowercase();
        has_trigger |= kind.contains("trigger") || kind.contains("webhook");
    }
    if !has_trigger {
        report
            .warnings
            .push("no trigger node; the workflow can only be run manually".into());
    }

    let empty = serde_json::Map::new();
    let connections = match connections {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            report.errors.push("connections must be an object".into());
            return report.finish();
        }
    };

    let mut linked = HashSet::new();
    for (source, outputs) in connections {
        if !names.contains(source.as_str()) {
            report
                .errors
                .push(format!("connection from unknown node `{source}`"));
            continue;
        }
        linked.insert(source.as_str());

        for target in connection_targets(outputs) {
            if names.contains(target) {
                linked.insert(target);
            } else {
                report
                    .errors
                    .push(format!("`{source}` connects to unknown node `{target}`"));
            }
        }
    }

    if names.len() > 1 {
        let mut isolated: Vec<&str> = names.difference(&linked).copied().collect();
        isolated.sort_unstable();
        for name in isolated {
            report.warnings.push(format!("node `{name}` is not connected"));
        }
    }

    report.finish()
}

/// Target node names in `{ "main": [[{ "node": .. }], ..] }`.
fn connection_targets(outputs: &Value) -> impl Iterator<Item = &str> {
    outputs
        .as_object()
        .into_iter()
        .flat_map(|kinds| kinds.values())
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|link| link.get("node").and_then(Value::as_str))
}

impl WorkflowDefinition {
    pub fn validate(&self) -> ValidationReport {
        validate_graph(&self.nodes, &self.connections)
    }
}

impl NewWorkflow {
    pub fn validate(&self) -> ValidationReport {
        validate_graph(&self.nodes, &self.connections)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog;

    #[test]
    fn every_catalog_scaffold_is_valid() {
        for template in catalog::default_templates().values() {
            let report = catalog::scaffold(template).validate();
            assert!(report.valid, "{}: {:?}", template.name, report.errors);
            assert!(report.warnings.is_empty(), "{}: {:?}", template.name, report.warnings);
        }
    }

    #[test]
    fn empty_graph_is_invalid() {
        let report = validate_graph(&json!([]), &json!({}));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["workflow has no nodes"]);

        assert!(!validate_graph(&Value::Null, &Value::Null).valid);
    }

    #[test]
    fn dangling_connection_is_an_error() {
        let nodes = json!([
            {"name": "Webhook", "type": "n8n-nodes-base.webhook"},
            {"name": "Notify", "type": "n8n-nodes-base.slack"}
        ]);
        let connections = json!({
            "Webhook": {"main": [[{"node": "Notify", "type": "main", "index": 0}]]},
            "Notify": {"main": [[{"node": "Archive", "type": "main", "index": 0}]]},
            "Ghost": {"main": [[{"node": "Notify", "type": "main", "index": 0}]]}
        });

        let report = validate_graph(&nodes, &connections);
        assert!(!report.valid);
        assert!(report.errors.contains(&"`Notify` connects to unknown node `Archive`".to_string()));
        assert!(report.errors.contains(&"connection from unknown node `Ghost`".to_string()));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn duplicate_and_unnamed_nodes_are_errors() {
        let nodes = json!([
            {"name": "Step", "type": "n8n-nodes-base.manualTrigger"},
            {"name": "Step", "type": "n8n-nodes-base.code"},
            {"type": "n8n-nodes-base.code"}
        ]);
        let report = validate_graph(&nodes, &json!({}));
        assert!(report.errors.contains(&"duplicate node name `Step`".to_string()));
        assert!(report.errors.contains(&"node #3 has no name".to_string()));
    }

    #[test]
    fn missing_trigger_and_isolated_nodes_are_warnings() {
        let nodes = json!([
            {"name": "A", "type": "n8n-nodes-base.set"},
            {"name": "B", "type": "n8n-nodes-base.code"}
        ]);
        let report = validate_graph(&nodes, &json!({}));

        assert!(report.valid);
        assert_eq!(report.warnings.len(), 3);
        assert!(report.warnings[0].starts_with("no trigger node"));
        assert_eq!(report.warnings[1], "node `A` is not connected");
        assert_eq!(report.warnings[2], "node `B` is not connected");
    }
}
