//! Workflow directory.
//!
//! The directory maps each [`IntentType`] to the live workflow definition
//! that serves it, and holds the template table used to synthesize a
//! definition when none is recorded.  It never talks to the network.
//!
//! The live mapping is backed by [`DashMap`], so concurrent turns can read
//! and update it without a global lock.  There is at most one definition per
//! intent; [`WorkflowDirectory::record`] is last-write-wins.
//!
//! # Example
//!
//! ```rust
//! # use intentflow_kernel::{IntentType, WorkflowDefinition, WorkflowDirectory};
//! let directory = WorkflowDirectory::new();
//! assert!(directory.lookup(&IntentType::Notification).is_err());
//!
//! let template = directory.template(&IntentType::Notification).unwrap();
//! assert_eq!(template.name, "Notification Workflow");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::catalog;
use crate::error::{KernelError, Result};
use crate::intent::IntentType;
use crate::workflow::{WorkflowDefinition, WorkflowTemplate};

/// Concurrent intent → workflow directory.
///
/// Cheaply cloneable (`Arc`-backed) and `Send + Sync`.
#[derive(Clone)]
pub struct WorkflowDirectory {
    live: Arc<DashMap<IntentType, WorkflowDefinition>>,
    templates: Arc<HashMap<IntentType, WorkflowTemplate>>,
}

impl WorkflowDirectory {
    /// Create a directory with the default template catalog and no mappings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_templates(catalog::default_templates())
    }

    /// Create a directory with an explicit template table.
    #[must_use]
    pub fn with_templates(templates: HashMap<IntentType, WorkflowTemplate>) -> Self {
        Self {
            live: Arc::new(DashMap::new()),
            templates: Arc::new(templates),
        }
    }

    /// Add or replace a template.  Only valid before the directory is shared.
    #[must_use]
    pub fn with_template(self, intent: IntentType, template: WorkflowTemplate) -> Self {
        let mut templates = Arc::unwrap_or_clone(self.templates);
        templates.insert(intent, template);
        Self {
            live: self.live,
            templates: Arc::new(templates),
        }
    }

    /// Return the live definition recorded for `intent`.
    pub fn lookup(&self, intent: &IntentType) -> Result<WorkflowDefinition> {
        self.live
            .get(intent)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| KernelError::MappingNotFound {
                intent: intent.to_string(),
            })
    }

    /// Return the catalog template for `intent`.
    ///
    /// `TemplateNotFound` means the intent is not automatable; callers fall
    /// back to generic handling rather than treating it as a failure.
    pub fn template(&self, intent: &IntentType) -> Result<WorkflowTemplate> {
        self.templates
            .get(intent)
            .cloned()
            .ok_or_else(|| KernelError::TemplateNotFound {
                intent: intent.to_string(),
            })
    }

    /// Record the definition created for `intent`, replacing any previous one.
    pub fn record(&self, intent: IntentType, definition: WorkflowDefinition) -> Result<()> {
        if definition.id.is_none() {
            return Err(KernelError::MissingWorkflowId {
                name: definition.name,
            });
        }

        tracing::info!(
            intent = %intent,
            workflow_id = %definition.id_str(),
            name = %definition.name,
            "workflow mapping recorded"
        );
        self.live.insert(intent, definition);
        Ok(())
    }

    /// Drop the mapping for `intent`.  Returns the removed definition, if any.
    pub fn forget(&self, intent: &IntentType) -> Option<WorkflowDefinition> {
        let removed = self.live.remove(intent).map(|(_, def)| def);
        if let Some(def) = &removed {
            tracing::info!(intent = %intent, workflow_id = %def.id_str(), "workflow mapping forgotten");
        }
        removed
    }

    /// Remove the mapping for `intent` only if it still points at
    /// `workflow_id`.  A mapping replaced in the meantime is kept.
    pub fn forget_if(&self, intent: &IntentType, workflow_id: &str) -> Option<WorkflowDefinition> {
        let removed = self
            .live
            .remove_if(intent, |_, def| def.id.as_deref() == Some(workflow_id))
            .map(|(_, def)| def);
        if removed.is_some() {
            tracing::info!(intent = %intent, workflow_id, "stale workflow mapping forgotten");
        }
        removed
    }

    /// Find the intent whose template carries `name`.
    pub fn intent_for_template_name(&self, name: &str) -> Option<IntentType> {
        self.templates
            .iter()
            .find(|(_, t)| t.name == name)
            .map(|(intent, _)| intent.clone())
    }

    /// Snapshot of intents that currently have a live mapping.
    pub fn intents(&self) -> Vec<IntentType> {
        self.live.iter().map(|e| e.key().clone()).collect()
    }

    /// Snapshot of the template table, sorted by intent label.
    pub fn templates(&self) -> Vec<(IntentType, WorkflowTemplate)> {
        let mut all: Vec<_> = self
            .templates
            .iter()
            .map(|(i, t)| (i.clone(), t.clone()))
            .collect();
        all.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        all
    }

    /// Number of live mappings.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl Default for WorkflowDirectory {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn definition(id: &str, name: &str) -> WorkflowDefinition {
        WorkflowDefinition {
            id: Some(id.to_string()),
            name: name.to_string(),
            description: String::new(),
            parameters: vec![],
            active: false,
            nodes: Value::Null,
            connections: Value::Null,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn lookup_before_record_is_not_found() {
        let directory = WorkflowDirectory::new();
        let err = directory.lookup(&IntentType::DataAnalysis).unwrap_err();
        assert!(matches!(err, KernelError::MappingNotFound { .. }));
    }

    #[test]
    fn record_then_lookup() {
        let directory = WorkflowDirectory::new();
        directory
            .record(IntentType::DataAnalysis, definition("wf-1", "Data Analysis Workflow"))
            .unwrap();

        let def = directory.lookup(&IntentType::DataAnalysis).unwrap();
        assert_eq!(def.id_str(), "wf-1");
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn record_is_last_write_wins() {
        let directory = WorkflowDirectory::new();
        directory
            .record(IntentType::Notification, definition("a", "n"))
            .unwrap();
        directory
            .record(IntentType::Notification, definition("b", "n"))
            .unwrap();

        assert_eq!(directory.lookup(&IntentType::Notification).unwrap().id_str(), "b");
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn record_without_id_is_rejected() {
        let directory = WorkflowDirectory::new();
        let mut def = definition("x", "draft");
        def.id = None;
        let err = directory.record(IntentType::Notification, def).unwrap_err();
        assert!(matches!(err, KernelError::MissingWorkflowId { .. }));
        assert!(directory.is_empty());
    }

    #[test]
    fn forget_removes_mapping() {
        let directory = WorkflowDirectory::new();
        directory
            .record(IntentType::TaskManagement, definition("t", "Task Management Workflow"))
            .unwrap();

        assert!(directory.forget(&IntentType::TaskManagement).is_some());
        assert!(directory.forget(&IntentType::TaskManagement).is_none());
        assert!(directory.lookup(&IntentType::TaskManagement).is_err());
    }

    #[test]
    fn forget_if_keeps_a_replaced_mapping() {
        let directory = WorkflowDirectory::new();
        directory
            .record(IntentType::Notification, definition("old", "Notification Workflow"))
            .unwrap();
        directory
            .record(IntentType::Notification, definition("new", "Notification Workflow"))
            .unwrap();

        assert!(directory.forget_if(&IntentType::Notification, "old").is_none());
        assert_eq!(
            directory.lookup(&IntentType::Notification).unwrap().id.as_deref(),
            Some("new")
        );

        assert!(directory.forget_if(&IntentType::Notification, "new").is_some());
        assert!(directory.lookup(&IntentType::Notification).is_err());
    }

    #[test]
    fn unknown_intent_has_no_template() {
        let directory = WorkflowDirectory::new();
        let other = IntentType::Other("unknown_custom_intent".into());
        assert!(matches!(
            directory.template(&other),
            Err(KernelError::TemplateNotFound { .. })
        ));
        assert!(directory.template(&IntentType::GeneralChat).is_err());
    }

    #[test]
    fn custom_template_for_other_intent() {
        let intent = IntentType::Other("invoice_processing".into());
        let directory = WorkflowDirectory::new().with_template(
            intent.clone(),
            WorkflowTemplate::new("Invoice Workflow", "Processes invoices", &["invoice_id"]),
        );

        assert_eq!(directory.template(&intent).unwrap().name, "Invoice Workflow");
        assert_eq!(
            directory.intent_for_template_name("Invoice Workflow"),
            Some(intent)
        );
        assert!(directory.template(&IntentType::Notification).is_ok());
    }

    #[test]
    fn clones_share_live_mappings() {
        let directory = WorkflowDirectory::new();
        let handle = directory.clone();
        handle
            .record(IntentType::ApprovalRequest, definition("ap", "Approval Workflow"))
            .unwrap();
        assert!(directory.lookup(&IntentType::ApprovalRequest).is_ok());
    }
}
