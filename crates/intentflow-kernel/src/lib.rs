//! intentflow kernel.
//!
//! Shared building blocks for intent-driven workflow routing:
//!
//! - **[`intent`]** -- The [`IntentType`] tagged union produced by
//!   classification.
//! - **[`workflow`]** -- Workflow definitions, templates and execution
//!   results as exchanged with the automation service.
//! - **[`catalog`]** -- The static template catalog and scaffold node-graph
//!   synthesis for new workflows.
//! - **[`directory`]** -- Concurrent intent → workflow directory backed by
//!   [`dashmap::DashMap`].
//! - **[`validate`]** -- Structural checks for node graphs.
//! - **[`error`]** -- Kernel error types via [`thiserror`].
//!
//! Nothing in this crate performs I/O.

pub mod catalog;
pub mod directory;
pub mod error;
pub mod intent;
pub mod validate;
pub mod workflow;

pub use directory::WorkflowDirectory;
pub use error::{KernelError, Result};
pub use intent::IntentType;
pub use validate::{ValidationReport, validate_graph};
pub use workflow::{
    ExecutionRecord, ExecutionRequest, ExecutionResult, NewWorkflow, WorkflowDefinition,
    WorkflowTemplate,
};
