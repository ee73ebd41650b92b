//! Workflow-automation service adapters for intentflow.
//!
//! The [`WorkflowService`] trait in [`traits`] is the seam the router talks
//! through; [`N8nClient`] implements it over HTTP for n8n.

pub mod config;
pub mod error;
pub mod n8n;
pub mod traits;

pub use config::WorkflowClientConfig;
pub use error::{ClientError, Result};
pub use n8n::{N8nClient, interpret_execution};
pub use traits::WorkflowService;
