//! CLI argument definitions for intentflow.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// intentflow -- route business requests to automation workflows.
#[derive(Parser)]
#[command(
    name = "intentflow",
    version,
    about = "intentflow -- intent-driven workflow routing",
    long_about = "Classifies business requests, maps them to workflows on the automation \
                  service (creating them on first use) and runs them."
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, short, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Default log level when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive conversation.
    Chat {
        /// User id attached to every workflow execution.
        #[arg(long, short, default_value = "cli-user")]
        user: String,
    },

    /// Handle a single message and print the reply.
    Ask {
        /// The message to handle.
        message: String,

        /// User id attached to the workflow execution.
        #[arg(long, short, default_value = "cli-user")]
        user: String,

        /// Print the reply as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage workflows on the automation service.
    Workflows {
        #[command(subcommand)]
        action: WorkflowAction,
    },

    /// Trigger a webhook-started workflow.
    Trigger {
        /// Webhook path, e.g. `document-processing`.
        path: String,

        /// JSON payload to send.
        #[arg(long, short, default_value = "{}")]
        data: String,
    },

    /// List the built-in workflow templates.
    Templates,
}

/// Actions for managing remote workflows.
#[derive(Subcommand)]
pub enum WorkflowAction {
    /// List all workflows.
    List,
    /// Show one workflow.
    Get {
        /// The workflow id.
        id: String,
    },
    /// Activate a workflow.
    Activate {
        /// The workflow id.
        id: String,
    },
    /// Deactivate a workflow.
    Deactivate {
        /// The workflow id.
        id: String,
    },
    /// Delete a workflow.
    Delete {
        /// The workflow id.
        id: String,
    },
    /// Show recent executions of a workflow.
    Executions {
        /// The workflow id.
        id: String,
        /// Maximum number of executions to show.
        #[arg(long, short)]
        limit: Option<u32>,
    },
    /// Show the status of one execution.
    Execution {
        /// The execution id.
        id: String,
    },
    /// Check a workflow's node graph for structural problems.
    Validate {
        /// The workflow id.
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_workflow_executions_with_limit() {
        let cli = Cli::parse_from(["intentflow", "workflows", "executions", "wf-1", "--limit", "5"]);
        match cli.command {
            Commands::Workflows {
                action: WorkflowAction::Executions { id, limit },
            } => {
                assert_eq!(id, "wf-1");
                assert_eq!(limit, Some(5));
            }
            _ => panic!("unexpected command"),
        }
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn parses_execution_status_lookup() {
        let cli = Cli::parse_from(["intentflow", "workflows", "execution", "webhook-exec-1"]);
        assert!(matches!(
            cli.command,
            Commands::Workflows {
                action: WorkflowAction::Execution { ref id }
            } if id == "webhook-exec-1"
        ));
    }

    #[test]
    fn parses_ask_with_global_config() {
        let cli = Cli::parse_from(["intentflow", "ask", "generate a report", "--config", "alt.toml", "--json"]);
        match cli.command {
            Commands::Ask { message, user, json } => {
                assert_eq!(message, "generate a report");
                assert_eq!(user, "cli-user");
                assert!(json);
            }
            _ => panic!("unexpected command"),
        }
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
    }
}
