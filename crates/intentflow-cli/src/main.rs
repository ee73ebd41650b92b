//! CLI entry point for intentflow.
//!
//! This binary provides the `intentflow` command: an interactive chat that
//! routes requests to automation workflows, plus administrative commands
//! for the workflows themselves.

mod cli;
mod config;
mod helpers;
mod repl;
mod workflows;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::helpers::init_tracing;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Chat { user } => repl::cmd_chat(&config, user).await,
        Commands::Ask {
            message,
            user,
            json,
        } => repl::cmd_ask(&config, &message, user, json).await,
        Commands::Workflows { action } => workflows::cmd_workflows(&config, action).await,
        Commands::Trigger { path, data } => workflows::cmd_trigger(&config, &path, &data).await,
        Commands::Templates => {
            workflows::cmd_templates();
            Ok(())
        }
    }
}
