//! Conversation commands: `chat` and `ask`.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use intentflow_intent::{ConversationContext, Coordinator, Reply, ReplyKind};

use crate::config::AppConfig;
use crate::helpers::build_coordinator;

/// Adopt existing remote workflows so restarts do not create duplicates.
async fn reconcile(coordinator: &Coordinator) {
    match coordinator.router().reconcile().await {
        Ok(adopted) => info!(adopted, "existing workflows adopted"),
        Err(e) => warn!(error = %e, "could not list existing workflows, they will be created on demand"),
    }
}

fn print_reply(reply: &Reply) {
    for line in reply.text.lines() {
        println!("  {line}");
    }
    if let ReplyKind::Workflow { workflow_id, .. } | ReplyKind::WorkflowFailed { workflow_id, .. } =
        &reply.kind
    {
        println!("  [workflow {workflow_id}]");
    }
    println!();
}

// ---------------------------------------------------------------------------
// Subcommand: chat
// ---------------------------------------------------------------------------

pub async fn cmd_chat(config: &AppConfig, user: String) -> Result<()> {
    let coordinator = build_coordinator(config)?;
    reconcile(&coordinator).await;

    let mut context = ConversationContext::new(user);
    info!(session_id = %context.session_id, user_id = %context.user_id, "conversation started");

    println!();
    println!("  intentflow -- type a request, or `quit` to exit.");
    println!();

    let stdin = io::stdin();
    let mut line_buf = String::new();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        line_buf.clear();
        match stdin.lock().read_line(&mut line_buf) {
            Ok(0) => {
                println!();
                info!("EOF received, exiting");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("  Error reading input: {e}");
                continue;
            }
        }

        let trimmed = line_buf.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            info!("user requested exit");
            break;
        }

        let reply = coordinator.handle_turn(trimmed, &context).await;
        print_reply(&reply);
        context.record_turn(trimmed, reply.text);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: ask
// ---------------------------------------------------------------------------

pub async fn cmd_ask(config: &AppConfig, message: &str, user: String, json: bool) -> Result<()> {
    let coordinator = build_coordinator(config)?;
    reconcile(&coordinator).await;

    let context = ConversationContext::new(user);
    let reply = coordinator.handle_turn(message, &context).await;

    if json {
        let out = serde_json::to_string_pretty(&reply).context("failed to encode reply")?;
        println!("{out}");
    } else {
        print_reply(&reply);
    }
    Ok(())
}
