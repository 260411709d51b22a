//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod task;

pub use job::JobCommands;
pub use task::TaskCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job submission
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Task status
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Task { command } => task::handle_task_command(command, config).await,
    }
}

/// Print a job result value
///
/// Backend tasks report a `message` field; it is shown on its own line
/// before the full payload.
fn print_result(result: &serde_json::Value) {
    if let Some(message) = result.get("message").and_then(|m| m.as_str()) {
        println!("  {}", message.green());
    }

    if result.is_null() {
        return;
    }

    println!("\n{}", "Result:".bold());
    if let Ok(pretty) = serde_json::to_string_pretty(result) {
        println!("{}", pretty);
    } else {
        println!("{:?}", result);
    }
}
