//! Task command handlers
//!
//! Inspect or follow a task that was submitted elsewhere.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use screener_client::{PollOutcome, TaskPoller, TokioScheduler};
use screener_core::domain::task::{TaskHandle, TaskStatus};

use super::print_result;
use crate::config::Config;

/// Task subcommands
#[derive(Subcommand)]
pub enum TaskCommands {
    /// Check the status of a task once
    Status {
        /// Task ID returned at submission
        task_id: String,
    },
    /// Poll a task until it finishes (Ctrl-C stops)
    Wait {
        /// Task ID returned at submission
        task_id: String,
    },
}

/// Handle task commands
pub async fn handle_task_command(command: TaskCommands, config: &Config) -> Result<()> {
    match command {
        TaskCommands::Status { task_id } => show_status(config, &task_id).await,
        TaskCommands::Wait { task_id } => wait_for_task(config, &task_id).await,
    }
}

fn parse_handle(task_id: &str) -> Result<TaskHandle> {
    TaskHandle::new(task_id).context("Invalid task ID")
}

/// Fetch and display the current status of a task
async fn show_status(config: &Config, task_id: &str) -> Result<()> {
    let handle = parse_handle(task_id)?;
    let client = config.client()?;

    let status = client
        .task_status(&handle)
        .await
        .context("Failed to fetch task status")?;

    println!("{}", "Task Details:".bold());
    println!("  ID:     {}", handle.to_string().cyan());

    match status {
        TaskStatus::Pending { state } => {
            println!("  Status: {}", state.yellow());
        }
        TaskStatus::Succeeded(result) => {
            println!("  Status: {}", "SUCCESS".green());
            print_result(&result);
        }
        TaskStatus::Failed(reason) => {
            println!("  Status: {}", "FAILURE".red());
            println!("\n{}", "Error:".bold());
            println!("{}", reason.red());
        }
    }

    Ok(())
}

/// Poll an existing task to resolution
async fn wait_for_task(config: &Config, task_id: &str) -> Result<()> {
    let handle = parse_handle(task_id)?;
    let client = config.client()?;
    let poller = TaskPoller::new(client, Arc::new(TokioScheduler), config.poller.clone());

    println!(
        "{} Waiting for task {} (up to {}s)...",
        "▸".cyan(),
        handle.to_string().bold(),
        config.poller.max_wait().as_secs()
    );

    let polling = poller.poll(&handle);
    tokio::pin!(polling);

    let outcome = tokio::select! {
        outcome = &mut polling => outcome,
        _ = tokio::signal::ctrl_c() => {
            poller.cancel();
            polling.await
        }
    };

    match outcome {
        PollOutcome::Success(result) => {
            println!("{} {}", "✓".green(), "Task succeeded".green());
            print_result(&result);
            Ok(())
        }
        PollOutcome::Failure(reason) => {
            println!("{} {}", "✗".red(), reason.red());
            anyhow::bail!("Task {} failed", handle)
        }
        PollOutcome::TimedOut => {
            println!(
                "{} {}",
                "⏱".yellow(),
                format!("Still pending after {} status checks", poller.attempts()).yellow()
            );
            anyhow::bail!("Timed out waiting for task {}", handle)
        }
        PollOutcome::TransportError(reason) => {
            println!("{} {}", "✗".magenta(), reason.magenta());
            anyhow::bail!("Lost contact with the backend while polling task {}", handle)
        }
        PollOutcome::Cancelled => {
            println!("{}", "Stopped waiting.".dimmed());
            anyhow::bail!("Polling of task {} was cancelled", handle)
        }
    }
}
