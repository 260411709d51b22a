//! Job command handlers
//!
//! Handles listing the available job kinds and running a job to
//! completion.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use screener_client::{JobController, JobError, JobEvent};
use screener_core::domain::job::{JobKind, JobSpec};
use tracing::info;

use super::print_result;
use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List available job kinds
    Kinds,
    /// Submit a job and wait for its result (Ctrl-C cancels)
    Run {
        /// Job kind, e.g. generate-cv
        kind: String,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    match command {
        JobCommands::Kinds => {
            list_kinds();
            Ok(())
        }
        JobCommands::Run { kind } => run_job(config, JobKind::new(kind)).await,
    }
}

/// List the built-in job kinds
fn list_kinds() {
    let specs = JobSpec::builtin();

    println!("{}", format!("{} job kind(s):", specs.len()).bold());
    println!();
    for spec in specs {
        println!("  {} {}", "▸".cyan(), spec.kind.to_string().bold());
        println!("    Endpoint: {}", format!("POST {}", spec.submit_path).dimmed());
        println!("    {}", spec.description);
        println!();
    }
}

/// Submit a job and follow it to its terminal event
async fn run_job(config: &Config, kind: JobKind) -> Result<()> {
    let client = config.client()?;
    let controller = Arc::new(JobController::new(
        client,
        JobSpec::builtin(),
        config.poller.clone(),
    ));

    let ticket = controller
        .submit(&kind)
        .with_context(|| format!("Failed to submit '{}' job", kind))?;

    info!("Submission {} accepted", ticket.submission_id());
    println!(
        "{} Submitted {} job, waiting up to {}s...",
        "▸".cyan(),
        kind.to_string().bold(),
        config.poller.max_wait().as_secs()
    );

    let wait = ticket.wait();
    tokio::pin!(wait);

    let event = tokio::select! {
        event = &mut wait => event,
        _ = tokio::signal::ctrl_c() => {
            println!("{}", "Cancelling...".yellow());
            controller.cancel(&kind);
            wait.await
        }
    };

    let Some(event) = event else {
        anyhow::bail!("'{}' job ended without a result", kind);
    };

    print_event(&event);

    match event.result {
        Ok(_) => Ok(()),
        Err(e) => Err(e).with_context(|| format!("'{}' job did not succeed", kind)),
    }
}

/// Print the terminal event of a job
fn print_event(event: &JobEvent) {
    let elapsed = event
        .finished_at
        .signed_duration_since(event.started_at)
        .num_seconds();
    let task = event
        .task
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!();
    println!("{}", "Job Details:".bold());
    println!("  Kind:       {}", event.kind.to_string().cyan());
    println!("  Submission: {}", event.submission_id.to_string().dimmed());
    println!("  Task:       {}", task.dimmed());
    println!("  Duration:   {}s", elapsed);

    match &event.result {
        Ok(result) => {
            println!("  Status:     {}", "Succeeded".green());
            print_result(result);
        }
        Err(e) => println!("  Status:     {}", colorize_error(e)),
    }
}

/// Colorize a job error; each terminal state reads differently
fn colorize_error(error: &JobError) -> ColoredString {
    let text = error.to_string();
    match error {
        JobError::Remote(_) => text.red(),
        JobError::Timeout { .. } => text.yellow(),
        JobError::Transport(_) => text.magenta(),
        JobError::Cancelled => text.dimmed(),
        JobError::AlreadyInFlight(_) | JobError::UnknownKind(_) => text.yellow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Escape sequence `colorize_error` puts in front of the message
    fn style_of(error: &JobError) -> String {
        colored::control::set_override(true);
        let rendered = colorize_error(error).to_string();
        let text = error.to_string();
        rendered
            .split(text.as_str())
            .next()
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_terminal_errors_are_styled_distinctly() {
        let styles = [
            style_of(&JobError::Remote("no photos".to_string())),
            style_of(&JobError::Timeout { attempts: 40 }),
            style_of(&JobError::Transport("connection refused".to_string())),
            style_of(&JobError::Cancelled),
        ];

        for (i, style) in styles.iter().enumerate() {
            assert!(!style.is_empty(), "error {} is not styled", i);
            for other in &styles[i + 1..] {
                assert_ne!(style, other);
            }
        }
    }

    #[test]
    fn test_colorize_error_keeps_message() {
        let error = JobError::Remote("no photos".to_string());
        colored::control::set_override(true);
        assert!(colorize_error(&error).to_string().contains("no photos"));
    }
}
