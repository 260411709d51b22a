//! Screener CLI
//!
//! Command-line interface for triggering and following long-running jobs on
//! the screener backend.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use screener_client::PollerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "screener_cli=info,screener_client=info";

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "AI CV Screener job CLI", long_about = None)]
struct Cli {
    /// Backend URL
    #[arg(long, env = "SCREENER_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Delay between status checks, in milliseconds
    #[arg(long, env = "SCREENER_POLL_INTERVAL_MS", default_value_t = 1500)]
    poll_interval_ms: u64,

    /// Status checks before a pending job times out
    #[arg(long, env = "SCREENER_POLL_MAX_ATTEMPTS", default_value_t = 40)]
    max_attempts: u32,

    /// Consecutive failed status checks to tolerate
    #[arg(long, env = "SCREENER_POLL_FAILURE_TOLERANCE", default_value_t = 0)]
    failure_tolerance: u32,

    /// Per-request timeout, in seconds
    #[arg(long, env = "SCREENER_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        request_timeout: Duration::from_secs(cli.request_timeout_secs),
        poller: PollerConfig::default()
            .with_interval(Duration::from_millis(cli.poll_interval_ms))
            .with_max_attempts(cli.max_attempts)
            .with_failure_tolerance(cli.failure_tolerance),
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_parses() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        assert!(DEFAULT_LOG_FILTER.contains("screener_client=info"));
    }
}
