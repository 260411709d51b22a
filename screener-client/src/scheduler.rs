//! Timer seam for the poller
//!
//! The poller never sleeps directly; it asks a [`Scheduler`]. Production
//! code uses the tokio timer, tests inject a scheduler that returns at once
//! and records the delays it was asked for.

use async_trait::async_trait;
use std::time::Duration;

/// Source of the delay between status checks
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Suspend the caller for `duration` without blocking the runtime
    ///
    /// Dropping the returned future must release the underlying timer.
    async fn sleep(&self, duration: Duration);
}

/// Scheduler backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
