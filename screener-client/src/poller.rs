//! Task poller
//!
//! Polls the status endpoint for one task on a fixed interval until the task
//! reaches a terminal state, the attempt budget runs out, a transport error
//! exceeds the configured tolerance, or the poller is cancelled.
//!
//! A poller resolves exactly once. After that it makes no further requests
//! and every query returns the same outcome.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use screener_core::domain::task::{TaskHandle, TaskStatus};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollerConfig;
use crate::scheduler::Scheduler;
use crate::tasks;
use crate::transport::Transport;

/// Final answer of a poll cycle
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Success(serde_json::Value),
    Failure(String),
    TimedOut,
    TransportError(String),
    Cancelled,
}

/// Lifecycle of a poller
#[derive(Debug, Clone, PartialEq)]
pub enum PollerState {
    Created,
    Polling,
    Resolved(PollOutcome),
}

/// Fixed-interval status poller for a single task
pub struct TaskPoller {
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    config: PollerConfig,
    state: Mutex<PollerState>,
    attempts: AtomicU32,
    cancel: CancellationToken,
    resolved: Notify,
}

impl TaskPoller {
    /// Creates a new poller in the `Created` state
    pub fn new(
        transport: Arc<dyn Transport>,
        scheduler: Arc<dyn Scheduler>,
        config: PollerConfig,
    ) -> Self {
        Self {
            transport,
            scheduler,
            config,
            state: Mutex::new(PollerState::Created),
            attempts: AtomicU32::new(0),
            cancel: CancellationToken::new(),
            resolved: Notify::new(),
        }
    }

    pub fn state(&self) -> PollerState {
        self.lock_state().clone()
    }

    /// Outcome, once resolved
    pub fn outcome(&self) -> Option<PollOutcome> {
        match &*self.lock_state() {
            PollerState::Resolved(outcome) => Some(outcome.clone()),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome().is_some()
    }

    /// Status checks started so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Poll `handle` until the cycle resolves
    ///
    /// The first check happens immediately. On a resolved poller this returns
    /// the stored outcome without touching the network; a second caller
    /// during an active cycle waits for that cycle's outcome.
    pub async fn poll(&self, handle: &TaskHandle) -> PollOutcome {
        let notified = self.resolved.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        let start = {
            let mut state = self.lock_state();
            if let PollerState::Resolved(outcome) = &*state {
                return outcome.clone();
            }
            let start = *state == PollerState::Created;
            if start {
                *state = PollerState::Polling;
            }
            start
        };

        if !start {
            notified.await;
            return self.outcome().unwrap_or(PollOutcome::Cancelled);
        }

        info!(
            "Polling task {} (interval: {:?}, max attempts: {})",
            handle, self.config.interval, self.config.max_attempts
        );

        // Cancellation drops the pending timer or in-flight request
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => PollOutcome::Cancelled,
            outcome = self.run(handle) => outcome,
        };

        let outcome = self.resolve(outcome);
        info!(
            "Task {} resolved after {} attempt(s): {:?}",
            handle,
            self.attempts(),
            outcome
        );
        outcome
    }

    /// Stop polling
    ///
    /// Resolves an unresolved poller to `Cancelled` at once. Ignored after
    /// resolution.
    pub fn cancel(&self) {
        {
            let mut state = self.lock_state();
            if matches!(*state, PollerState::Resolved(_)) {
                return;
            }
            *state = PollerState::Resolved(PollOutcome::Cancelled);
        }

        debug!("Poller cancelled after {} attempt(s)", self.attempts());
        self.cancel.cancel();
        self.resolved.notify_waiters();
    }

    async fn run(&self, handle: &TaskHandle) -> PollOutcome {
        let mut consecutive_failures = 0;

        loop {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(
                "Checking status of task {} (attempt {}/{})",
                handle, attempt, self.config.max_attempts
            );

            match tasks::fetch_status(self.transport.as_ref(), handle).await {
                Ok(TaskStatus::Succeeded(result)) => return PollOutcome::Success(result),
                Ok(TaskStatus::Failed(reason)) => return PollOutcome::Failure(reason),
                Ok(TaskStatus::Pending { state }) => {
                    consecutive_failures = 0;
                    if attempt >= self.config.max_attempts {
                        warn!(
                            "Task {} still {} after {} attempt(s), giving up",
                            handle, state, attempt
                        );
                        return PollOutcome::TimedOut;
                    }
                    debug!("Task {} is {}", handle, state);
                }
                Err(e) => {
                    consecutive_failures += 1;
                    if consecutive_failures > self.config.failure_tolerance
                        || attempt >= self.config.max_attempts
                    {
                        warn!("Status check for task {} failed: {}", handle, e);
                        return PollOutcome::TransportError(e.to_string());
                    }
                    warn!(
                        "Status check for task {} failed ({}/{} tolerated): {}",
                        handle, consecutive_failures, self.config.failure_tolerance, e
                    );
                }
            }

            self.scheduler.sleep(self.config.interval).await;
        }
    }

    /// Store `outcome` unless something else resolved the poller first
    fn resolve(&self, outcome: PollOutcome) -> PollOutcome {
        let resolved = {
            let mut state = self.lock_state();
            if let PollerState::Resolved(existing) = &*state {
                existing.clone()
            } else {
                *state = PollerState::Resolved(outcome.clone());
                outcome
            }
        };
        self.resolved.notify_waiters();
        resolved
    }

    fn lock_state(&self) -> MutexGuard<'_, PollerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
