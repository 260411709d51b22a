//! Job controller
//!
//! Owns one slot per registered job kind and drives each accepted
//! submission through submit → poll → terminal event. A kind whose slot is
//! busy rejects new submissions locally, before any request is sent.
//!
//! Each accepted submission runs in its own tokio task, so kinds progress
//! independently of each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use screener_core::domain::job::{JobKind, JobSpec};
use screener_core::domain::task::TaskHandle;
use serde_json::Value;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PollerConfig;
use crate::error::JobError;
use crate::poller::{PollOutcome, TaskPoller};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::tasks;
use crate::transport::Transport;

/// Per-kind submission state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSlot {
    Idle,
    /// Submission accepted, waiting for the backend to return a task handle
    Submitting,
    InFlight(TaskHandle),
}

impl JobSlot {
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, JobSlot::Idle)
    }
}

/// Terminal event of one accepted submission
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub submission_id: Uuid,
    pub kind: JobKind,
    /// Backend task, if the submission got that far
    pub task: Option<TaskHandle>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub result: Result<Value, JobError>,
}

/// Receipt for an accepted submission
#[derive(Debug)]
pub struct JobTicket {
    submission_id: Uuid,
    kind: JobKind,
    receiver: oneshot::Receiver<JobEvent>,
}

impl JobTicket {
    pub fn submission_id(&self) -> Uuid {
        self.submission_id
    }

    pub fn kind(&self) -> &JobKind {
        &self.kind
    }

    /// Wait for the terminal event
    ///
    /// Returns `None` when the cycle was cancelled by `shutdown()` rather
    /// than by an explicit `cancel()`.
    pub async fn wait(self) -> Option<JobEvent> {
        self.receiver.await.ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CancelReason {
    /// Caller asked for it; reported as `JobError::Cancelled`
    Requested,
    /// Controller is shutting down; no event
    Shutdown,
}

impl CancelReason {
    fn into_result(self) -> Option<Result<Value, JobError>> {
        match self {
            CancelReason::Requested => Some(Err(JobError::Cancelled)),
            CancelReason::Shutdown => None,
        }
    }
}

struct SlotEntry {
    spec: JobSpec,
    slot: JobSlot,
    poller: Option<Arc<TaskPoller>>,
    cancel: Option<CancelReason>,
}

impl SlotEntry {
    fn new(spec: JobSpec) -> Self {
        Self {
            spec,
            slot: JobSlot::Idle,
            poller: None,
            cancel: None,
        }
    }

    fn reset(&mut self) {
        self.slot = JobSlot::Idle;
        self.poller = None;
        self.cancel = None;
    }
}

/// Submits jobs and reports their terminal result, one cycle per kind
pub struct JobController {
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    config: PollerConfig,
    slots: Mutex<HashMap<JobKind, SlotEntry>>,
    events: broadcast::Sender<JobEvent>,
}

impl JobController {
    /// Creates a controller that sleeps on the tokio timer
    pub fn new(transport: Arc<dyn Transport>, specs: Vec<JobSpec>, config: PollerConfig) -> Self {
        Self::with_scheduler(transport, Arc::new(TokioScheduler), specs, config)
    }

    /// Creates a controller with a custom scheduler
    ///
    /// One idle slot is created per spec; later specs with the same kind
    /// replace earlier ones.
    pub fn with_scheduler(
        transport: Arc<dyn Transport>,
        scheduler: Arc<dyn Scheduler>,
        specs: Vec<JobSpec>,
        config: PollerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        let slots = specs
            .into_iter()
            .map(|spec| (spec.kind.clone(), SlotEntry::new(spec)))
            .collect();

        Self {
            transport,
            scheduler,
            config,
            slots: Mutex::new(slots),
            events,
        }
    }

    /// Registered job kinds, ordered by name
    pub fn specs(&self) -> Vec<JobSpec> {
        let mut specs: Vec<JobSpec> = self
            .lock_slots()
            .values()
            .map(|entry| entry.spec.clone())
            .collect();
        specs.sort_by(|a, b| a.kind.as_str().cmp(b.kind.as_str()));
        specs
    }

    /// Current slot of a kind, or `None` if the kind is not registered
    pub fn slot(&self, kind: &JobKind) -> Option<JobSlot> {
        self.lock_slots().get(kind).map(|entry| entry.slot.clone())
    }

    /// Whether a cycle of this kind is running
    ///
    /// Advisory only: `submit()` performs the authoritative check.
    pub fn is_in_flight(&self, kind: &JobKind) -> bool {
        self.slot(kind).is_some_and(|slot| slot.is_in_flight())
    }

    /// Subscribe to the terminal events of every kind
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Submit a job of `kind`
    ///
    /// Returns at once. The submission request and the status polling run
    /// on a spawned task; the ticket yields the terminal event. Must be
    /// called from within a tokio runtime.
    pub fn submit(self: &Arc<Self>, kind: &JobKind) -> Result<JobTicket, JobError> {
        let spec = {
            let mut slots = self.lock_slots();
            let entry = slots
                .get_mut(kind)
                .ok_or_else(|| JobError::UnknownKind(kind.to_string()))?;

            if entry.slot.is_in_flight() {
                warn!("Rejected '{}' submission: already in progress", kind);
                return Err(JobError::AlreadyInFlight(kind.clone()));
            }

            entry.reset();
            entry.slot = JobSlot::Submitting;
            entry.spec.clone()
        };

        let submission_id = Uuid::new_v4();
        let (sender, receiver) = oneshot::channel();

        info!("Accepted '{}' submission {}", kind, submission_id);

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.drive(submission_id, spec, sender).await;
        });

        Ok(JobTicket {
            submission_id,
            kind: kind.clone(),
            receiver,
        })
    }

    /// Cancel the running cycle of `kind`
    ///
    /// The ticket then yields `JobError::Cancelled`. Returns `false` when
    /// nothing of this kind is running.
    pub fn cancel(&self, kind: &JobKind) -> bool {
        let poller = {
            let mut slots = self.lock_slots();
            let Some(entry) = slots.get_mut(kind) else {
                return false;
            };
            if !entry.slot.is_in_flight() {
                return false;
            }
            if entry.cancel.is_none() {
                entry.cancel = Some(CancelReason::Requested);
            }
            entry.poller.clone()
        };

        info!("Cancelling '{}' job", kind);
        if let Some(poller) = poller {
            poller.cancel();
        }
        true
    }

    /// Cancel every running cycle without emitting events
    pub fn shutdown(&self) {
        let pollers: Vec<Arc<TaskPoller>> = {
            let mut slots = self.lock_slots();
            slots
                .values_mut()
                .filter(|entry| entry.slot.is_in_flight())
                .filter_map(|entry| {
                    if entry.cancel.is_none() {
                        entry.cancel = Some(CancelReason::Shutdown);
                    }
                    entry.poller.clone()
                })
                .collect()
        };

        info!("Shutting down job controller ({} active poller(s))", pollers.len());
        for poller in pollers {
            poller.cancel();
        }
    }

    async fn drive(
        self: Arc<Self>,
        submission_id: Uuid,
        spec: JobSpec,
        sender: oneshot::Sender<JobEvent>,
    ) {
        let started_at = Utc::now();
        let (task, result) = self.run_cycle(&spec).await;

        // Free the slot before reporting so observers can resubmit at once
        if let Some(entry) = self.lock_slots().get_mut(&spec.kind) {
            entry.reset();
        }

        let Some(result) = result else {
            info!("'{}' submission {} cancelled by shutdown", spec.kind, submission_id);
            return;
        };

        match &result {
            Ok(_) => info!("'{}' submission {} succeeded", spec.kind, submission_id),
            Err(e) => warn!("'{}' submission {} failed: {}", spec.kind, submission_id, e),
        }

        let event = JobEvent {
            submission_id,
            kind: spec.kind,
            task,
            started_at,
            finished_at: Utc::now(),
            result,
        };

        // Nobody listening is fine
        let _ = self.events.send(event.clone());
        let _ = sender.send(event);
    }

    /// Submit, then poll. `None` means the cycle ends without an event.
    async fn run_cycle(
        &self,
        spec: &JobSpec,
    ) -> (Option<TaskHandle>, Option<Result<Value, JobError>>) {
        let handle = match tasks::submit_job(self.transport.as_ref(), spec).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Submission of '{}' failed: {}", spec.kind, e);
                return (None, Some(Err(JobError::Transport(e.to_string()))));
            }
        };

        debug!("'{}' started task {}", spec.kind, handle);

        let poller = Arc::new(TaskPoller::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.scheduler),
            self.config.clone(),
        ));

        let early_cancel = {
            let mut slots = self.lock_slots();
            match slots.get_mut(&spec.kind) {
                Some(entry) => {
                    entry.slot = JobSlot::InFlight(handle.clone());
                    entry.poller = Some(Arc::clone(&poller));
                    entry.cancel
                }
                None => None,
            }
        };

        // Cancelled while the submission was in flight
        if let Some(reason) = early_cancel {
            return (Some(handle), reason.into_result());
        }

        let result = match poller.poll(&handle).await {
            PollOutcome::Success(value) => Some(Ok(value)),
            PollOutcome::Failure(reason) => Some(Err(JobError::Remote(reason))),
            PollOutcome::TimedOut => Some(Err(JobError::Timeout {
                attempts: poller.attempts(),
            })),
            PollOutcome::TransportError(reason) => Some(Err(JobError::Transport(reason))),
            PollOutcome::Cancelled => self
                .lock_slots()
                .get(&spec.kind)
                .and_then(|entry| entry.cancel)
                .and_then(CancelReason::into_result),
        };

        (Some(handle), result)
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<JobKind, SlotEntry>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
