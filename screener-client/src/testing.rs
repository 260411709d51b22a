//! Test doubles for the transport and scheduler seams

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

use crate::error::{Result, TransportError};
use crate::scheduler::Scheduler;
use crate::transport::Transport;

/// Canned answer for one request
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Api { status: u16, message: String },
    Malformed(String),
    /// Answer with the value once `release()` is called
    Held(Value),
}

/// Transport that answers from per-path scripts and records every call
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    repeated: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    called: Notify,
    gate: Notify,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot reply for a path
    pub fn push(&self, path: &str, reply: Reply) -> &Self {
        self.queued
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Reply used for a path once its queue is empty
    pub fn repeat(&self, path: &str, reply: Reply) -> &Self {
        self.repeated
            .lock()
            .unwrap()
            .insert(path.to_string(), reply);
        self
    }

    /// Let one held reply through
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Every call so far, as "METHOD /path"
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.ends_with(&format!(" {}", path)))
            .count()
    }

    /// Wait until at least `n` calls have been made
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.called.notified();
            if self.calls.lock().unwrap().len() >= n {
                return;
            }
            notified.await;
        }
    }

    fn next_reply(&self, path: &str) -> Option<Reply> {
        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front);
        queued.or_else(|| self.repeated.lock().unwrap().get(path).cloned())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, method: Method, path: &str, _body: Option<&Value>) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", method, path));
        self.called.notify_waiters();

        match self.next_reply(path) {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Api { status, message }) => Err(TransportError::api_error(status, message)),
            Some(Reply::Malformed(reason)) => Err(TransportError::MalformedResponse(reason)),
            Some(Reply::Held(value)) => {
                self.gate.notified().await;
                Ok(value)
            }
            None => Err(TransportError::api_error(404, "Not Found")),
        }
    }
}

/// Scheduler that records requested delays and returns at once
#[derive(Default)]
pub(crate) struct InstantScheduler {
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantScheduler {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scheduler for InstantScheduler {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Scheduler whose sleeps never finish on their own
#[derive(Default)]
pub(crate) struct StalledScheduler;

#[async_trait]
impl Scheduler for StalledScheduler {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await
    }
}

pub(crate) fn pending(task_id: &str) -> Reply {
    Reply::Json(serde_json::json!({ "task_id": task_id, "status": "PENDING" }))
}

/// Submission endpoints answer with the same shape as a pending status
pub(crate) fn submitted(task_id: &str) -> Reply {
    pending(task_id)
}
