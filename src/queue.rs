//! In-memory FIFO of refresh jobs shared by the coordinator and the worker pool.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::app::{NuztapError, Result};
use crate::domain::{JobId, JobState, RefreshJob};

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Lifecycle of every job issued by a queue.
///
/// Only queued and running jobs are kept; an issued id that is no longer
/// tracked is `Done`.
#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    last_id: u64,
    states: HashMap<JobId, JobState>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // State updates are single assignments, so a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue the next id to `send`. The id is only committed if `send`
    /// succeeds, so a rejected job never shows up as `Done`.
    fn admit<F>(&self, send: F) -> Result<JobId>
    where
        F: FnOnce(JobId) -> Result<()>,
    {
        let mut inner = self.lock();
        let id = JobId(inner.last_id + 1);
        send(id)?;
        inner.last_id = id.0;
        inner.states.insert(id, JobState::Queued);
        Ok(id)
    }

    pub(crate) fn set(&self, id: JobId, state: JobState) {
        let mut inner = self.lock();
        match state {
            JobState::Done => {
                inner.states.remove(&id);
            }
            _ => {
                inner.states.insert(id, state);
            }
        }
    }

    pub fn state(&self, id: JobId) -> Option<JobState> {
        let inner = self.lock();
        match inner.states.get(&id) {
            Some(state) => Some(*state),
            None if id.0 >= 1 && id.0 <= inner.last_id => Some(JobState::Done),
            None => None,
        }
    }

    /// Jobs that are queued or running.
    pub fn in_flight(&self) -> usize {
        self.lock().states.len()
    }
}

/// Producer side of the queue. Cloning shares the same channel.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<RefreshJob>,
    registry: JobRegistry,
}

/// Consumer side of the queue, owned by the worker pool dispatcher.
pub struct JobReceiver {
    rx: mpsc::Receiver<RefreshJob>,
}

impl JobQueue {
    pub fn channel(capacity: usize, registry: JobRegistry) -> (JobQueue, JobReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (JobQueue { tx, registry }, JobReceiver { rx })
    }

    /// Enqueue without waiting. A full or closed queue is an `EnqueueFailure`.
    pub fn enqueue(&self, owner: &str, token: &str, secret: &str) -> Result<JobId> {
        // try_send never blocks, so holding the registry lock across it is fine.
        self.registry.admit(|id| {
            let job = RefreshJob::new(id, owner, token, secret);
            self.tx.try_send(job).map_err(|e| {
                let reason = match e {
                    TrySendError::Full(_) => "queue is full",
                    TrySendError::Closed(_) => "queue is closed",
                };
                NuztapError::EnqueueFailure(reason.to_string())
            })
        })
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }
}

impl JobReceiver {
    /// Next job, or `None` once every `JobQueue` handle is dropped and the
    /// backlog is drained.
    pub async fn recv(&mut self) -> Option<RefreshJob> {
        self.rx.recv().await
    }

    pub fn close(&mut self) {
        self.rx.close();
    }
}
