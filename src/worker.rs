//! Background execution of refresh jobs.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use crate::app::{NuztapError, Result};
use crate::domain::{JobState, RefreshJob};
use crate::fetcher::ExternalFetch;
use crate::queue::{JobReceiver, JobRegistry};

pub const DEFAULT_WORKERS: usize = 4;

/// Runs one job to completion: `Queued -> Running -> Done`.
pub struct FetchWorker {
    fetcher: Arc<dyn ExternalFetch + Send + Sync>,
    registry: JobRegistry,
}

impl FetchWorker {
    pub fn new(fetcher: Arc<dyn ExternalFetch + Send + Sync>, registry: JobRegistry) -> Self {
        Self { fetcher, registry }
    }

    /// The fetch outcome is logged and otherwise ignored: a failed fetch
    /// leaves the owner's feed empty or partial and the job still ends `Done`.
    pub async fn run(&self, job: RefreshJob) -> JobState {
        let id = job.id;
        self.registry.set(id, JobState::Running);
        info!(job = %id, owner = %job.owner, "Refresh job started");

        match self.fetcher.fetch(&job.owner, job.token(), job.secret()).await {
            Ok(report) => {
                info!(job = %id, owner = %job.owner, items = report.items_written, "Refresh job finished");
            }
            Err(e) => {
                warn!(job = %id, owner = %job.owner, "External fetch failed: {}", e);
            }
        }

        // The credential snapshot does not outlive the job.
        drop(job);
        self.registry.set(id, JobState::Done);
        JobState::Done
    }
}

/// Dispatcher that pulls jobs off the queue and runs up to `workers` of them
/// at once, each in its own task.
pub struct WorkerPool {
    handle: JoinHandle<()>,
}

impl WorkerPool {
    pub fn spawn(worker: FetchWorker, receiver: JobReceiver, workers: usize) -> Self {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let handle = tokio::spawn(dispatch(Arc::new(worker), receiver, semaphore));
        Self { handle }
    }

    /// Wait until the queue is closed and every dispatched job is done.
    pub async fn join(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| NuztapError::Other(format!("Worker pool failed: {}", e)))
    }
}

async fn dispatch(worker: Arc<FetchWorker>, mut receiver: JobReceiver, semaphore: Arc<Semaphore>) {
    let mut running = JoinSet::new();

    while let Some(job) = receiver.recv().await {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("Worker slots unavailable: {}", e);
                break;
            }
        };

        let worker = worker.clone();
        running.spawn(async move {
            let _permit = permit;
            worker.run(job).await
        });

        while let Some(finished) = running.try_join_next() {
            log_join(finished);
        }
    }

    while let Some(finished) = running.join_next().await {
        log_join(finished);
    }
    info!("Worker pool drained");
}

fn log_join(finished: std::result::Result<JobState, tokio::task::JoinError>) {
    if let Err(e) = finished {
        error!("Task join error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::fetcher::FetchReport;
    use crate::queue::JobQueue;

    #[derive(Default)]
    struct RecordingFetch {
        calls: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ExternalFetch for RecordingFetch {
        async fn fetch(&self, owner: &str, token: &str, secret: &str) -> Result<FetchReport> {
            self.calls
                .lock()
                .unwrap()
                .push((owner.into(), token.into(), secret.into()));
            if self.fail {
                return Err(NuztapError::FetchProcessFailure {
                    owner: owner.into(),
                    code: Some(1),
                });
            }
            Ok(FetchReport { items_written: 3 })
        }
    }

    /// Tracks the highest number of fetches running at the same time.
    #[derive(Default)]
    struct SlowFetch {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ExternalFetch for SlowFetch {
        async fn fetch(&self, _owner: &str, _token: &str, _secret: &str) -> Result<FetchReport> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(FetchReport::default())
        }
    }

    #[tokio::test]
    async fn test_run_passes_credentials_and_ends_done() {
        let fetch = Arc::new(RecordingFetch::default());
        let registry = JobRegistry::new();
        let (queue, mut rx) = JobQueue::channel(4, registry.clone());
        let id = queue.enqueue("42", "tok", "sec").unwrap();

        let worker = FetchWorker::new(fetch.clone(), registry.clone());
        let state = worker.run(rx.recv().await.unwrap()).await;

        assert_eq!(state, JobState::Done);
        assert_eq!(registry.state(id), Some(JobState::Done));
        assert_eq!(
            *fetch.calls.lock().unwrap(),
            vec![("42".to_string(), "tok".to_string(), "sec".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_still_ends_done() {
        let fetch = Arc::new(RecordingFetch {
            fail: true,
            ..Default::default()
        });
        let registry = JobRegistry::new();
        let (queue, mut rx) = JobQueue::channel(4, registry.clone());
        let id = queue.enqueue("42", "tok", "sec").unwrap();

        let state = FetchWorker::new(fetch, registry.clone())
            .run(rx.recv().await.unwrap())
            .await;

        assert_eq!(state, JobState::Done);
        assert_eq!(registry.state(id), Some(JobState::Done));
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_pool_runs_every_job_once() {
        let fetch = Arc::new(RecordingFetch::default());
        let registry = JobRegistry::new();
        let (queue, rx) = JobQueue::channel(16, registry.clone());
        let pool = WorkerPool::spawn(FetchWorker::new(fetch.clone(), registry.clone()), rx, 3);

        let ids: Vec<_> = (0..8)
            .map(|i| queue.enqueue(&format!("owner-{}", i), "tok", "sec").unwrap())
            .collect();
        drop(queue);
        pool.join().await.unwrap();

        assert_eq!(fetch.calls.lock().unwrap().len(), 8);
        for id in ids {
            assert_eq!(registry.state(id), Some(JobState::Done));
        }
    }

    #[tokio::test]
    async fn test_pool_limits_concurrency() {
        let fetch = Arc::new(SlowFetch::default());
        let registry = JobRegistry::new();
        let (queue, rx) = JobQueue::channel(16, registry.clone());
        let pool = WorkerPool::spawn(FetchWorker::new(fetch.clone(), registry), rx, 2);

        for i in 0..6 {
            queue.enqueue(&format!("owner-{}", i), "tok", "sec").unwrap();
        }
        drop(queue);
        pool.join().await.unwrap();

        assert!(fetch.peak.load(Ordering::SeqCst) <= 2);
        assert!(fetch.peak.load(Ordering::SeqCst) >= 1);
    }
}
