use std::sync::Arc;

use tracing::info;

use crate::app::Result;
use crate::domain::JobId;
use crate::queue::JobQueue;
use crate::store::FeedItemStore;

/// Starts a refresh cycle: clears the owner's feed, then schedules one fetch.
pub struct RefreshCoordinator<S> {
    store: Arc<S>,
    queue: JobQueue,
}

impl<S: FeedItemStore> RefreshCoordinator<S> {
    pub fn new(store: Arc<S>, queue: JobQueue) -> Self {
        Self { store, queue }
    }

    /// Deletes synchronously, then enqueues and returns without waiting for
    /// the job. Until the job completes the owner's feed is empty or partial.
    ///
    /// Calls for the same owner are not serialized; two overlapping refreshes
    /// produce two jobs and the feed ends up with whatever both wrote.
    pub fn refresh(&self, owner: &str, token: &str, secret: &str) -> Result<JobId> {
        let deleted = self.store.delete_all_for_owner(owner)?;
        let job = self.queue.enqueue(owner, token, secret)?;
        info!(owner, job = %job, deleted, "Refresh scheduled");
        Ok(job)
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NuztapError;
    use crate::domain::{JobState, NewFeedItem};
    use crate::queue::JobRegistry;
    use crate::store::SqliteStore;

    fn seeded_store() -> Arc<SqliteStore> {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        for i in 0..3 {
            store
                .insert(&NewFeedItem::new("42", &format!("old {}", i), "https://example.com", "x"))
                .unwrap();
        }
        store
            .insert(&NewFeedItem::new("7", "other owner", "https://example.com", "x"))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_refresh_clears_then_enqueues() {
        let store = seeded_store();
        let registry = JobRegistry::new();
        let (queue, mut rx) = JobQueue::channel(4, registry.clone());
        let coordinator = RefreshCoordinator::new(store.clone(), queue);

        let id = coordinator.refresh("42", "tok", "sec").unwrap();

        assert!(store.list_by_owner("42").unwrap().is_empty());
        assert_eq!(store.count_by_owner("7").unwrap(), 1);
        assert_eq!(registry.state(id), Some(JobState::Queued));

        let job = rx.recv().await.unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.owner, "42");
        assert_eq!(job.token(), "tok");
        assert_eq!(job.secret(), "sec");
    }

    #[test]
    fn test_rapid_refreshes_create_independent_jobs() {
        let store = seeded_store();
        let (queue, _rx) = JobQueue::channel(4, JobRegistry::new());
        let coordinator = RefreshCoordinator::new(store, queue);

        let first = coordinator.refresh("42", "tok", "sec").unwrap();
        let second = coordinator.refresh("42", "tok", "sec").unwrap();
        assert_ne!(first, second);
        assert_eq!(coordinator.queue().registry().in_flight(), 2);
    }

    #[test]
    fn test_enqueue_failure_after_delete() {
        let store = seeded_store();
        let (queue, mut rx) = JobQueue::channel(4, JobRegistry::new());
        rx.close();
        let coordinator = RefreshCoordinator::new(store.clone(), queue);

        assert!(matches!(
            coordinator.refresh("42", "tok", "sec"),
            Err(NuztapError::EnqueueFailure(_))
        ));
        assert_eq!(store.count_by_owner("42").unwrap(), 0);
    }
}
