use std::path::PathBuf;
use std::sync::Arc;

use crate::age::TimeBucketer;
use crate::app::error::{NuztapError, Result};
use crate::config::Config;
use crate::feed::FeedView;
use crate::fetcher::process::DATABASE_ENV;
use crate::fetcher::{ExternalFetch, ProcessFetcher};
use crate::queue::{JobQueue, JobRegistry};
use crate::refresh::RefreshCoordinator;
use crate::store::SqliteStore;
use crate::worker::{FetchWorker, WorkerPool};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub db_path: Option<PathBuf>,
    pub registry: JobRegistry,
    pub bucketer: TimeBucketer,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match config.database_path.clone() {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::assemble(config, store, Some(db_path))
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::assemble(config, store, None)
    }

    fn assemble(config: Config, store: Arc<SqliteStore>, db_path: Option<PathBuf>) -> Result<Self> {
        let zone = config
            .display_zone()
            .map_err(|e| NuztapError::Config(e.to_string()))?;

        Ok(Self {
            config,
            store,
            db_path,
            registry: JobRegistry::new(),
            bucketer: TimeBucketer::new(zone),
        })
    }

    /// The configured fetch program, pointed at this context's database.
    pub fn process_fetcher(&self) -> Arc<dyn ExternalFetch + Send + Sync> {
        let mut fetcher = ProcessFetcher::new(
            self.config.fetch.program.clone(),
            self.config.fetch.args.clone(),
            self.store.clone(),
        );
        if let Some(path) = &self.db_path {
            fetcher = fetcher.with_env(DATABASE_ENV, path.to_string_lossy());
        }
        Arc::new(fetcher)
    }

    /// Wire a coordinator to a running worker pool. Dropping the coordinator
    /// closes the queue; the pool then drains and `join` returns.
    pub fn start_pipeline(
        &self,
        fetcher: Arc<dyn ExternalFetch + Send + Sync>,
    ) -> (RefreshCoordinator<SqliteStore>, WorkerPool) {
        let (queue, receiver) =
            JobQueue::channel(self.config.worker.queue_capacity, self.registry.clone());
        let worker = FetchWorker::new(fetcher, self.registry.clone());
        let pool = WorkerPool::spawn(worker, receiver, self.config.worker.workers);
        (RefreshCoordinator::new(self.store.clone(), queue), pool)
    }

    pub fn feed_view(&self) -> FeedView<SqliteStore> {
        FeedView::new(self.store.clone(), self.bucketer.clone())
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NuztapError::Config("Could not find data directory".into()))?;
        let nuztap_dir = data_dir.join("nuztap");
        std::fs::create_dir_all(&nuztap_dir)?;
        Ok(nuztap_dir.join("nuztap.db"))
    }
}
