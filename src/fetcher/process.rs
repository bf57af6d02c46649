use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::app::{NuztapError, Result};
use crate::fetcher::{ExternalFetch, FetchReport};
use crate::store::FeedItemStore;

/// Environment variable through which the child learns where the store lives.
pub const DATABASE_ENV: &str = "NUZTAP_DB";

/// Runs the external fetch program as a child process:
/// `program [args...] <owner> <token> <secret>`.
///
/// The child writes into the store on its own. Its stdout and stderr are
/// discarded and no timeout is applied.
pub struct ProcessFetcher<S> {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    store: Arc<S>,
}

impl<S: FeedItemStore> ProcessFetcher<S> {
    pub fn new(program: impl Into<String>, args: Vec<String>, store: Arc<S>) -> Self {
        Self {
            program: program.into(),
            args,
            envs: Vec::new(),
            store,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl<S: FeedItemStore + Send + Sync> ExternalFetch for ProcessFetcher<S> {
    async fn fetch(&self, owner: &str, token: &str, secret: &str) -> Result<FetchReport> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(owner)
            .arg(token)
            .arg(secret)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Err(NuztapError::FetchProcessFailure {
                owner: owner.to_string(),
                code: status.code(),
            });
        }

        let items_written = self.store.count_by_owner(owner)?;
        Ok(FetchReport { items_written })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::domain::NewFeedItem;
    use crate::store::SqliteStore;

    fn sh(script: &str, store: Arc<SqliteStore>) -> ProcessFetcher<SqliteStore> {
        // `sh -c script name arg1 arg2`: owner, token, secret become $1..$3
        ProcessFetcher::new("sh", vec!["-c".into(), script.into(), "fetch".into()], store)
    }

    #[tokio::test]
    async fn test_successful_exit_reports_owner_rows() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .insert(&NewFeedItem::new("42", "already there", "https://example.com", "x"))
            .unwrap();

        let report = sh("exit 0", store).fetch("42", "tok", "sec").await.unwrap();
        assert_eq!(report.items_written, 1);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_process_failure() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        match sh("exit 3", store).fetch("42", "tok", "sec").await {
            Err(NuztapError::FetchProcessFailure { owner, code }) => {
                assert_eq!(owner, "42");
                assert_eq!(code, Some(3));
            }
            other => panic!("expected FetchProcessFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_positional_arguments_in_order() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let fetcher = sh(
            r#"[ "$1" = "42" ] && [ "$2" = "tok" ] && [ "$3" = "sec" ] && [ "$#" -eq 3 ]"#,
            store,
        );
        assert!(fetcher.fetch("42", "tok", "sec").await.is_ok());
        assert!(fetcher.fetch("42", "sec", "tok").await.is_err());
    }

    #[tokio::test]
    async fn test_env_is_passed_to_child() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let fetcher = sh(r#"[ "$NUZTAP_DB" = "/tmp/feed.db" ]"#, store).with_env(DATABASE_ENV, "/tmp/feed.db");
        assert!(fetcher.fetch("42", "tok", "sec").await.is_ok());
    }

    #[tokio::test]
    async fn test_child_output_is_discarded() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let fetcher = sh(
            r#"i=0; while [ $i -lt 2000 ]; do echo "out $i"; echo "err $i" >&2; i=$((i+1)); done"#,
            store,
        );
        let report = fetcher.fetch("42", "tok", "sec").await.unwrap();
        assert_eq!(report.items_written, 0);
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let fetcher = ProcessFetcher::new("/nonexistent/nuztap-fetch", Vec::new(), store);
        assert!(matches!(
            fetcher.fetch("42", "tok", "sec").await,
            Err(NuztapError::Io(_))
        ));
    }
}
