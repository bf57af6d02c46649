pub mod process;

use async_trait::async_trait;

use crate::app::Result;

pub use process::ProcessFetcher;

/// What an external fetch reports once it has finished writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchReport {
    pub items_written: usize,
}

/// The capability that repopulates an owner's feed.
///
/// Implementations write into the shared store themselves; the worker only
/// logs the outcome.
#[async_trait]
pub trait ExternalFetch {
    async fn fetch(&self, owner: &str, token: &str, secret: &str) -> Result<FetchReport>;
}
