pub mod sqlite;

use crate::app::Result;
use crate::domain::{FeedItem, NewFeedItem};

pub use sqlite::SqliteStore;

/// Persisted, ranked feed items, partitioned by owner.
///
/// There is no transaction spanning a delete and the inserts that follow it;
/// readers may see an owner's feed empty, partial, or complete while a
/// refresh is in flight.
pub trait FeedItemStore {
    /// Items for `owner`, highest rank first, ties in insertion order.
    fn list_by_owner(&self, owner: &str) -> Result<Vec<FeedItem>>;
    fn delete_all_for_owner(&self, owner: &str) -> Result<usize>;
    fn insert(&self, item: &NewFeedItem) -> Result<i64>;
    fn insert_many(&self, items: &[NewFeedItem]) -> Result<usize>;
    fn count_by_owner(&self, owner: &str) -> Result<usize>;
}
