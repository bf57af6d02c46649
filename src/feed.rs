use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::age::TimeBucketer;
use crate::app::Result;
use crate::domain::FeedItem;
use crate::store::FeedItemStore;

/// An item paired with its human-relative age.
#[derive(Debug, Clone)]
pub struct DisplayItem {
    pub item: FeedItem,
    pub age: String,
}

/// Read path: ranked items for the current owner, ready for display.
pub struct FeedView<S> {
    store: Arc<S>,
    bucketer: TimeBucketer,
}

impl<S: FeedItemStore> FeedView<S> {
    pub fn new(store: Arc<S>, bucketer: TimeBucketer) -> Self {
        Self { store, bucketer }
    }

    /// Nobody signed in means an empty feed, not an error.
    pub fn render(&self, owner: Option<&str>, now: DateTime<Utc>) -> Result<Vec<DisplayItem>> {
        let Some(owner) = owner else {
            return Ok(Vec::new());
        };

        self.store
            .list_by_owner(owner)?
            .into_iter()
            .map(|item| {
                let age = self.bucketer.classify(now, &item.source_created_at)?;
                Ok(DisplayItem { item, age })
            })
            .collect()
    }
}
