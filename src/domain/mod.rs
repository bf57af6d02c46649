pub mod feed_item;
pub mod job;

pub use feed_item::{FeedItem, NewFeedItem};
pub use job::{JobId, JobState, RefreshJob};
