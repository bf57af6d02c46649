//! # nuztap
//!
//! Refresh pipeline for a ranked, per-owner news feed.
//!
//! ## Architecture
//!
//! ```text
//! login → RefreshCoordinator → JobQueue → WorkerPool → external fetch → Store → FeedView
//! ```
//!
//! A signed-in owner's feed is cleared synchronously, then a refresh job is
//! queued. A worker later runs the external fetch program, which writes new
//! items straight into the shared store. Readers list the owner's items by
//! rank and label each with a human-relative age.
//!
//! ## Quick Start
//!
//! ```bash
//! # Refetch an owner's feed (waits for the fetch to finish)
//! nuztap refresh 12345 <token> <secret>
//!
//! # Show it
//! nuztap show 12345
//!
//! # What the fetch program pipes its records into
//! fetch-program | nuztap ingest 12345
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// queue, worker pool and read path.
pub mod app;

/// Human-relative age labels.
pub mod age;

/// Command-line interface using clap.
///
/// - `refresh <owner> <token> <secret>` - Clear and refetch a feed
/// - `show <owner>` - Ranked listing with ages
/// - `ingest <owner>` - Insert JSON records from stdin
/// - `clear <owner>` - Delete an owner's items
pub mod cli;

/// Configuration file handling.
pub mod config;

/// Core domain models.
///
/// - [`FeedItem`](domain::FeedItem): A persisted, ranked item
/// - [`RefreshJob`](domain::RefreshJob): Credential snapshot for one refresh
/// - [`JobState`](domain::JobState): `Queued`, `Running`, `Done`
pub mod domain;

/// Read path for display.
pub mod feed;

/// The external fetch boundary.
///
/// - [`ExternalFetch`](fetcher::ExternalFetch): Async capability trait
/// - [`ProcessFetcher`](fetcher::ProcessFetcher): Child-process implementation
pub mod fetcher;

pub mod ingest;

/// Bounded in-memory job queue and job lifecycle registry.
pub mod queue;

pub mod refresh;

/// SQLite persistence layer.
///
/// - [`FeedItemStore`](store::FeedItemStore): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Fetch workers and the pool that dispatches them.
pub mod worker;
