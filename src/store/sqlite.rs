use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, Transaction};
use rusqlite_migration::{Migrations, M};

use crate::app::{NuztapError, Result};
use crate::domain::{FeedItem, NewFeedItem};
use crate::store::FeedItemStore;

const INSERT_ITEM: &str = "INSERT INTO feed_items
    (owner, title, favorite_count, source_created_at, url, summary, source_image_url, hostname, rank, inserted_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

// The external fetch may hold the write lock while we delete or read.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| NuztapError::Other(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| NuztapError::Other(format!("Store lock poisoned: {}", e)))
    }

    fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<FeedItem> {
        Ok(FeedItem {
            id: row.get(0)?,
            owner: row.get(1)?,
            title: row.get(2)?,
            favorite_count: row.get(3)?,
            source_created_at: row.get(4)?,
            url: row.get(5)?,
            summary: row.get(6)?,
            source_image_url: row.get(7)?,
            hostname: row.get(8)?,
            rank: row.get(9)?,
            inserted_at: Self::parse_datetime(10, &row.get::<_, String>(10)?)?,
        })
    }

    fn insert_in(tx: &Transaction<'_>, item: &NewFeedItem, inserted_at: &str) -> Result<usize> {
        let inserted = tx.execute(
            INSERT_ITEM,
            params![
                item.owner,
                item.title,
                item.favorite_count,
                item.source_created_at,
                item.url,
                item.summary,
                item.source_image_url,
                item.hostname,
                item.rank,
                inserted_at
            ],
        )?;
        Ok(inserted)
    }
}

impl FeedItemStore for SqliteStore {
    fn list_by_owner(&self, owner: &str) -> Result<Vec<FeedItem>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, owner, title, favorite_count, source_created_at, url, summary,
                    source_image_url, hostname, rank, inserted_at
             FROM feed_items WHERE owner = ?1 ORDER BY rank DESC, id ASC",
        )?;

        let items = stmt
            .query_map(params![owner], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn delete_all_for_owner(&self, owner: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM feed_items WHERE owner = ?1", params![owner])?;
        tracing::debug!(owner, deleted, "Cleared feed items");
        Ok(deleted)
    }

    fn insert(&self, item: &NewFeedItem) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        Self::insert_in(&tx, item, &Utc::now().to_rfc3339())?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn insert_many(&self, items: &[NewFeedItem]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let inserted_at = Utc::now().to_rfc3339();
        let mut count = 0;

        for item in items {
            count += Self::insert_in(&tx, item, &inserted_at)?;
        }

        tx.commit()?;
        Ok(count)
    }

    fn count_by_owner(&self, owner: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM feed_items WHERE owner = ?1",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
