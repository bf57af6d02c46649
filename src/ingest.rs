//! Write path for the external fetch: newline-delimited JSON records in,
//! ranked feed items out.

use std::io::BufRead;

use html_escape::decode_html_entities;
use serde::Deserialize;
use url::Url;

use crate::app::Result;
use crate::domain::NewFeedItem;
use crate::store::FeedItemStore;

/// One record as produced by the fetch program.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRecord {
    pub title: String,
    pub favorite_count: u32,
    #[serde(default)]
    pub retweet_count: u32,
    pub tweet_created_at: String,
    pub url: String,
    pub summary: String,
    #[serde(default)]
    pub source_image_url: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub rank: Option<f64>,
}

impl IngestRecord {
    /// Fallback score when the record carries no rank of its own.
    pub fn default_rank(&self) -> f64 {
        1.5 * f64::from(self.favorite_count) + f64::from(self.retweet_count)
    }

    pub fn into_item(self, owner: &str) -> NewFeedItem {
        let rank = self.rank.unwrap_or_else(|| self.default_rank());
        let hostname = self.hostname.or_else(|| hostname_of(&self.url));

        NewFeedItem {
            owner: owner.to_string(),
            title: decode_html_entities(&self.title).to_string(),
            favorite_count: self.favorite_count,
            source_created_at: self.tweet_created_at,
            url: self.url,
            summary: decode_html_entities(&self.summary).to_string(),
            source_image_url: self.source_image_url,
            hostname,
            rank,
        }
    }
}

fn hostname_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(String::from)
}

/// Parse every line before anything is written, so a bad line leaves the
/// store untouched.
pub fn parse_records<R: BufRead>(reader: R, owner: &str) -> Result<Vec<NewFeedItem>> {
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: IngestRecord = serde_json::from_str(&line)?;
        items.push(record.into_item(owner));
    }
    Ok(items)
}

pub fn ingest<S: FeedItemStore + ?Sized, R: BufRead>(store: &S, owner: &str, reader: R) -> Result<usize> {
    let items = parse_records(reader, owner)?;
    let count = store.insert_many(&items)?;
    tracing::info!(owner, count, "Ingested feed items");
    Ok(count)
}
