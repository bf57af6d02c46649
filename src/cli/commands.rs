use chrono::Utc;

use crate::app::{AppContext, Result};
use crate::ingest;
use crate::store::FeedItemStore;

/// Run one refresh cycle to completion.
///
/// The coordinator returns as soon as the job is queued; the command then
/// waits for the worker pool so the process outlives the fetch.
pub async fn refresh(ctx: &AppContext, owner: &str, token: &str, secret: &str) -> Result<()> {
    let (coordinator, pool) = ctx.start_pipeline(ctx.process_fetcher());

    let job = coordinator.refresh(owner, token, secret)?;
    println!("Queued {} for {}", job, owner);

    drop(coordinator);
    pool.join().await?;

    let count = ctx.store.count_by_owner(owner)?;
    println!("Feed for {} now has {} items", owner, count);
    Ok(())
}

pub fn show(ctx: &AppContext, owner: &str) -> Result<()> {
    let items = ctx.feed_view().render(Some(owner), Utc::now())?;

    if items.is_empty() {
        println!("No items");
        return Ok(());
    }

    for entry in items {
        println!(
            "{:>8.1}  {:<12} {}\n          {}",
            entry.item.rank,
            entry.age,
            entry.item.title,
            entry.item.display_hostname()
        );
    }

    Ok(())
}

pub fn ingest(ctx: &AppContext, owner: &str) -> Result<()> {
    let stdin = std::io::stdin();
    let count = ingest::ingest(ctx.store.as_ref(), owner, stdin.lock())?;
    println!("Ingested {} items for {}", count, owner);
    Ok(())
}

pub fn clear(ctx: &AppContext, owner: &str) -> Result<()> {
    let deleted = ctx.store.delete_all_for_owner(owner)?;
    println!("Removed {} items for {}", deleted, owner);
    Ok(())
}
