//! dedup.rs: keep only the items newer than the last dispatched headline.

use anyhow::Result;

use crate::marker::MarkerStore;
use crate::source::{Batch, NewsItem};

/// Record `batch[0]` as the next run's marker, then cut the batch at the
/// first item whose heading equals `last_seen`.
///
/// The marker is written before any truncation and whether or not `enabled`
/// is set. An empty batch is returned as-is without touching the store.
pub fn select_new<S: MarkerStore + ?Sized>(
    batch: Batch,
    last_seen: Option<&str>,
    enabled: bool,
    store: &S,
) -> Result<Batch> {
    if batch.is_empty() {
        return Ok(batch);
    }
    store.write_last_heading(&batch[0].heading)?;

    let last_seen = match last_seen {
        Some(h) if enabled => h,
        _ => return Ok(batch),
    };

    Ok(truncate_at_heading(batch, last_seen))
}

fn truncate_at_heading(mut batch: Batch, heading: &str) -> Batch {
    if let Some(pos) = batch.iter().position(|it: &NewsItem| it.heading == heading) {
        tracing::debug!(kept = pos, dropped = batch.len() - pos, "cut at last seen heading");
        batch.truncate(pos);
    }
    batch
}
