//! Periodic persistence of the in-memory tables.
//!
//! Requests never touch the disk: they only mutate the tables. This task
//! copies each dirty table under its read lock, releases the lock and writes
//! the copy through the snapshot store.

use futures::future::BoxFuture;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{
    dao::{models::SnapshotKind, storage::StorageResult},
    state::{SharedState, TableSlot},
};

/// What happened to one table during a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The table was written with this many records.
    Written {
        /// Number of records in the written snapshot.
        records: usize,
    },
    /// Nothing changed since the last successful flush.
    Clean,
    /// The table is empty; an existing file is left untouched.
    Empty,
    /// Another flush of this table is still running.
    Busy,
    /// The write failed; the table stays dirty and is retried next time.
    Failed,
}

/// Per-table outcome of [`flush_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    /// Outcome for the leaderboard table.
    pub ratings: FlushOutcome,
    /// Outcome for the save-game table.
    pub progress: FlushOutcome,
}

impl FlushReport {
    /// True when at least one table could not be written.
    pub fn failed(&self) -> bool {
        self.ratings == FlushOutcome::Failed || self.progress == FlushOutcome::Failed
    }
}

/// Flush both tables every configured interval until the task is dropped.
pub async fn run(state: SharedState) {
    let period = state.config().flush_interval();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; nothing is dirty yet.
    ticker.tick().await;
    info!(interval_secs = period.as_secs(), "snapshot flush scheduler started");

    loop {
        ticker.tick().await;
        flush_all(&state).await;
    }
}

/// Flush both tables once and update the degraded flag accordingly.
pub async fn flush_all(state: &SharedState) -> FlushReport {
    let store = state.snapshot_store();

    let ratings = flush_table(
        SnapshotKind::Rating,
        state.ratings(),
        |table| table.snapshot(),
        |records| store.save_ratings(records),
    )
    .await;
    let progress = flush_table(
        SnapshotKind::Progress,
        state.progress(),
        |table| table.snapshot(),
        |snapshots| store.save_progress(snapshots),
    )
    .await;

    let report = FlushReport { ratings, progress };
    if report.failed() {
        if state.update_degraded(true) {
            warn!("snapshot flush failed; entering degraded mode");
        }
    } else if state.update_degraded(false) {
        info!("snapshots persisted again; leaving degraded mode");
    }
    report
}

async fn flush_table<T, R>(
    kind: SnapshotKind,
    slot: &TableSlot<T>,
    snapshot: impl FnOnce(&T) -> Vec<R>,
    save: impl FnOnce(Vec<R>) -> BoxFuture<'static, StorageResult<()>>,
) -> FlushOutcome {
    let Some(_gate) = slot.try_begin_flush() else {
        debug!(%kind, "previous flush still running; skipping");
        return FlushOutcome::Busy;
    };

    let (revision, records) = {
        let guard = slot.read().await;
        if !slot.is_dirty() {
            return FlushOutcome::Clean;
        }
        (slot.revision(), snapshot(&guard))
    };

    // An empty table never overwrites a snapshot that may still hold data.
    if records.is_empty() {
        debug!(%kind, "table is empty; skipping flush");
        return FlushOutcome::Empty;
    }

    let count = records.len();
    match save(records).await {
        Ok(()) => {
            slot.mark_persisted(revision);
            debug!(%kind, count, "snapshot flushed");
            FlushOutcome::Written { records: count }
        }
        Err(err) => {
            warn!(%kind, error = %err, "snapshot flush failed; data kept in memory");
            FlushOutcome::Failed
        }
    }
}
