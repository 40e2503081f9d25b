/// Numeric coercion of loosely typed client values.
pub mod coerce;
/// Save-game table.
pub mod progress;
/// Leaderboard table.
pub mod rating;
mod slot;

use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    config::AppConfig,
    dao::{models::SnapshotKind, snapshot_store::SnapshotStore, storage::StorageResult},
    state::{progress::ProgressTable, rating::RatingTable},
};

pub use self::slot::TableSlot;

/// Reference-counted handle to the application state shared by handlers and tasks.
pub type SharedState = Arc<AppState>;

/// Central application state owning both in-memory tables and the snapshot store.
pub struct AppState {
    config: AppConfig,
    snapshot_store: Arc<dyn SnapshotStore>,
    ratings: TableSlot<RatingTable>,
    progress: TableSlot<ProgressTable>,
    degraded: watch::Sender<bool>,
    started_at: SystemTime,
}

impl AppState {
    /// Construct a state with empty tables, wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, snapshot_store: Arc<dyn SnapshotStore>) -> SharedState {
        let ratings = RatingTable::new(config.rating_capacity());
        Self::with_tables(config, snapshot_store, ratings, ProgressTable::new())
    }

    /// Construct a state from the last persisted snapshots.
    ///
    /// Missing or unreadable snapshots leave the matching table empty; the
    /// process never fails to start because of its data files.
    pub async fn restore(config: AppConfig, snapshot_store: Arc<dyn SnapshotStore>) -> SharedState {
        let records = load_or_empty(SnapshotKind::Rating, snapshot_store.load_ratings()).await;
        let snapshots = load_or_empty(SnapshotKind::Progress, snapshot_store.load_progress()).await;

        let ratings = RatingTable::from_records(records, config.rating_capacity());
        let progress = ProgressTable::from_snapshots(snapshots);
        info!(
            players = ratings.len(),
            saves = progress.len(),
            "restored tables from snapshots"
        );

        Self::with_tables(config, snapshot_store, ratings, progress)
    }

    fn with_tables(
        config: AppConfig,
        snapshot_store: Arc<dyn SnapshotStore>,
        ratings: RatingTable,
        progress: ProgressTable,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            config,
            snapshot_store,
            ratings: TableSlot::new(ratings),
            progress: TableSlot::new(progress),
            degraded: degraded_tx,
            started_at: SystemTime::now(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the durable snapshot store.
    pub fn snapshot_store(&self) -> Arc<dyn SnapshotStore> {
        self.snapshot_store.clone()
    }

    /// Leaderboard table.
    pub fn ratings(&self) -> &TableSlot<RatingTable> {
        &self.ratings
    }

    /// Save-game table.
    pub fn progress(&self) -> &TableSlot<ProgressTable> {
        &self.progress
    }

    /// True while the last flush attempt failed.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag, returning whether it changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Time at which this process built its state.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }
}

/// Current wall-clock time in unix milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

async fn load_or_empty<T>(
    kind: SnapshotKind,
    load: BoxFuture<'static, StorageResult<Vec<T>>>,
) -> Vec<T> {
    match load.await {
        Ok(records) => records,
        Err(err) if err.is_corrupt() => {
            error!(%kind, error = %err, "snapshot is corrupt; starting with an empty table");
            Vec::new()
        }
        Err(err) => {
            warn!(%kind, error = %err, "snapshot unreadable; starting with an empty table");
            Vec::new()
        }
    }
}
