/// JSON file implementation.
pub mod file;

use futures::future::BoxFuture;

use crate::{
    dao::storage::StorageResult,
    state::{progress::ProgressSnapshot, rating::RatingRecord},
};

/// Abstraction over the durable medium holding the rating and progress tables.
///
/// Loads return an empty collection when nothing was persisted yet. Saves
/// always receive a full, owned copy of the table so no lock is held while
/// the backend performs I/O.
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted leaderboard records.
    fn load_ratings(&self) -> BoxFuture<'static, StorageResult<Vec<RatingRecord>>>;
    /// Replace the persisted leaderboard with `records`.
    fn save_ratings(&self, records: Vec<RatingRecord>) -> BoxFuture<'static, StorageResult<()>>;
    /// Load the persisted save-games.
    fn load_progress(&self) -> BoxFuture<'static, StorageResult<Vec<ProgressSnapshot>>>;
    /// Replace the persisted save-games with `snapshots`.
    fn save_progress(
        &self,
        snapshots: Vec<ProgressSnapshot>,
    ) -> BoxFuture<'static, StorageResult<()>>;
}
