mod error;
/// Store reading and writing the snapshot files.
pub mod store;

pub use error::FileDaoError;
pub use store::FileSnapshotStore;

use crate::dao::storage::StorageError;

impl From<FileDaoError> for StorageError {
    fn from(err: FileDaoError) -> Self {
        if matches!(err, FileDaoError::Decode { .. }) {
            StorageError::corrupt(err.to_string(), err)
        } else {
            StorageError::unavailable(err.to_string(), err)
        }
    }
}
