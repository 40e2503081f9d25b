use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

use crate::{
    dao::{
        models::{SnapshotKind, decode_document, encode_document},
        snapshot_store::SnapshotStore,
        storage::StorageResult,
    },
    state::{progress::ProgressSnapshot, rating::RatingRecord},
};

use super::error::{FileDaoError, FileResult};

/// Snapshot store writing one JSON document per table into a data directory.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    data_dir: Arc<Path>,
}

impl FileSnapshotStore {
    /// Create a store rooted at `data_dir`. The directory is created lazily on first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir: PathBuf = data_dir.into();
        Self {
            data_dir: Arc::from(data_dir),
        }
    }

    /// Directory holding the snapshot files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of the snapshot file for `kind`.
    pub fn path_for(&self, kind: SnapshotKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    async fn read<T>(&self, kind: SnapshotKind) -> FileResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = self.path_for(kind);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), %kind, "no snapshot on disk; starting empty");
                return Ok(Vec::new());
            }
            Err(source) => return Err(FileDaoError::Read { path, source }),
        };

        let records = decode_document(&raw).map_err(|source| FileDaoError::Decode {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), %kind, "snapshot decoded");
        Ok(records)
    }

    async fn write<T>(&self, kind: SnapshotKind, records: &[T]) -> FileResult<()>
    where
        T: Serialize,
    {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| FileDaoError::CreateDir {
                path: self.data_dir.to_path_buf(),
                source,
            })?;

        let payload =
            encode_document(records).map_err(|source| FileDaoError::Encode { kind, source })?;

        let path = self.path_for(kind);
        let temp_path = path.with_extension("json.tmp");
        write_synced(&temp_path, &payload)
            .await
            .map_err(|source| FileDaoError::Write {
                path: temp_path.clone(),
                source,
            })?;

        // Readers only ever see the old or the new file, never a partial one.
        fs::rename(&temp_path, &path)
            .await
            .map_err(|source| FileDaoError::Rename {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), %kind, count = records.len(), "snapshot written");
        Ok(())
    }
}

async fn write_synced(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(payload).await?;
    file.sync_all().await
}

impl SnapshotStore for FileSnapshotStore {
    fn load_ratings(&self) -> BoxFuture<'static, StorageResult<Vec<RatingRecord>>> {
        let store = self.clone();
        Box::pin(async move { store.read(SnapshotKind::Rating).await.map_err(Into::into) })
    }

    fn save_ratings(&self, records: Vec<RatingRecord>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(SnapshotKind::Rating, &records)
                .await
                .map_err(Into::into)
        })
    }

    fn load_progress(&self) -> BoxFuture<'static, StorageResult<Vec<ProgressSnapshot>>> {
        let store = self.clone();
        Box::pin(async move { store.read(SnapshotKind::Progress).await.map_err(Into::into) })
    }

    fn save_progress(
        &self,
        snapshots: Vec<ProgressSnapshot>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .write(SnapshotKind::Progress, &snapshots)
                .await
                .map_err(Into::into)
        })
    }
}
