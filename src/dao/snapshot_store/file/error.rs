//! Error types shared by the file-backed snapshot store.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::dao::models::{DocumentError, SnapshotKind};

/// Convenient result alias returning [`FileDaoError`] failures.
pub type FileResult<T> = Result<T, FileDaoError>;

/// Failures that can occur while reading or writing snapshot files.
#[derive(Debug, Error)]
pub enum FileDaoError {
    /// The data directory could not be created.
    #[error("failed to create data directory `{}`", .path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading an existing snapshot file failed.
    #[error("failed to read snapshot `{}`", .path.display())]
    Read {
        /// Snapshot file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing the temporary snapshot file failed.
    #[error("failed to write snapshot `{}`", .path.display())]
    Write {
        /// Temporary file being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Moving the temporary file over the snapshot failed.
    #[error("failed to replace snapshot `{}`", .path.display())]
    Rename {
        /// Snapshot file being replaced.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Serializing the in-memory table failed.
    #[error("failed to encode {kind} snapshot")]
    Encode {
        /// Table being serialized.
        kind: SnapshotKind,
        /// Serialization error.
        #[source]
        source: serde_json::Error,
    },
    /// The snapshot exists but its content cannot be decoded.
    #[error("failed to decode snapshot `{}`", .path.display())]
    Decode {
        /// Snapshot file being decoded.
        path: PathBuf,
        /// Decoding error.
        #[source]
        source: DocumentError,
    },
}
