//! On-disk envelope for table snapshots.
//!
//! Every snapshot file is a JSON document of the form
//! `{ "schemaVersion": 1, "records": [...] }`. Files written by the legacy
//! server are bare JSON arrays without a version and are still accepted.

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Schema version written into every snapshot document.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Identifies which table a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Leaderboard records.
    Rating,
    /// Per-player save-game snapshots.
    Progress,
}

impl SnapshotKind {
    /// File name used for this snapshot inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SnapshotKind::Rating => "rating.json",
            SnapshotKind::Progress => "progress.json",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKind::Rating => f.write_str("rating"),
            SnapshotKind::Progress => f.write_str("progress"),
        }
    }
}

/// Failures raised while decoding a snapshot document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Content is not valid JSON or does not match the record shape.
    #[error("malformed snapshot document")]
    Malformed(#[from] serde_json::Error),
    /// Document was written by a newer schema than this build understands.
    #[error("unsupported schema version {found}")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocumentRef<'a, T> {
    schema_version: u32,
    records: &'a [T],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionProbe {
    schema_version: u32,
}

#[derive(Deserialize)]
struct VersionedDocument<T> {
    records: Vec<T>,
}

/// Serialize `records` into a versioned snapshot document.
pub fn encode_document<T: Serialize>(records: &[T]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&SnapshotDocumentRef {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        records,
    })
}

/// Decode a snapshot document, accepting both versioned and legacy layouts.
pub fn decode_document<T: DeserializeOwned>(raw: &[u8]) -> Result<Vec<T>, DocumentError> {
    let value: Value = serde_json::from_slice(raw)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }

    let probe = VersionProbe::deserialize(&value)?;
    if probe.schema_version > SNAPSHOT_SCHEMA_VERSION {
        return Err(DocumentError::UnsupportedVersion {
            found: probe.schema_version,
        });
    }

    let document: VersionedDocument<T> = serde_json::from_value(value)?;
    Ok(document.records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: String,
        score: u32,
    }

    fn entries() -> Vec<Entry> {
        vec![
            Entry {
                id: "a".into(),
                score: 3,
            },
            Entry {
                id: "b".into(),
                score: 7,
            },
        ]
    }

    #[test]
    fn encoded_document_carries_schema_version() {
        let raw = encode_document(&entries()).unwrap();
        let value: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["schemaVersion"], SNAPSHOT_SCHEMA_VERSION);
        assert_eq!(value["records"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn decodes_what_it_encodes() {
        let raw = encode_document(&entries()).unwrap();
        let decoded: Vec<Entry> = decode_document(&raw).unwrap();
        assert_eq!(decoded, entries());
    }

    #[test]
    fn accepts_legacy_bare_array() {
        let raw = br#"[{"id":"a","score":3},{"id":"b","score":7}]"#;
        let decoded: Vec<Entry> = decode_document(raw).unwrap();
        assert_eq!(decoded, entries());
    }

    #[test]
    fn rejects_newer_schema_version() {
        let raw = br#"{"schemaVersion":99,"records":[]}"#;
        let err = decode_document::<Entry>(raw).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedVersion { found: 99 }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            decode_document::<Entry>(b"{not json"),
            Err(DocumentError::Malformed(_))
        ));
        assert!(matches!(
            decode_document::<Entry>(br#"{"records":[]}"#),
            Err(DocumentError::Malformed(_))
        ));
    }
}
