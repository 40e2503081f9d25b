/// Snapshot document envelope shared by every storage backend.
pub mod models;
/// Snapshot persistence for the rating and progress tables.
pub mod snapshot_store;
/// Storage abstraction layer error types.
pub mod storage;
