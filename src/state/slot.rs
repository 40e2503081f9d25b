use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard};

/// A table guarded for concurrent access, with revision tracking for the
/// flush scheduler and a gate preventing overlapping flushes of the same table.
///
/// Every successful mutation bumps `revision`; a flush records the revision
/// it copied once the write succeeded. The table is dirty while the two differ.
pub struct TableSlot<T> {
    table: RwLock<T>,
    revision: AtomicU64,
    persisted: AtomicU64,
    flush_gate: Mutex<()>,
}

impl<T> TableSlot<T> {
    /// Wrap `table`; a fresh slot is clean.
    pub fn new(table: T) -> Self {
        Self {
            table: RwLock::new(table),
            revision: AtomicU64::new(0),
            persisted: AtomicU64::new(0),
            flush_gate: Mutex::new(()),
        }
    }

    /// Shared read access to the table.
    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.table.read().await
    }

    /// Run `change` under the write lock. A successful change bumps the
    /// revision before the lock is released.
    pub async fn mutate<R, E>(&self, change: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut guard = self.table.write().await;
        let outcome = change(&mut guard)?;
        self.revision.fetch_add(1, Ordering::AcqRel);
        Ok(outcome)
    }

    /// Current revision. Read it under a read guard to pair it with a copy of the table.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Whether the table changed since the last successful flush.
    pub fn is_dirty(&self) -> bool {
        self.revision() != self.persisted.load(Ordering::Acquire)
    }

    /// Record that the content at `revision` reached durable storage.
    pub fn mark_persisted(&self, revision: u64) {
        self.persisted.fetch_max(revision, Ordering::AcqRel);
    }

    /// Acquire the flush gate without waiting; `None` when a flush is already running.
    pub fn try_begin_flush(&self) -> Option<MutexGuard<'_, ()>> {
        self.flush_gate.try_lock().ok()
    }
}
