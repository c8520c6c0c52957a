//! Shared Line Metadata
//!
//! The list layer does no locking of its own. Callers that share one cache
//! instance between worker threads wrap it here: one mutex per instance,
//! held for the duration of a whole line move, and the guard is the
//! `&mut` access the list operations require.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::partition::{PartitionHook, PartitionOrder};

use super::manager::LineMetadata;

/// Cloneable, lock-protected handle to one instance's line metadata.
pub struct SharedLineMetadata<H = PartitionOrder> {
    inner: Arc<Mutex<LineMetadata<H>>>,
}

impl<H> Clone for SharedLineMetadata<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: PartitionHook> SharedLineMetadata<H> {
    pub fn new(metadata: LineMetadata<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(metadata)),
        }
    }

    /// Acquire exclusive access for a sequence of list operations.
    pub fn lock(&self) -> MutexGuard<'_, LineMetadata<H>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut LineMetadata<H>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Acquire exclusive access only if no other thread holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, LineMetadata<H>>> {
        self.inner.try_lock()
    }
}
