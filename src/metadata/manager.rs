//! Line Metadata Handle
//!
//! Owns the collision table, the free list, every partition list and the
//! partition hook of one cache instance. All mutations take `&mut self`: the
//! borrow is the exclusive-access token, so two threads can only touch the
//! same instance through an outer lock (see [`super::SharedLineMetadata`]).
//!
//! The six primitives (`free_list_add`, `free_list_remove`, `partition_add`,
//! `partition_remove`, `link_info`, `set_link_info`) map one-to-one onto the
//! list operations. `assign`, `release`, `reassign` and `take_free_line`
//! combine them into the moves a cache actually makes, so every line stays on
//! exactly one list between calls.

use serde::Serialize;
use tracing::info;

use crate::config::MetadataConfig;
use crate::error::Result;
use crate::metrics::ListMetrics;
use crate::partition::{PartitionHook, PartitionOrder};

use super::freelist::FreeList;
use super::list::{ListIter, ListRuntime, Position};
use super::partition::PartitionLists;
use super::table::CollisionTable;
use super::types::{CacheLine, LinkInfo, ListId, PartitionId};
use super::verifier::{ListVerifier, Violation};

/// Cache-line list bookkeeping for one cache instance.
pub struct LineMetadata<H = PartitionOrder> {
    table: CollisionTable,
    free: FreeList,
    parts: PartitionLists,
    hook: H,
    metrics: ListMetrics,
}

/// Serializable summary of list sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataSnapshot {
    pub line_entries: u32,
    pub free: ListRuntime,
    /// Non-empty partitions only
    pub partitions: Vec<(PartitionId, ListRuntime)>,
}

impl LineMetadata<PartitionOrder> {
    /// Build from configuration, with the configured partitions as hook.
    pub fn from_config(config: &MetadataConfig) -> Result<Self> {
        config.validate()?;
        Self::with_hook(config.line_entries, config.partition_order()?)
    }
}

impl<H: PartitionHook> LineMetadata<H> {
    /// Allocate `line_entries` lines, all on the free list in index order.
    pub fn with_hook(line_entries: u32, hook: H) -> Result<Self> {
        let mut table = CollisionTable::new(line_entries)?;
        let mut free = FreeList::new(line_entries);
        free.populate(&mut table);

        let metrics = ListMetrics::new()?;
        metrics.set_size(ListId::Free, free.len());

        info!(line_entries, "cache-line metadata initialized");

        Ok(Self {
            table,
            free,
            parts: PartitionLists::new(line_entries),
            hook,
            metrics,
        })
    }

    /// Number of lines (`N`).
    pub fn line_entries(&self) -> u32 {
        self.table.line_entries()
    }

    /// The "no link" value (`N`).
    pub fn sentinel(&self) -> CacheLine {
        self.table.sentinel()
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Append `line` to the free list tail.
    pub fn free_list_add(&mut self, line: CacheLine) {
        self.assert_not_sole_member(line);
        self.free.add(&mut self.table, line);
        self.metrics.record_add(ListId::Free, self.free.len());
    }

    /// Detach `line` from the free list.
    pub fn free_list_remove(&mut self, line: CacheLine) -> Position {
        let position = self.free.remove(&mut self.table, line);
        self.metrics.record_remove(ListId::Free, self.free.len());
        position
    }

    /// Prepend `line` to `partition`; may resort.
    pub fn partition_add(&mut self, partition: PartitionId, line: CacheLine) {
        self.assert_not_sole_member(line);
        let resorted = self.parts.add(&mut self.table, &mut self.hook, partition, line);
        self.metrics
            .record_add(ListId::Partition(partition), self.parts.runtime(partition).size);
        if resorted {
            self.metrics.record_resort();
        }
    }

    /// Detach `line` from `partition`; may resort.
    pub fn partition_remove(&mut self, partition: PartitionId, line: CacheLine) -> Position {
        let (position, resorted) = self.parts.remove(&mut self.table, &mut self.hook, partition, line);
        self.metrics
            .record_remove(ListId::Partition(partition), self.parts.runtime(partition).size);
        if resorted {
            self.metrics.record_resort();
        }
        position
    }

    /// Raw link triple of `line`.
    pub fn link_info(&self, line: CacheLine) -> LinkInfo {
        self.table.info(line)
    }

    /// Overwrite the raw link triple of `line`.
    ///
    /// No list runtime is adjusted; the caller owns consistency.
    pub fn set_link_info(&mut self, line: CacheLine, info: LinkInfo) {
        self.table.set_info(line, info);
    }

    /// A line with sentinel links is either detached or the only element of
    /// the list its owner id names; the list layer cannot tell which.
    fn assert_not_sole_member(&self, line: CacheLine) {
        if !self.table.contains(line) {
            return;
        }
        let owner = self.table.partition(line);
        let head = if owner == PartitionId::INVALID {
            self.free.runtime().head
        } else if owner.is_user() {
            self.parts.runtime(owner).head
        } else {
            return;
        };
        assert_ne!(
            head,
            line,
            "cache line {} is still the only member of {}",
            line,
            ListId::of_owner(owner)
        );
    }

    // =========================================================================
    // Line moves
    // =========================================================================

    /// Move a free line into `partition`.
    pub fn assign(&mut self, partition: PartitionId, line: CacheLine) {
        self.free_list_remove(line);
        self.partition_add(partition, line);
    }

    /// Return a line of `partition` to the free list.
    pub fn release(&mut self, partition: PartitionId, line: CacheLine) {
        self.partition_remove(partition, line);
        self.free_list_add(line);
    }

    /// Move a line between partitions.
    pub fn reassign(&mut self, from: PartitionId, to: PartitionId, line: CacheLine) {
        self.partition_remove(from, line);
        self.partition_add(to, line);
    }

    /// Take the free-list head and assign it to `partition`.
    pub fn take_free_line(&mut self, partition: PartitionId) -> Option<CacheLine> {
        let line = self.free.pop_head(&mut self.table)?;
        self.metrics.record_remove(ListId::Free, self.free.len());
        self.partition_add(partition, line);
        Some(line)
    }

    /// Return every line to the free list in index order.
    pub fn reset(&mut self) {
        let line_entries = self.line_entries();
        self.free.populate(&mut self.table);
        self.parts.reset(line_entries);
        self.hook.resort(self.parts.runtimes());
        self.metrics.record_resort();

        self.metrics.set_size(ListId::Free, self.free.len());
        for partition in PartitionId::all() {
            self.metrics.set_size(ListId::Partition(partition), 0);
        }
        info!(line_entries, "cache-line metadata reset");
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// List a line currently belongs to, according to its owner id.
    pub fn owner(&self, line: CacheLine) -> ListId {
        ListId::of_owner(self.table.partition(line))
    }

    pub fn free_list(&self) -> &ListRuntime {
        self.free.runtime()
    }

    pub fn partition(&self, partition: PartitionId) -> &ListRuntime {
        self.parts.runtime(partition)
    }

    /// Lines held across all partitions.
    pub fn used_lines(&self) -> u64 {
        self.parts.total_len()
    }

    pub fn iter_free(&self) -> ListIter<'_> {
        self.free.iter(&self.table)
    }

    pub fn iter_partition(&self, partition: PartitionId) -> ListIter<'_> {
        self.parts.iter(&self.table, partition)
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Recompute the partition order outside of an empty/non-empty transition,
    /// e.g. after changing partition validity.
    pub fn resort(&mut self) {
        self.hook.resort(self.parts.runtimes());
        self.metrics.record_resort();
    }

    pub fn metrics(&self) -> &ListMetrics {
        &self.metrics
    }

    pub fn snapshot(&self) -> MetadataSnapshot {
        MetadataSnapshot {
            line_entries: self.line_entries(),
            free: *self.free.runtime(),
            partitions: PartitionId::all()
                .map(|p| (p, *self.parts.runtime(p)))
                .filter(|(_, rt)| !rt.is_empty())
                .collect(),
        }
    }

    /// Structural check of every list; detached lines are tolerated.
    pub fn verify_lists(&self) -> std::result::Result<(), Violation> {
        ListVerifier::new(&self.table, &self.free, &self.parts).verify_lists()
    }

    /// Full check: every line on exactly one well-formed list.
    pub fn verify(&self) -> Result<()> {
        ListVerifier::new(&self.table, &self.free, &self.parts).verify_complete()?;
        Ok(())
    }
}

impl<H> std::fmt::Debug for LineMetadata<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineMetadata")
            .field("line_entries", &self.table.line_entries())
            .field("free", self.free.runtime())
            .field("used", &self.parts.total_len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
