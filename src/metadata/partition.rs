//! Partition Lists
//!
//! One intrusive list per user partition. Lines are inserted at the head, so
//! a partition walks most-recently-added first (the free list is the other
//! way round).
//!
//! An invalid partition moving between empty and non-empty can change its
//! place in the global eviction order, so those two transitions, and only
//! those, call [`PartitionHook::resort`].

use tracing::{debug, trace};

use crate::partition::PartitionHook;

use super::list::{self, ListIter, ListRuntime, Position};
use super::table::CollisionTable;
use super::types::{CacheLine, PartitionId, MAX_PARTITIONS};

/// Runtime state of every user partition list.
#[derive(Debug, Clone)]
pub struct PartitionLists {
    runtimes: [ListRuntime; MAX_PARTITIONS],
}

impl PartitionLists {
    /// All partitions empty, for a table of `line_entries` slots.
    pub fn new(line_entries: u32) -> Self {
        Self {
            runtimes: [ListRuntime::empty(line_entries); MAX_PARTITIONS],
        }
    }

    /// Empty every partition.
    pub fn reset(&mut self, line_entries: u32) {
        self.runtimes = [ListRuntime::empty(line_entries); MAX_PARTITIONS];
    }

    #[inline]
    fn index(partition: PartitionId) -> usize {
        assert!(
            partition.is_user(),
            "partition id {} out of range (max {})",
            partition.get(),
            MAX_PARTITIONS
        );
        partition.as_usize()
    }

    /// Current `{head, tail, size}` of `partition`.
    pub fn runtime(&self, partition: PartitionId) -> &ListRuntime {
        &self.runtimes[Self::index(partition)]
    }

    /// Every partition's runtime, indexed by id.
    pub fn runtimes(&self) -> &[ListRuntime] {
        &self.runtimes
    }

    /// Total lines held across all partitions.
    pub fn total_len(&self) -> u64 {
        self.runtimes.iter().map(|rt| rt.size as u64).sum()
    }

    /// Prepend `line` to `partition`.
    ///
    /// Returns true if the hook was asked to resort.
    pub fn add<H: PartitionHook>(
        &mut self,
        table: &mut CollisionTable,
        hook: &mut H,
        partition: PartitionId,
        line: CacheLine,
    ) -> bool {
        let idx = Self::index(partition);
        assert!(
            table.contains(line),
            "cache line {} out of range (line_entries = {})",
            line,
            table.line_entries()
        );

        let was_empty = list::push_front(table, &mut self.runtimes[idx], line, partition);
        trace!(
            partition = %partition,
            line = %line,
            size = self.runtimes[idx].size,
            "partition add"
        );

        if was_empty && !hook.is_valid(partition) {
            debug!(partition = %partition, "invalid partition became non-empty, resorting");
            hook.resort(&self.runtimes);
            return true;
        }
        false
    }

    /// Detach `line` from `partition`, wherever it sits.
    ///
    /// Returns the position it was removed from and whether the hook was
    /// asked to resort.
    pub fn remove<H: PartitionHook>(
        &mut self,
        table: &mut CollisionTable,
        hook: &mut H,
        partition: PartitionId,
        line: CacheLine,
    ) -> (Position, bool) {
        let idx = Self::index(partition);
        assert!(
            table.contains(line),
            "cache line {} out of range (line_entries = {})",
            line,
            table.line_entries()
        );
        assert_eq!(
            table.partition(line),
            partition,
            "cache line {} is not in partition {}",
            line,
            partition
        );

        let position = list::unlink(table, &mut self.runtimes[idx], line);
        trace!(
            partition = %partition,
            line = %line,
            ?position,
            size = self.runtimes[idx].size,
            "partition remove"
        );

        if position == Position::Sole && !hook.is_valid(partition) {
            debug!(partition = %partition, "invalid partition became empty, resorting");
            hook.resort(&self.runtimes);
            return (position, true);
        }
        (position, false)
    }

    /// Head-to-tail walk of `partition`.
    pub fn iter<'a>(&self, table: &'a CollisionTable, partition: PartitionId) -> ListIter<'a> {
        ListIter::new(table, self.runtime(partition))
    }
}

// =============================================================================
// Tests
// =============================================================================
