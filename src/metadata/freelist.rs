//! Free List
//!
//! Global list of cache lines not assigned to any partition. Insertion is a
//! tail append, so lines are handed out again in the order they were freed.
//! Every free line carries [`PartitionId::INVALID`] as its owner.

use tracing::trace;

use super::list::{self, ListIter, ListRuntime, Position};
use super::table::CollisionTable;
use super::types::{CacheLine, PartitionId};

/// Free-list runtime state.
#[derive(Debug, Clone)]
pub struct FreeList {
    runtime: ListRuntime,
}

impl FreeList {
    /// Empty free list for a table of `line_entries` slots.
    pub fn new(line_entries: u32) -> Self {
        Self {
            runtime: ListRuntime::empty(line_entries),
        }
    }

    /// Thread every line of `table` onto the list in ascending index order.
    ///
    /// Any previous list contents and link state are discarded.
    pub fn populate(&mut self, table: &mut CollisionTable) {
        table.clear();
        self.runtime = ListRuntime::empty(table.line_entries());

        for index in 0..table.line_entries() {
            list::push_back(table, &mut self.runtime, CacheLine::new(index), PartitionId::INVALID);
        }
    }

    /// Current `{head, tail, size}`.
    #[inline]
    pub fn runtime(&self) -> &ListRuntime {
        &self.runtime
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.runtime.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runtime.size == 0
    }

    /// Append `line` at the tail.
    pub fn add(&mut self, table: &mut CollisionTable, line: CacheLine) {
        assert!(
            table.contains(line),
            "cache line {} out of range (line_entries = {})",
            line,
            table.line_entries()
        );

        list::push_back(table, &mut self.runtime, line, PartitionId::INVALID);
        trace!(line = %line, size = self.runtime.size, "free list add");
    }

    /// Detach `line` from wherever it sits in the list.
    pub fn remove(&mut self, table: &mut CollisionTable, line: CacheLine) -> Position {
        assert!(
            table.contains(line),
            "cache line {} out of range (line_entries = {})",
            line,
            table.line_entries()
        );
        assert_eq!(
            table.partition(line),
            PartitionId::INVALID,
            "cache line {} is not on the free list",
            line
        );

        let position = list::unlink(table, &mut self.runtime, line);
        trace!(line = %line, ?position, size = self.runtime.size, "free list remove");
        position
    }

    /// Detach and return the head line, or `None` if no line is free.
    pub fn pop_head(&mut self, table: &mut CollisionTable) -> Option<CacheLine> {
        if self.is_empty() {
            return None;
        }

        let line = self.runtime.head;
        self.remove(table, line);
        Some(line)
    }

    /// Head-to-tail walk.
    pub fn iter<'a>(&self, table: &'a CollisionTable) -> ListIter<'a> {
        ListIter::new(table, &self.runtime)
    }
}

// =============================================================================
// Tests
// =============================================================================
