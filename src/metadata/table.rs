//! Collision Table
//!
//! Fixed-size array holding one [`LinkInfo`] per cache line. The table is
//! allocated once per cache instance and never grows or shrinks; lines only
//! change which list their links thread them into.
//!
//! Every accessor asserts `line < N`. An out-of-range index means a caller
//! has corrupted its own bookkeeping, so it panics rather than returning an
//! error.

use crate::error::{Error, Result};

use super::types::{CacheLine, LinkInfo, PartitionId};

/// Per-line link storage.
#[derive(Debug, Clone)]
pub struct CollisionTable {
    /// Link records, one per cache line
    entries: Box<[LinkInfo]>,
    /// Number of lines (`N`); also the sentinel value
    line_entries: u32,
}

impl CollisionTable {
    /// Allocate a table of `line_entries` detached, free lines.
    ///
    /// `line_entries` must be non-zero and strictly below `u32::MAX` so the
    /// sentinel still fits in a `u32` link field.
    pub fn new(line_entries: u32) -> Result<Self> {
        if line_entries == 0 || line_entries == u32::MAX {
            return Err(Error::InvalidLineEntries(line_entries as u64));
        }

        let entries = vec![LinkInfo::detached(line_entries); line_entries as usize];

        Ok(Self {
            entries: entries.into_boxed_slice(),
            line_entries,
        })
    }

    /// Number of lines in the table.
    #[inline]
    pub fn line_entries(&self) -> u32 {
        self.line_entries
    }

    /// The "no link" value for this table.
    #[inline]
    pub fn sentinel(&self) -> CacheLine {
        CacheLine::sentinel(self.line_entries)
    }

    /// True if `line` is a real line of this table.
    #[inline]
    pub fn contains(&self, line: CacheLine) -> bool {
        line.get() < self.line_entries
    }

    #[inline]
    fn slot(&self, line: CacheLine) -> &LinkInfo {
        assert!(
            self.contains(line),
            "cache line {} out of range (line_entries = {})",
            line,
            self.line_entries
        );
        &self.entries[line.as_usize()]
    }

    #[inline]
    fn slot_mut(&mut self, line: CacheLine) -> &mut LinkInfo {
        assert!(
            self.contains(line),
            "cache line {} out of range (line_entries = {})",
            line,
            self.line_entries
        );
        &mut self.entries[line.as_usize()]
    }

    /// Current link triple of `line`.
    #[inline]
    pub fn info(&self, line: CacheLine) -> LinkInfo {
        *self.slot(line)
    }

    /// Overwrite the whole link triple of `line`.
    #[inline]
    pub fn set_info(&mut self, line: CacheLine, info: LinkInfo) {
        *self.slot_mut(line) = info;
    }

    #[inline]
    pub fn partition(&self, line: CacheLine) -> PartitionId {
        self.slot(line).partition
    }

    #[inline]
    pub fn set_partition(&mut self, line: CacheLine, partition: PartitionId) {
        self.slot_mut(line).partition = partition;
    }

    #[inline]
    pub fn next(&self, line: CacheLine) -> CacheLine {
        self.slot(line).next
    }

    #[inline]
    pub fn set_next(&mut self, line: CacheLine, next: CacheLine) {
        self.slot_mut(line).next = next;
    }

    #[inline]
    pub fn prev(&self, line: CacheLine) -> CacheLine {
        self.slot(line).prev
    }

    #[inline]
    pub fn set_prev(&mut self, line: CacheLine, prev: CacheLine) {
        self.slot_mut(line).prev = prev;
    }

    /// Detach every line and mark it free.
    pub fn clear(&mut self) {
        let detached = LinkInfo::detached(self.line_entries);
        self.entries.fill(detached);
    }

    /// Iterate over `(line, info)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CacheLine, LinkInfo)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, info)| (CacheLine::new(i as u32), *info))
    }
}

// =============================================================================
// Tests
// =============================================================================
