//! Identifiers and Link Records
//!
//! Cache lines and partitions are addressed by small fixed-width integers.
//! Links between lines are stored as raw `u32` indices where the value `N`
//! (the table size) marks "no link in this direction".

use serde::{Deserialize, Serialize};

/// Number of user partitions a cache instance can carry.
pub const MAX_PARTITIONS: usize = 33;

// =============================================================================
// Cache Line
// =============================================================================

/// Index of a cache line in the collision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheLine(pub u32);

impl CacheLine {
    /// Create a line index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Index as `usize` for table addressing.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Sentinel for a table with `line_entries` slots.
    #[inline]
    pub const fn sentinel(line_entries: u32) -> Self {
        Self(line_entries)
    }

    /// True if this is the sentinel of a table with `line_entries` slots.
    #[inline]
    pub const fn is_sentinel(self, line_entries: u32) -> bool {
        self.0 == line_entries
    }

    /// `Some(self)` for a real line, `None` for the sentinel.
    #[inline]
    pub fn resolve(self, line_entries: u32) -> Option<CacheLine> {
        (self.0 < line_entries).then_some(self)
    }
}

impl From<u32> for CacheLine {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for CacheLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Partition Id
// =============================================================================

/// Identifier of a user partition, or [`PartitionId::INVALID`] for free lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(pub u16);

impl PartitionId {
    /// Partition that unclassified lines land in.
    pub const DEFAULT: PartitionId = PartitionId(0);

    /// Owner id stored in lines that sit on the free list.
    pub const INVALID: PartitionId = PartitionId(u16::MAX);

    /// Create a partition id.
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Id as `usize` for runtime addressing.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// True if the id names a user partition (`< MAX_PARTITIONS`).
    #[inline]
    pub const fn is_user(self) -> bool {
        (self.0 as usize) < MAX_PARTITIONS
    }

    /// Iterate over every user partition id.
    pub fn all() -> impl Iterator<Item = PartitionId> {
        (0..MAX_PARTITIONS as u16).map(PartitionId)
    }
}

impl Default for PartitionId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for PartitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::INVALID {
            write!(f, "free")
        } else {
            write!(f, "p{}", self.0)
        }
    }
}

// =============================================================================
// List Id
// =============================================================================

/// One of the lists a line can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListId {
    Free,
    Partition(PartitionId),
}

impl ListId {
    /// Owner id carried by lines of this list.
    pub fn owner(self) -> PartitionId {
        match self {
            ListId::Free => PartitionId::INVALID,
            ListId::Partition(p) => p,
        }
    }

    /// The list a line with owner id `owner` belongs to.
    pub fn of_owner(owner: PartitionId) -> Self {
        if owner == PartitionId::INVALID {
            ListId::Free
        } else {
            ListId::Partition(owner)
        }
    }

    /// Short label for metrics (`free`, `p3`).
    pub fn label(self) -> String {
        match self {
            ListId::Free => "free".to_string(),
            ListId::Partition(p) => format!("p{}", p.get()),
        }
    }
}

impl std::fmt::Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListId::Free => write!(f, "free list"),
            ListId::Partition(p) => write!(f, "partition {}", p.get()),
        }
    }
}

// =============================================================================
// Link Info
// =============================================================================

/// Raw per-line link record, exactly as held in the collision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Owning list
    pub partition: PartitionId,
    /// Next line toward the tail, or the sentinel
    pub next: CacheLine,
    /// Previous line toward the head, or the sentinel
    pub prev: CacheLine,
}

impl LinkInfo {
    /// A free, fully detached record for a table of `line_entries` slots.
    #[inline]
    pub const fn detached(line_entries: u32) -> Self {
        Self {
            partition: PartitionId::INVALID,
            next: CacheLine::sentinel(line_entries),
            prev: CacheLine::sentinel(line_entries),
        }
    }

    /// Next link as an option.
    #[inline]
    pub fn next_line(&self, line_entries: u32) -> Option<CacheLine> {
        self.next.resolve(line_entries)
    }

    /// Previous link as an option.
    #[inline]
    pub fn prev_line(&self, line_entries: u32) -> Option<CacheLine> {
        self.prev.resolve(line_entries)
    }
}

// =============================================================================
// Tests
// =============================================================================
