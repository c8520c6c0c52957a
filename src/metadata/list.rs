//! List Runtime
//!
//! `{head, tail, size}` state of one intrusive list threaded through the
//! collision table, plus the link surgery shared by the free list and the
//! partition lists. The two owners differ only in where they insert (tail vs
//! head) and in what they do after an unlink, so the pointer arithmetic lives
//! here once.

use serde::{Deserialize, Serialize};

use super::table::CollisionTable;
use super::types::{CacheLine, LinkInfo, PartitionId};

/// Head/tail/size of one list. Empty lists hold the sentinel in both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRuntime {
    /// First line, or the sentinel
    pub head: CacheLine,
    /// Last line, or the sentinel
    pub tail: CacheLine,
    /// Number of lines reachable from `head`
    pub size: u32,
}

impl ListRuntime {
    /// Empty list for a table of `line_entries` slots.
    pub const fn empty(line_entries: u32) -> Self {
        Self {
            head: CacheLine::sentinel(line_entries),
            tail: CacheLine::sentinel(line_entries),
            size: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Where a line sat in its list before being unlinked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Only element; the list is now empty
    Sole,
    /// First of several
    Head,
    /// Last of several
    Tail,
    /// Neither end
    Middle,
}

/// Assert that `line` is linked into no list this runtime can see.
///
/// Both links must hold the sentinel and the line must not be the sole
/// element of `list`. A sole element of some other list also has sentinel
/// links; the owner of both runtimes checks that case.
fn assert_detached(table: &CollisionTable, list: &ListRuntime, line: CacheLine) {
    let sentinel = table.sentinel();
    let info = table.info(line);
    assert!(
        info.next == sentinel && info.prev == sentinel,
        "cache line {} is still linked (next = {}, prev = {})",
        line,
        info.next,
        info.prev
    );
    assert_ne!(list.head, line, "cache line {} is already in this list", line);
}

/// Link `line` in front of the current head. Returns true if the list was empty.
pub(crate) fn push_front(
    table: &mut CollisionTable,
    list: &mut ListRuntime,
    line: CacheLine,
    owner: PartitionId,
) -> bool {
    assert_detached(table, list, line);
    let sentinel = table.sentinel();
    let was_empty = list.size == 0;

    if was_empty {
        table.set_info(
            line,
            LinkInfo {
                partition: owner,
                next: sentinel,
                prev: sentinel,
            },
        );
        list.head = line;
        list.tail = line;
    } else {
        let old_head = list.head;
        assert!(
            table.contains(old_head),
            "list head {} corrupt for non-empty list of size {}",
            old_head,
            list.size
        );

        table.set_info(
            line,
            LinkInfo {
                partition: owner,
                next: old_head,
                prev: sentinel,
            },
        );
        table.set_prev(old_head, line);
        list.head = line;
    }

    list.size += 1;
    was_empty
}

/// Link `line` after the current tail. Returns true if the list was empty.
pub(crate) fn push_back(
    table: &mut CollisionTable,
    list: &mut ListRuntime,
    line: CacheLine,
    owner: PartitionId,
) -> bool {
    assert_detached(table, list, line);
    let sentinel = table.sentinel();
    let was_empty = list.size == 0;

    if was_empty {
        table.set_info(
            line,
            LinkInfo {
                partition: owner,
                next: sentinel,
                prev: sentinel,
            },
        );
        list.head = line;
        list.tail = line;
    } else {
        let old_tail = list.tail;
        assert!(
            table.contains(old_tail),
            "list tail {} corrupt for non-empty list of size {}",
            old_tail,
            list.size
        );

        table.set_info(
            line,
            LinkInfo {
                partition: owner,
                next: sentinel,
                prev: old_tail,
            },
        );
        table.set_next(old_tail, line);
        list.tail = line;
    }

    list.size += 1;
    was_empty
}

/// Detach `line` from `list`, wherever it sits.
///
/// The line's `next`/`prev` are reset to the sentinel; its partition id is
/// left for the caller. Membership is checked in O(1): an end position must
/// match the runtime's head/tail, a middle position must be linked back from
/// both neighbours.
pub(crate) fn unlink(table: &mut CollisionTable, list: &mut ListRuntime, line: CacheLine) -> Position {
    let sentinel = table.sentinel();
    let LinkInfo { next, prev, .. } = table.info(line);

    assert!(list.size > 0, "unlink of line {} from an empty list", line);

    let is_head = prev == sentinel;
    let is_tail = next == sentinel;

    let position = if is_head && list.size == 1 {
        assert!(
            is_tail && list.head == line && list.tail == line,
            "line {} is not the sole element (head {}, tail {})",
            line,
            list.head,
            list.tail
        );
        list.head = sentinel;
        list.tail = sentinel;
        Position::Sole
    } else if is_head {
        assert_eq!(list.head, line, "line {} claims to be head of another list", line);
        assert!(table.contains(next), "head line {} has corrupt next {}", line, next);

        list.head = next;
        table.set_prev(next, sentinel);
        Position::Head
    } else if is_tail {
        assert_eq!(list.tail, line, "line {} claims to be tail of another list", line);
        assert!(table.contains(prev), "tail line {} has corrupt prev {}", line, prev);

        list.tail = prev;
        table.set_next(prev, sentinel);
        Position::Tail
    } else {
        assert!(
            table.contains(next) && table.contains(prev),
            "middle line {} has corrupt links (next {}, prev {})",
            line,
            next,
            prev
        );
        assert!(
            table.next(prev) == line && table.prev(next) == line,
            "line {} is not linked from its neighbours",
            line
        );

        table.set_prev(next, prev);
        table.set_next(prev, next);
        Position::Middle
    };

    table.set_next(line, sentinel);
    table.set_prev(line, sentinel);
    list.size -= 1;

    position
}

// =============================================================================
// Iteration
// =============================================================================

/// Head-to-tail walk over one list, one hop at a time.
///
/// Stops after `line_entries` hops so a corrupted cycle cannot spin forever.
pub struct ListIter<'a> {
    table: &'a CollisionTable,
    cursor: CacheLine,
    budget: u32,
}

impl<'a> ListIter<'a> {
    pub(crate) fn new(table: &'a CollisionTable, list: &ListRuntime) -> Self {
        Self {
            table,
            cursor: list.head,
            budget: table.line_entries(),
        }
    }
}

impl Iterator for ListIter<'_> {
    type Item = CacheLine;

    fn next(&mut self) -> Option<CacheLine> {
        if self.budget == 0 || !self.table.contains(self.cursor) {
            return None;
        }

        let line = self.cursor;
        self.cursor = self.table.next(line);
        self.budget -= 1;
        Some(line)
    }
}

// =============================================================================
// Tests
// =============================================================================
