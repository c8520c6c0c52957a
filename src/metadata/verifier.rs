//! List Consistency Verifier
//!
//! Walks the free list and every partition list and reports the first
//! broken structural invariant. Purely diagnostic: it never repairs or
//! mutates anything, and every walk is bounded by the table size.

use thiserror::Error;

use super::freelist::FreeList;
use super::list::ListRuntime;
use super::partition::PartitionLists;
use super::table::CollisionTable;
use super::types::{CacheLine, ListId, PartitionId};

/// A broken list invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{list}: empty but head {head} / tail {tail} are not the sentinel")]
    EmptyListNotSentinel {
        list: ListId,
        head: CacheLine,
        tail: CacheLine,
    },

    #[error("{list}: head {head} has prev {prev}, expected the sentinel")]
    HeadPrevNotSentinel {
        list: ListId,
        head: CacheLine,
        prev: CacheLine,
    },

    #[error("{list}: line {line} links to {target}, outside the table")]
    LinkOutOfRange {
        list: ListId,
        line: CacheLine,
        target: CacheLine,
    },

    #[error("{list}: line {line} has prev {found}, expected {expected}")]
    BrokenBackLink {
        list: ListId,
        line: CacheLine,
        expected: CacheLine,
        found: CacheLine,
    },

    #[error("{list}: line {line} is owned by {found}")]
    WrongOwner {
        list: ListId,
        line: CacheLine,
        found: PartitionId,
    },

    #[error("line {line} reachable from both {first} and {second}")]
    DuplicateMembership {
        line: CacheLine,
        first: ListId,
        second: ListId,
    },

    #[error("{list}: recorded size {recorded}, walked {walked}")]
    SizeMismatch {
        list: ListId,
        recorded: u32,
        walked: u32,
    },

    #[error("{list}: recorded tail {recorded}, walk ended at {walked}")]
    TailMismatch {
        list: ListId,
        recorded: CacheLine,
        walked: CacheLine,
    },

    #[error("line {line} is not a member of any list")]
    Orphaned { line: CacheLine },
}

/// Checks list structure over one metadata snapshot.
pub struct ListVerifier<'a> {
    table: &'a CollisionTable,
    free: &'a FreeList,
    parts: &'a PartitionLists,
}

impl<'a> ListVerifier<'a> {
    pub fn new(table: &'a CollisionTable, free: &'a FreeList, parts: &'a PartitionLists) -> Self {
        Self { table, free, parts }
    }

    /// Check every list's links, sizes and owners, and that no line sits in
    /// two lists. Lines detached from all lists are allowed.
    pub fn verify_lists(&self) -> Result<(), Violation> {
        self.walk_all().map(|_| ())
    }

    /// As [`verify_lists`](Self::verify_lists), and additionally require every
    /// line of the table to belong to exactly one list.
    pub fn verify_complete(&self) -> Result<(), Violation> {
        let seen = self.walk_all()?;

        match seen.iter().position(Option::is_none) {
            Some(index) => Err(Violation::Orphaned {
                line: CacheLine::new(index as u32),
            }),
            None => Ok(()),
        }
    }

    fn walk_all(&self) -> Result<Vec<Option<ListId>>, Violation> {
        let mut seen = vec![None; self.table.line_entries() as usize];

        self.walk(ListId::Free, self.free.runtime(), &mut seen)?;
        for partition in PartitionId::all() {
            self.walk(
                ListId::Partition(partition),
                self.parts.runtime(partition),
                &mut seen,
            )?;
        }

        Ok(seen)
    }

    fn walk(
        &self,
        list: ListId,
        runtime: &ListRuntime,
        seen: &mut [Option<ListId>],
    ) -> Result<(), Violation> {
        let sentinel = self.table.sentinel();

        if runtime.size == 0 {
            if runtime.head != sentinel || runtime.tail != sentinel {
                return Err(Violation::EmptyListNotSentinel {
                    list,
                    head: runtime.head,
                    tail: runtime.tail,
                });
            }
            return Ok(());
        }

        let mut prev = sentinel;
        let mut cursor = runtime.head;
        let mut walked = 0u32;

        while cursor != sentinel {
            if !self.table.contains(cursor) {
                return Err(Violation::LinkOutOfRange {
                    list,
                    line: prev,
                    target: cursor,
                });
            }

            let info = self.table.info(cursor);

            if info.prev != prev {
                return Err(if prev == sentinel {
                    Violation::HeadPrevNotSentinel {
                        list,
                        head: cursor,
                        prev: info.prev,
                    }
                } else {
                    Violation::BrokenBackLink {
                        list,
                        line: cursor,
                        expected: prev,
                        found: info.prev,
                    }
                });
            }

            if info.partition != list.owner() {
                return Err(Violation::WrongOwner {
                    list,
                    line: cursor,
                    found: info.partition,
                });
            }

            let slot = &mut seen[cursor.as_usize()];
            if let Some(first) = *slot {
                return Err(Violation::DuplicateMembership {
                    line: cursor,
                    first,
                    second: list,
                });
            }
            *slot = Some(list);

            prev = cursor;
            cursor = info.next;
            walked += 1;
        }

        if walked != runtime.size {
            return Err(Violation::SizeMismatch {
                list,
                recorded: runtime.size,
                walked,
            });
        }

        if prev != runtime.tail {
            return Err(Violation::TailMismatch {
                list,
                recorded: runtime.tail,
                walked: prev,
            });
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
