//! Cache-Line Metadata
//!
//! Tracks, for every line of a fixed-size collision table, which list it is
//! on: the free list or exactly one user partition. Lists are intrusive and
//! doubly linked through `u32` fields of the table itself, so every add and
//! every remove is O(1) and nothing is allocated after initialization.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        LineMetadata                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  FreeList {head, tail, size}     PartitionLists [33 × runtime]   │
//! │        (tail append)                  (head prepend)             │
//! │               │                             │                     │
//! │               └──────────────┬──────────────┘                     │
//! │                              ▼                                    │
//! │   CollisionTable: [ {partition, next, prev} ; N ]   sentinel = N │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! After every public operation:
//!
//! - a non-empty list's head has `prev == N` and its tail has `next == N`
//! - `prev(next(a)) == a` for every linked pair
//! - `size` equals the number of lines reachable from `head`
//! - a line's partition id names the one list holding it
//!
//! A violation detected during a mutation is a panic, never an error value:
//! continuing on corrupted links would silently lose cache lines.

mod freelist;
mod list;
mod manager;
mod partition;
mod sync;
mod table;
mod types;
mod verifier;

#[cfg(test)]
mod proptest;

pub use freelist::FreeList;
pub use list::{ListIter, ListRuntime, Position};
pub use manager::{LineMetadata, MetadataSnapshot};
pub use partition::PartitionLists;
pub use sync::SharedLineMetadata;
pub use table::CollisionTable;
pub use types::{CacheLine, LinkInfo, ListId, PartitionId, MAX_PARTITIONS};
pub use verifier::{ListVerifier, Violation};
