//! Cache-Line Metadata - List Bookkeeping for Block-Level Caching
//!
//! Tracks, for every cache line of a fixed-size metadata table, whether it
//! is free or which user partition currently holds it. Membership is kept in
//! intrusive doubly-linked lists threaded through fixed-width integer fields
//! of the table, giving O(1) insertion and O(1) removal from any position.
//!
//! # Architecture
//!
//! ```text
//! cache engine (hit / miss / evict / promote)
//!        │
//!        ▼
//! LineMetadata ──▶ FreeList / PartitionLists ──▶ CollisionTable
//!        │
//!        └──▶ PartitionHook (is_valid, resort)
//! ```
//!
//! # Modules
//!
//! - [`config`] - Table size and partition configuration (YAML)
//! - [`error`] - Error types
//! - [`metadata`] - Collision table, free list, partition lists, verifier
//! - [`metrics`] - Prometheus list-traffic metrics
//! - [`partition`] - Partition validity and eviction ordering hook
//! - [`sim`] - Seeded random workload driver

pub mod config;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod partition;
pub mod sim;

// Re-export commonly used types
pub use config::MetadataConfig;
pub use error::{Error, Result};
pub use metadata::{
    CacheLine, LineMetadata, LinkInfo, ListId, ListRuntime, PartitionId, SharedLineMetadata,
    MAX_PARTITIONS,
};
pub use partition::{NoopHook, PartitionConfig, PartitionHook, PartitionOrder};
