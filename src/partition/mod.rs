//! Partition Validity and Ordering
//!
//! The list layer never decides eviction policy itself. It asks two
//! questions of a [`PartitionHook`]: is this partition currently valid, and
//! please recompute the global partition order. The second is only asked when
//! an invalid partition flips between empty and non-empty.
//!
//! # Hooks
//!
//! - [`PartitionOrder`] - configured partitions, eviction order by validity,
//!   quota and priority
//! - [`NoopHook`] - every partition valid, ordering never recomputed

mod config;
mod ordering;

pub use config::PartitionConfig;
pub use ordering::PartitionOrder;

use crate::metadata::{ListRuntime, PartitionId};

/// Policy collaborator consulted by partition list mutations.
pub trait PartitionHook {
    /// True if the partition may currently hold lines under policy.
    fn is_valid(&self, partition: PartitionId) -> bool;

    /// Recompute the global partition ordering.
    ///
    /// `runtimes` is indexed by partition id and reflects the list state
    /// after the mutation that triggered the resort.
    fn resort(&mut self, runtimes: &[ListRuntime]);
}

/// Hook for callers without a partition policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl PartitionHook for NoopHook {
    fn is_valid(&self, _partition: PartitionId) -> bool {
        true
    }

    fn resort(&mut self, _runtimes: &[ListRuntime]) {}
}

impl<H: PartitionHook + ?Sized> PartitionHook for Box<H> {
    fn is_valid(&self, partition: PartitionId) -> bool {
        (**self).is_valid(partition)
    }

    fn resort(&mut self, runtimes: &[ListRuntime]) {
        (**self).resort(runtimes)
    }
}
