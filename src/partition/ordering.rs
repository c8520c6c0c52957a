//! Partition Eviction Order
//!
//! Default [`PartitionHook`]: validity comes from each partition's
//! configuration, and a resort ranks the non-empty partitions in the order
//! the eviction path should reclaim lines from them:
//!
//! 1. invalid partitions (they should hold nothing)
//! 2. valid partitions over their `max_size`
//! 3. valid partitions above their reservation
//! 4. valid partitions at or below their `min_size`
//!
//! Within a rank, larger priority values go first, then lower ids.

use tracing::debug;

use crate::error::{Error, Result};
use crate::metadata::{ListRuntime, PartitionId, MAX_PARTITIONS};

use super::config::PartitionConfig;
use super::PartitionHook;

/// Configured partitions plus the last computed eviction order.
#[derive(Debug, Clone)]
pub struct PartitionOrder {
    /// Configuration indexed by partition id; `None` for unconfigured ids
    configs: Vec<Option<PartitionConfig>>,
    /// Non-empty partitions, first to be reclaimed first
    order: Vec<PartitionId>,
    /// Number of resorts performed
    resorts: u64,
}

impl Default for PartitionOrder {
    fn default() -> Self {
        Self {
            configs: vec![None; MAX_PARTITIONS],
            order: Vec::new(),
            resorts: 0,
        }
    }
}

impl PartitionOrder {
    /// Build from partition configurations.
    ///
    /// Ids must be in range and unique. Ids without a configuration are
    /// treated as invalid.
    pub fn new(partitions: impl IntoIterator<Item = PartitionConfig>) -> Result<Self> {
        let mut this = Self::default();

        for config in partitions {
            config.validate()?;
            let slot = &mut this.configs[config.id.as_usize()];
            if slot.is_some() {
                return Err(Error::DuplicatePartition(config.id.get()));
            }
            *slot = Some(config);
        }

        Ok(this)
    }

    /// Configuration of `partition`, if any.
    pub fn config(&self, partition: PartitionId) -> Option<&PartitionConfig> {
        self.configs.get(partition.as_usize()).and_then(Option::as_ref)
    }

    /// Configured partitions in id order.
    pub fn configs(&self) -> impl Iterator<Item = &PartitionConfig> {
        self.configs.iter().flatten()
    }

    /// Flip the validity flag of a configured partition.
    ///
    /// The caller should trigger a resort afterwards if the partition holds
    /// lines; the list layer only resorts on empty/non-empty transitions.
    pub fn set_valid(&mut self, partition: PartitionId, valid: bool) -> Result<()> {
        let config = self
            .configs
            .get_mut(partition.as_usize())
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidPartitionId(partition.get()))?;
        config.valid = valid;
        Ok(())
    }

    /// Last computed eviction order.
    pub fn order(&self) -> &[PartitionId] {
        &self.order
    }

    /// Partition the eviction path should reclaim from next.
    pub fn eviction_candidate(&self) -> Option<PartitionId> {
        self.order.first().copied()
    }

    /// Number of resorts performed so far.
    pub fn resort_count(&self) -> u64 {
        self.resorts
    }

    fn rank(&self, partition: PartitionId, size: u32) -> (u8, std::cmp::Reverse<u16>, PartitionId) {
        let config = match self.config(partition) {
            Some(config) if config.valid => config,
            other => {
                let priority = other.map_or(u16::MAX, |c| c.priority);
                return (0, std::cmp::Reverse(priority), partition);
            }
        };

        let class = if config.is_over_quota(size) {
            1
        } else if config.is_reserved(size) {
            3
        } else {
            2
        };

        (class, std::cmp::Reverse(config.priority), partition)
    }
}

impl PartitionHook for PartitionOrder {
    fn is_valid(&self, partition: PartitionId) -> bool {
        self.config(partition).is_some_and(|c| c.valid)
    }

    fn resort(&mut self, runtimes: &[ListRuntime]) {
        let mut ranked: Vec<_> = runtimes
            .iter()
            .enumerate()
            .filter(|(_, rt)| !rt.is_empty())
            .map(|(id, rt)| {
                let partition = PartitionId::new(id as u16);
                (self.rank(partition, rt.size), partition)
            })
            .collect();
        ranked.sort_unstable();

        self.order = ranked.into_iter().map(|(_, partition)| partition).collect();
        self.resorts += 1;

        debug!(order = ?self.order, resorts = self.resorts, "partition order recomputed");
    }
}

// =============================================================================
// Tests
// =============================================================================
