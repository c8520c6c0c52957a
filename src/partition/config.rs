//! Partition Configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metadata::PartitionId;

/// Policy settings of one user partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Partition id (`0..MAX_PARTITIONS`)
    pub id: PartitionId,
    /// Human-readable name
    pub name: String,
    /// Eviction priority; larger values are evicted earlier
    #[serde(default = "default_priority")]
    pub priority: u16,
    /// Lines reserved for the partition; it is not reclaimed below this
    #[serde(default)]
    pub min_size: u32,
    /// Lines above which the partition is over quota
    #[serde(default = "default_max_size")]
    pub max_size: u32,
    /// Whether the partition currently accepts lines
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_priority() -> u16 {
    255
}

fn default_max_size() -> u32 {
    u32::MAX
}

fn default_valid() -> bool {
    true
}

impl PartitionConfig {
    /// Valid partition with default priority and no quota.
    pub fn new(id: PartitionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            priority: default_priority(),
            min_size: 0,
            max_size: default_max_size(),
            valid: true,
        }
    }

    /// The partition unclassified lines land in.
    pub fn unclassified() -> Self {
        Self::new(PartitionId::DEFAULT, "unclassified")
    }

    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_size_limits(mut self, min_size: u32, max_size: u32) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// True once `size` lines exceed `max_size`.
    pub fn is_over_quota(&self, size: u32) -> bool {
        size > self.max_size
    }

    /// True while `size` lines do not exceed the reservation.
    pub fn is_reserved(&self, size: u32) -> bool {
        size <= self.min_size
    }

    /// Check id range and size limits.
    pub fn validate(&self) -> Result<()> {
        if !self.id.is_user() {
            return Err(Error::InvalidPartitionId(self.id.get()));
        }
        if self.min_size > self.max_size {
            return Err(Error::Config(format!(
                "partition {} ({}): min_size {} exceeds max_size {}",
                self.id, self.name, self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}
