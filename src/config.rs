//! Metadata Configuration
//!
//! Size of the collision table plus the user partitions that may hold lines.
//! Loadable from YAML:
//!
//! ```yaml
//! line_entries: 4096
//! partitions:
//!   - id: 0
//!     name: unclassified
//!   - id: 1
//!     name: metadata
//!     priority: 1
//!     max_size: 512
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::partition::{PartitionConfig, PartitionOrder};

/// Default number of cache lines.
pub const DEFAULT_LINE_ENTRIES: u32 = 1024;

/// Configuration of one cache instance's line metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Number of cache lines (`N`)
    #[serde(default = "default_line_entries")]
    pub line_entries: u32,
    /// Configured user partitions
    #[serde(default = "default_partitions")]
    pub partitions: Vec<PartitionConfig>,
}

fn default_line_entries() -> u32 {
    DEFAULT_LINE_ENTRIES
}

fn default_partitions() -> Vec<PartitionConfig> {
    vec![PartitionConfig::unclassified()]
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            line_entries: default_line_entries(),
            partitions: default_partitions(),
        }
    }
}

impl MetadataConfig {
    /// Default partitions with a custom table size.
    pub fn with_line_entries(line_entries: u32) -> Self {
        Self {
            line_entries,
            ..Default::default()
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading metadata configuration");
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check table size and partition definitions.
    pub fn validate(&self) -> Result<()> {
        if self.line_entries == 0 || self.line_entries == u32::MAX {
            return Err(Error::InvalidLineEntries(self.line_entries as u64));
        }

        if self.partitions.is_empty() {
            return Err(Error::Config("at least one partition must be configured".to_string()));
        }

        let mut ids = HashSet::new();
        for partition in &self.partitions {
            partition.validate()?;
            if !ids.insert(partition.id) {
                return Err(Error::DuplicatePartition(partition.id.get()));
            }
        }

        Ok(())
    }

    /// Build the default ordering hook from the configured partitions.
    pub fn partition_order(&self) -> Result<PartitionOrder> {
        PartitionOrder::new(self.partitions.iter().cloned())
    }
}
