//! Error types for cache-line metadata
//!
//! Only recoverable failures live here: bad configuration, unreadable input,
//! metrics registration. A broken list invariant is a panic at the point of
//! detection, and [`Violation`] is what the diagnostic verifier reports.

use thiserror::Error;

use crate::metadata::Violation;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building or inspecting cache-line metadata
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be parsed
    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Metrics registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Table size cannot be represented with a sentinel
    #[error("Invalid line_entries {0}: must be in 1..{max}", max = u32::MAX)]
    InvalidLineEntries(u64),

    /// Partition id outside the user partition range
    #[error("Invalid partition id {0}")]
    InvalidPartitionId(u16),

    /// Partition configured twice
    #[error("Duplicate partition id {0}")]
    DuplicatePartition(u16),

    /// Verifier found a broken list
    #[error("Metadata inconsistent: {0}")]
    Inconsistent(#[from] Violation),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
