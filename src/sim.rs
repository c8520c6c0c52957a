//! Workload Simulation
//!
//! Drives a [`LineMetadata`] with a seeded random mix of the moves a cache
//! makes (fill a free line, evict a line, reclassify a line), picking lines
//! at random positions so head, tail and middle removals all occur. The
//! full verifier runs every `verify_every` operations.

use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::metadata::{LineMetadata, MetadataSnapshot, PartitionId};
use crate::partition::PartitionHook;

/// Workload parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of operations to issue
    pub operations: u64,
    /// RNG seed
    pub seed: u64,
    /// Run the full verifier every N operations (0 = only at the end)
    pub verify_every: u64,
    /// Percentage of operations that assign a free line
    pub assign_pct: u8,
    /// Percentage of operations that release a line (rest reassign)
    pub release_pct: u8,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            operations: 100_000,
            seed: 42,
            verify_every: 10_000,
            assign_pct: 50,
            release_pct: 30,
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.assign_pct as u16 + self.release_pct as u16 > 100 {
            return Err(Error::Config(format!(
                "assign_pct {} + release_pct {} exceeds 100",
                self.assign_pct, self.release_pct
            )));
        }
        Ok(())
    }
}

/// Outcome of a workload run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    pub operations: u64,
    pub assigned: u64,
    pub released: u64,
    pub reassigned: u64,
    /// Operations with no eligible line (free list or partition empty)
    pub skipped: u64,
    pub verifications: u64,
    pub resorts: u64,
    pub snapshot: MetadataSnapshot,
}

/// Run `config` against `meta`, moving lines among `partitions`.
pub fn run<H: PartitionHook>(
    meta: &mut LineMetadata<H>,
    partitions: &[PartitionId],
    config: &WorkloadConfig,
) -> Result<WorkloadReport> {
    config.validate()?;
    if partitions.is_empty() {
        return Err(Error::Config("workload needs at least one partition".to_string()));
    }

    info!(
        operations = config.operations,
        seed = config.seed,
        partitions = partitions.len(),
        "starting workload"
    );

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let release_threshold = config.assign_pct + config.release_pct;
    let resorts_before = meta.metrics().resort_count();

    let mut report = WorkloadReport {
        operations: config.operations,
        assigned: 0,
        released: 0,
        reassigned: 0,
        skipped: 0,
        verifications: 0,
        resorts: 0,
        snapshot: meta.snapshot(),
    };

    for op in 1..=config.operations {
        let partition = partitions[rng.random_range(0..partitions.len())];
        let roll: u8 = rng.random_range(0..100);

        if roll < config.assign_pct {
            let free = meta.free_list().size;
            if free == 0 {
                report.skipped += 1;
            } else {
                let pick = rng.random_range(0..free) as usize;
                let line = meta.iter_free().nth(pick).ok_or_else(|| {
                    Error::Internal(format!("free list shorter than its size {}", free))
                })?;
                meta.assign(partition, line);
                report.assigned += 1;
            }
        } else {
            let size = meta.partition(partition).size;
            if size == 0 {
                report.skipped += 1;
            } else {
                let pick = rng.random_range(0..size) as usize;
                let line = meta.iter_partition(partition).nth(pick).ok_or_else(|| {
                    Error::Internal(format!("partition {} shorter than its size {}", partition, size))
                })?;

                if roll < release_threshold {
                    meta.release(partition, line);
                    report.released += 1;
                } else {
                    let to = partitions[rng.random_range(0..partitions.len())];
                    meta.reassign(partition, to, line);
                    report.reassigned += 1;
                }
            }
        }

        if config.verify_every > 0 && op % config.verify_every == 0 {
            meta.verify()?;
            report.verifications += 1;
            debug!(op, used = meta.used_lines(), "metadata verified");
        }
    }

    meta.verify()?;
    report.verifications += 1;
    report.resorts = meta.metrics().resort_count() - resorts_before;
    report.snapshot = meta.snapshot();

    info!(
        assigned = report.assigned,
        released = report.released,
        reassigned = report.reassigned,
        skipped = report.skipped,
        "workload complete"
    );

    Ok(report)
}
