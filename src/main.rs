//! cline-sim
//!
//! Runs a seeded random workload against the cache-line metadata of one
//! cache instance and prints a JSON summary of the final list state.
//!
//! ```text
//! config (YAML) ──▶ LineMetadata ◀── workload (assign / release / reassign)
//!                        │
//!                        ├──▶ verifier (every N ops)
//!                        └──▶ summary (JSON) + metrics (Prometheus text)
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cline_meta::metadata::PartitionId;
use cline_meta::sim::{self, WorkloadConfig, WorkloadReport};
use cline_meta::{LineMetadata, MetadataConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// cline-sim - Exercise cache-line list bookkeeping with a random workload
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Partition configuration file (YAML)
    #[arg(long, env = "CLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Number of cache lines; overrides the configuration file
    #[arg(long, env = "CLINE_LINE_ENTRIES")]
    line_entries: Option<u32>,

    /// Number of operations to run
    #[arg(long, env = "CLINE_OPERATIONS", default_value = "100000")]
    operations: u64,

    /// Workload RNG seed
    #[arg(long, env = "CLINE_SEED", default_value = "42")]
    seed: u64,

    /// Verify every list every N operations (0 = only at the end)
    #[arg(long, env = "CLINE_VERIFY_EVERY", default_value = "10000")]
    verify_every: u64,

    /// Percentage of operations that assign a free line
    #[arg(long, env = "CLINE_ASSIGN_PCT", default_value = "50")]
    assign_pct: u8,

    /// Percentage of operations that release a line
    #[arg(long, env = "CLINE_RELEASE_PCT", default_value = "30")]
    release_pct: u8,

    /// Print Prometheus metrics after the summary
    #[arg(long, env = "CLINE_PRINT_METRICS")]
    print_metrics: bool,

    /// Log filter when RUST_LOG is unset (trace, debug, info, warn, error, or directives)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

#[derive(Serialize)]
struct Summary {
    eviction_order: Vec<PartitionId>,
    #[serde(flatten)]
    report: WorkloadReport,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let mut config = match &args.config {
        Some(path) => MetadataConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MetadataConfig::default(),
    };
    if let Some(line_entries) = args.line_entries {
        config.line_entries = line_entries;
    }

    info!("Starting cline-sim");
    info!("  Line entries: {}", config.line_entries);
    info!("  Partitions: {}", config.partitions.len());
    info!("  Operations: {}", args.operations);
    info!("  Seed: {}", args.seed);

    let mut meta = LineMetadata::from_config(&config).context("invalid metadata configuration")?;
    let partitions: Vec<PartitionId> = meta.hook().configs().map(|c| c.id).collect();

    let workload = WorkloadConfig {
        operations: args.operations,
        seed: args.seed,
        verify_every: args.verify_every,
        assign_pct: args.assign_pct,
        release_pct: args.release_pct,
    };

    let report = sim::run(&mut meta, &partitions, &workload).context("workload failed")?;

    let summary = Summary {
        eviction_order: meta.hook().order().to_vec(),
        report,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if args.print_metrics {
        print!("{}", meta.metrics().encode_text()?);
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` directives take precedence;
/// `--log-level` is the fallback and may itself be a full directive list
/// (e.g. `info,cline_meta::metadata=trace`).
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&args.log_level)?,
    };

    // stdout carries only the summary
    let layer = fmt::layer().with_writer(std::io::stderr);
    if args.log_json {
        tracing_subscriber::registry().with(filter).with(layer.json()).init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer.with_target(true)).init();
    }
    Ok(())
}

fn level_filter(level: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("invalid log level {:?}", level))
}
