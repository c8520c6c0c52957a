//! List Traffic Metrics
//!
//! Each metadata handle owns its own [`Registry`] so several cache instances
//! (and tests) can coexist in one process without name clashes.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::error::Result;
use crate::metadata::ListId;

/// Counters and gauges for free-list and partition-list mutations.
#[derive(Clone)]
pub struct ListMetrics {
    registry: Registry,
    ops: IntCounterVec,
    resorts: IntCounter,
    sizes: IntGaugeVec,
}

impl ListMetrics {
    /// Create and register the list metrics in a fresh registry.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let ops = IntCounterVec::new(
            Opts::new("cline_list_ops_total", "Cache-line list mutations"),
            &["list", "op"],
        )?;
        let resorts = IntCounter::new(
            "cline_partition_resorts_total",
            "Partition order recomputations triggered by list transitions",
        )?;
        let sizes = IntGaugeVec::new(
            Opts::new("cline_list_size", "Lines currently on each list"),
            &["list"],
        )?;

        registry.register(Box::new(ops.clone()))?;
        registry.register(Box::new(resorts.clone()))?;
        registry.register(Box::new(sizes.clone()))?;

        Ok(Self {
            registry,
            ops,
            resorts,
            sizes,
        })
    }

    pub fn record_add(&self, list: ListId, size: u32) {
        let label = list.label();
        self.ops.with_label_values(&[label.as_str(), "add"]).inc();
        self.sizes.with_label_values(&[label.as_str()]).set(size as i64);
    }

    pub fn record_remove(&self, list: ListId, size: u32) {
        let label = list.label();
        self.ops.with_label_values(&[label.as_str(), "remove"]).inc();
        self.sizes.with_label_values(&[label.as_str()]).set(size as i64);
    }

    pub fn record_resort(&self) {
        self.resorts.inc();
    }

    /// Set the size gauge without counting an operation.
    pub fn set_size(&self, list: ListId, size: u32) {
        self.sizes
            .with_label_values(&[list.label().as_str()])
            .set(size as i64);
    }

    /// Number of `op` mutations recorded against `list`.
    pub fn op_count(&self, list: ListId, op: &str) -> u64 {
        self.ops
            .with_label_values(&[list.label().as_str(), op])
            .get()
    }

    pub fn resort_count(&self) -> u64 {
        self.resorts.get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prometheus text exposition of every list metric.
    pub fn encode_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| crate::error::Error::Internal(e.to_string()))
    }
}

impl std::fmt::Debug for ListMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListMetrics")
            .field("resorts", &self.resorts.get())
            .finish()
    }
}
