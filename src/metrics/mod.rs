//! Metrics module
//!
//! Prometheus counters and gauges describing list traffic.

mod lists;

pub use lists::ListMetrics;
