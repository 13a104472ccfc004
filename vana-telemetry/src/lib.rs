//! # vana-telemetry
//!
//! Observability for the habit index: structured logging initialization
//! and a Prometheus metrics recorder. The core library stays free of
//! metrics plumbing; callers (the CLI, benchmarks) record what they need
//! around the five core operations.

pub mod logging;
pub mod metrics;
