//! Prometheus metrics for the IMA agent.
//!
//! All metrics follow the naming convention: `ima_<subsystem>_<metric>`
//!
//! ## Metric Types
//!
//! - **Gauge**: roster size and discovered node count
//! - **Counter**: discovery passes, transfer cycles, monitoring requests

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DISCOVERY METRICS (ima-01)
    // =========================================================================

    /// Nodes in the current roster
    pub static ref DISCOVERY_NODES_TOTAL: IntGauge = IntGauge::new(
        "ima_discovery_nodes_total",
        "Number of S-Chain nodes in the current roster"
    ).expect("metric creation failed");

    /// Nodes with a capability record
    pub static ref DISCOVERY_NODES_DISCOVERED: IntGauge = IntGauge::new(
        "ima_discovery_nodes_discovered",
        "Number of S-Chain nodes fully discovered"
    ).expect("metric creation failed");

    /// Rediscovery passes by outcome
    pub static ref DISCOVERY_PASSES: IntCounterVec = IntCounterVec::new(
        Opts::new("ima_discovery_passes_total", "S-Chain rediscovery passes"),
        &["outcome"]  // outcome: started/skipped/failed
    ).expect("metric creation failed");

    // =========================================================================
    // TRANSFER LOOP METRICS (ima-03)
    // =========================================================================

    /// Transfer cycles by outcome
    pub static ref TRANSFER_CYCLES: IntCounterVec = IntCounterVec::new(
        Opts::new("ima_transfer_cycles_total", "Transfer loop cycles"),
        &["outcome"]  // outcome: completed/skipped/failed
    ).expect("metric creation failed");

    // =========================================================================
    // MONITORING METRICS (ima-04)
    // =========================================================================

    /// Monitoring requests by method
    pub static ref MONITORING_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("ima_monitoring_requests_total", "Monitoring socket requests"),
        &["method"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Registering twice is harmless; metrics already present are kept.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DISCOVERY_NODES_TOTAL.clone()),
        Box::new(DISCOVERY_NODES_DISCOVERED.clone()),
        Box::new(DISCOVERY_PASSES.clone()),
        Box::new(TRANSFER_CYCLES.clone()),
        Box::new(MONITORING_REQUESTS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
