//! # IMA Telemetry
//!
//! Logging subscriber setup and the Prometheus registry shared by every
//! IMA crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ima_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `IMA_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `IMA_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `IMA_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `IMA_SERVICE_NAME` | `ima-agent` | Service name in the start-up line |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, DISCOVERY_NODES_DISCOVERED, DISCOVERY_NODES_TOTAL,
    DISCOVERY_PASSES, MONITORING_REQUESTS, REGISTRY, TRANSFER_CYCLES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the logging subscriber.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first: they never depend on logging
    register_metrics()?;
    logging::init_logging(&config)?;
    Ok(TelemetryGuard { _private: () })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
