//! # IMA Agent
//!
//! Entry point: parse settings, initialise telemetry, run the requested
//! actions and exit with the resulting code.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use ima_01_schain_discovery::{HttpSChainRpc, DEFAULT_REQUEST_TIMEOUT};
use ima_02_time_framing::SystemTimeSource;
use ima_agent::{run_actions, ActionKind, AgentConfig, AgentRuntime, IdleTransfer};
use ima_telemetry::{init_telemetry, TelemetryConfig};

/// S-Chain interchain messaging agent
#[derive(Parser, Debug)]
#[command(name = "ima-agent", version)]
#[command(about = "Discovers the S-Chain network and runs the time-framed transfer loop")]
struct Cli {
    /// Actions to execute, in order
    #[arg(value_enum, default_values_t = [ActionKind::Run])]
    actions: Vec<ActionKind>,

    #[command(flatten)]
    config: AgentConfig,
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "[ima-agent] Cannot listen for Ctrl+C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("[ima-agent] Ctrl+C received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.config.validate().context("Invalid configuration")?;

    let telemetry_config = TelemetryConfig::from_env();
    let service_name = telemetry_config.service_name.clone();
    let telemetry = init_telemetry(telemetry_config).context("Failed to initialize telemetry")?;
    info!(service = %service_name, "[ima-agent] Telemetry initialized");

    let rpc = HttpSChainRpc::new(DEFAULT_REQUEST_TIMEOUT).context("Failed to create JSON-RPC client")?;
    let transfer = IdleTransfer::new(cli.config.error_history);
    let runtime = AgentRuntime::new(
        cli.config,
        Arc::new(rpc),
        Arc::new(transfer),
        Arc::new(SystemTimeSource),
    );

    let code = run_actions(&runtime, &cli.actions, wait_for_ctrl_c()).await;
    drop(telemetry);
    std::process::exit(code);
}
