//! # Integration Scenarios
//!
//! - `discovery_flow` - start-up discovery with a failing node, then
//!   rediscovery until the roster is complete
//! - `startup_flow` - readiness gate and the start-up exit codes
//! - `time_framed_loop` - transfer cycles across a full frame rotation
//! - `monitoring_socket` - the monitoring endpoint over a real WebSocket

pub mod discovery_flow;
pub mod monitoring_socket;
pub mod startup_flow;
pub mod time_framed_loop;

#[cfg(test)]
pub(crate) mod fixtures {
    use ima_01_schain_discovery::test_utils::MOCK_SEED_ENDPOINT;
    use ima_01_schain_discovery::MockSChainRpc;
    use ima_02_time_framing::FixedTimeSource;
    use ima_03_transfer_loop::TransferPort;
    use ima_agent::{AgentConfig, AgentRuntime};
    use std::sync::Arc;

    /// Mid-rotation timestamp; framing is off unless a test turns it on.
    pub const CLOCK_START: i64 = 1_700_000_000;

    /// Configuration pointing at the mock seed with start-up waiting off.
    pub fn agent_config() -> AgentConfig {
        AgentConfig {
            url_schain: Some(MOCK_SEED_ENDPOINT.to_string()),
            no_wait_schain_started: true,
            silent_rediscovery: false,
            ..AgentConfig::default()
        }
    }

    pub fn agent(
        config: AgentConfig,
        rpc: &MockSChainRpc,
        transfer: Arc<dyn TransferPort>,
    ) -> AgentRuntime {
        AgentRuntime::new(
            config,
            Arc::new(rpc.clone()),
            transfer,
            Arc::new(FixedTimeSource::new(CLOCK_START)),
        )
    }
}
