//! # Start-up Flow
//!
//! Readiness gate behaviour and the dedicated exit codes of start-up
//! failures.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{agent, agent_config};
    use ima_01_schain_discovery::test_utils::mock_roster_nodes;
    use ima_01_schain_discovery::{EndpointBehavior, MockSChainRpc, RosterView};
    use ima_agent::exit_codes::{
        EXIT_DISCOVERY_TIMEOUT, EXIT_QUORUM_UNREACHABLE, EXIT_SEED_UNREACHABLE,
    };
    use ima_agent::{run_actions, ActionKind, AgentConfig, IdleTransfer};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn idle() -> Arc<IdleTransfer> {
        Arc::new(IdleTransfer::new(20))
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_waits_until_seed_answers() {
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        rpc.set_seed(EndpointBehavior::Unreachable);
        let config = AgentConfig {
            no_wait_schain_started: false,
            rediscovery_interval_ms: 0,
            ..agent_config()
        };
        let runtime = agent(config, &rpc, idle());

        let started = Instant::now();
        let seed_comes_up = async {
            tokio::time::sleep(Duration::from_millis(3_500)).await;
            rpc.set_roster(mock_roster_nodes(4));
        };
        let (running, ()) = tokio::join!(runtime.start(), seed_comes_up);
        let running = running.unwrap();

        // probes at 0..3s fail, the one at 4s succeeds
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(4), "waited {:?}", waited);
        assert!(waited < Duration::from_secs(5), "waited {:?}", waited);

        // the probe's roster was thrown away: initial discovery queried again
        assert_eq!(rpc.seed_calls(), 2);
        assert_eq!(rpc.node_calls(0), 2);
        assert_eq!(runtime.store().counts(), (4, 4));

        running.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_exhaustion_falls_through_to_discovery() {
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        rpc.set_seed(EndpointBehavior::Unreachable);
        let config = AgentConfig {
            no_wait_schain_started: false,
            max_wait_schain_attempts: Some(2),
            ..agent_config()
        };
        let runtime = agent(config, &rpc, idle());

        let started = Instant::now();
        let code = run_actions(&runtime, &[ActionKind::Run], async {}).await;
        assert_eq!(code, EXIT_SEED_UNREACHABLE);
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert!(runtime.store().snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_breach_at_start_exits_161() {
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        rpc.set_node(1, EndpointBehavior::Unreachable);
        rpc.set_node(2, EndpointBehavior::Unreachable);
        let runtime = agent(agent_config(), &rpc, idle());

        let code = run_actions(&runtime, &[ActionKind::Run], async {}).await;
        assert_eq!(code, EXIT_QUORUM_UNREACHABLE);
        assert_eq!(rpc.total_node_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_queries_breaching_quorum_exit_161() {
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        rpc.set_node(1, EndpointBehavior::RemoteError);
        rpc.set_node(2, EndpointBehavior::RemoteError);
        let runtime = agent(agent_config(), &rpc, idle());

        let started = Instant::now();
        let code = run_actions(&runtime, &[ActionKind::Run], async {}).await;
        assert_eq!(code, EXIT_QUORUM_UNREACHABLE);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(runtime.store().snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_network_exits_162() {
        let rpc = MockSChainRpc::with_healthy_nodes(3);
        for index in 0..3 {
            rpc.set_node(index, EndpointBehavior::Hang);
        }
        let runtime = agent(agent_config(), &rpc, idle());

        let started = Instant::now();
        let code = run_actions(&runtime, &[ActionKind::Run], async {}).await;
        assert_eq!(code, EXIT_DISCOVERY_TIMEOUT);
        // 10s interval, 1s poll, margin 3
        assert!(started.elapsed() >= Duration::from_secs(7));
        assert!(started.elapsed() < Duration::from_secs(9));
    }
}
