//! # Discovery Flow
//!
//! A four-node S-Chain with one node down: start-up discovery succeeds on
//! quorum, rediscovery keeps polling only the unknown node and stops once
//! the roster is complete. The node fails either while connecting or by
//! refusing the capability query.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{agent, agent_config};
    use ima_01_schain_discovery::test_utils::capability_record;
    use ima_01_schain_discovery::{EndpointBehavior, MockSChainRpc, RosterView, SchedulerState};
    use ima_agent::{AgentConfig, IdleTransfer};
    use std::sync::Arc;
    use std::time::Duration;

    fn four_nodes_one_down() -> MockSChainRpc {
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        rpc.set_node(3, EndpointBehavior::Unreachable);
        rpc
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failing_node_then_recovery() {
        let rpc = four_nodes_one_down();
        let runtime = agent(agent_config(), &rpc, Arc::new(IdleTransfer::new(20)));

        let running = runtime.start().await.unwrap();
        let store = runtime.store();
        assert_eq!(store.counts(), (3, 4));
        let summary = store.snapshot().unwrap().discovery_summary();
        assert!(summary.starts_with("3 of 4 discovered, 1 still unknown (#3("), "{}", summary);

        let scheduler = Arc::clone(running.scheduler().unwrap());
        assert_eq!(scheduler.state(), SchedulerState::Scheduled);

        // first tick: node 3 still down, roster unchanged
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(store.counts(), (3, 4));
        assert_eq!(scheduler.stats().passes_started, 1);
        assert_eq!(scheduler.state(), SchedulerState::Scheduled);

        rpc.set_node(3, EndpointBehavior::Answer(capability_record(3)));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.counts(), (4, 4));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(rpc.node_calls(3), 1);
        for index in 0..3 {
            assert_eq!(rpc.node_calls(index), 1, "node #{} was queried again", index);
        }

        // no further passes once complete
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(scheduler.stats().passes_started, 2);

        running.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_node_refusing_queries_then_recovery() {
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        rpc.set_node(3, EndpointBehavior::RemoteError);
        let runtime = agent(agent_config(), &rpc, Arc::new(IdleTransfer::new(20)));

        let running = runtime.start().await.unwrap();
        let store = runtime.store();
        assert_eq!(store.counts(), (3, 4));
        let summary = store.snapshot().unwrap().discovery_summary();
        assert!(summary.starts_with("3 of 4 discovered, 1 still unknown (#3("), "{}", summary);

        rpc.set_node(3, EndpointBehavior::Answer(capability_record(3)));
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(store.counts(), (4, 4));
        for index in 0..3 {
            assert_eq!(rpc.node_calls(index), 1, "node #{} was queried again", index);
        }

        running.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_keeps_first_roster() {
        let rpc = four_nodes_one_down();
        let config = AgentConfig {
            rediscovery_interval_ms: 0,
            ..agent_config()
        };
        let runtime = agent(config, &rpc, Arc::new(IdleTransfer::new(20)));

        let running = runtime.start().await.unwrap();
        let scheduler = Arc::clone(running.scheduler().unwrap());
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        rpc.set_node(3, EndpointBehavior::Answer(capability_record(3)));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runtime.store().counts(), (3, 4));
        assert_eq!(scheduler.stats().passes_started, 0);

        running.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_start_needs_no_rediscovery() {
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        let runtime = agent(agent_config(), &rpc, Arc::new(IdleTransfer::new(20)));

        let running = runtime.start().await.unwrap();
        assert_eq!(runtime.store().counts(), (4, 4));
        assert_eq!(running.scheduler().unwrap().state(), SchedulerState::Idle);

        running.shutdown().await;
    }
}
