//! # Action Runner
//!
//! Executes the requested actions in order and turns their outcomes into a
//! process exit code.

use crate::exit_codes::{for_agent_error, EXIT_SUCCESS};
use crate::runtime::{AgentError, AgentRuntime};
use clap::ValueEnum;
use std::future::Future;
use tracing::{error, info};

/// A named unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ActionKind {
    /// Start-up, then the transfer loop until Ctrl-C.
    Run,
    /// Query every S-Chain node once and print the roster.
    Browse,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Run => "run",
            ActionKind::Browse => "browse",
        }
    }
}

/// Outcome counters of one runner invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSummary {
    pub executed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Run `actions` in order; repeated actions run once.
///
/// `shutdown` completes when the `run` action should stop. Returns the exit
/// code: a dedicated code for the first failure that has one (remaining
/// actions are not run), otherwise the number of failed actions.
pub async fn run_actions<F>(runtime: &AgentRuntime, actions: &[ActionKind], shutdown: F) -> i32
where
    F: Future<Output = ()>,
{
    let mut unique: Vec<ActionKind> = Vec::with_capacity(actions.len());
    for action in actions {
        if !unique.contains(action) {
            unique.push(*action);
        }
    }

    tokio::pin!(shutdown);
    let mut summary = ActionSummary::default();
    for action in unique {
        info!(action = action.name(), "[ima-agent] Will execute action \"{}\"", action.name());
        summary.executed += 1;
        let outcome = match action {
            ActionKind::Run => runtime.run(shutdown.as_mut()).await,
            ActionKind::Browse => browse(runtime).await,
        };
        match outcome {
            Ok(()) => {
                summary.succeeded += 1;
                info!(action = action.name(), "[ima-agent] Action \"{}\" succeeded", action.name());
            }
            Err(e) => {
                summary.failed += 1;
                error!(action = action.name(), error = %e, "[ima-agent] Action \"{}\" failed", action.name());
                if let Some(code) = for_agent_error(&e) {
                    log_summary(&summary);
                    return code;
                }
            }
        }
    }

    log_summary(&summary);
    if summary.failed == 0 {
        EXIT_SUCCESS
    } else {
        i32::try_from(summary.failed).unwrap_or(i32::MAX)
    }
}

async fn browse(runtime: &AgentRuntime) -> Result<(), AgentError> {
    let roster = runtime.browse().await?;
    info!(
        total = roster.total(),
        discovered = roster.discovered_count(),
        "[ima-agent] S-Chain network browsed"
    );
    match serde_json::to_string_pretty(&roster) {
        Ok(json) => println!("{}", json),
        Err(e) => error!(error = %e, "[ima-agent] Failed to render S-Chain network"),
    }
    Ok(())
}

fn log_summary(summary: &ActionSummary) {
    info!(
        executed = summary.executed,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "[ima-agent] {} action(s) executed, {} succeeded, {} failed",
        summary.executed,
        summary.succeeded,
        summary.failed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::transfer::IdleTransfer;
    use ima_01_schain_discovery::test_utils::MOCK_SEED_ENDPOINT;
    use ima_01_schain_discovery::{EndpointBehavior, MockSChainRpc, RosterView};
    use ima_02_time_framing::FixedTimeSource;
    use std::sync::Arc;

    fn runtime(url: Option<&str>, rpc: MockSChainRpc) -> AgentRuntime {
        let config = AgentConfig {
            url_schain: url.map(str::to_string),
            no_wait_schain_started: true,
            rediscovery_interval_ms: 0,
            ..AgentConfig::default()
        };
        AgentRuntime::new(
            config,
            Arc::new(rpc),
            Arc::new(IdleTransfer::new(20)),
            Arc::new(FixedTimeSource::new(1_700_000_000)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_browse_without_url_exits_154() {
        let runtime = runtime(None, MockSChainRpc::with_healthy_nodes(2));
        let code = run_actions(&runtime, &[ActionKind::Browse], async {}).await;
        assert_eq!(code, 154);
    }

    #[tokio::test(start_paused = true)]
    async fn test_browse_healthy_network_exits_0() {
        let runtime = runtime(Some(MOCK_SEED_ENDPOINT), MockSChainRpc::with_healthy_nodes(3));
        let code = run_actions(&runtime, &[ActionKind::Browse], async {}).await;
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_browse_remote_error_exits_158() {
        let rpc = MockSChainRpc::with_healthy_nodes(3);
        rpc.set_node(1, EndpointBehavior::RemoteError);
        let runtime = runtime(Some(MOCK_SEED_ENDPOINT), rpc);
        let code = run_actions(&runtime, &[ActionKind::Browse], async {}).await;
        assert_eq!(code, 158);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_with_dead_seed_exits_155_and_skips_the_rest() {
        let rpc = MockSChainRpc::with_healthy_nodes(3);
        rpc.set_seed(EndpointBehavior::Unreachable);
        let runtime = runtime(Some(MOCK_SEED_ENDPOINT), rpc.clone());
        let code = run_actions(&runtime, &[ActionKind::Run, ActionKind::Browse], async {}).await;
        assert_eq!(code, 155);
        // browse never ran: only the one connect attempt of the run action
        assert_eq!(rpc.node_connects(0), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_without_url_starts_and_stops() {
        let runtime = runtime(None, MockSChainRpc::with_healthy_nodes(2));
        let code = run_actions(&runtime, &[ActionKind::Run, ActionKind::Run], async {}).await;
        assert_eq!(code, EXIT_SUCCESS);
        assert!(runtime.store().snapshot().is_none());
    }
}
