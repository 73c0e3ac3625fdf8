//! Discovery pass.
//!
//! A pass asks the seed for the node list, carries forward capability records
//! already known from the previous roster, opens a channel to every other
//! node and, if enough nodes are still reachable, queries them concurrently
//! until the quorum has answered or the wait budget runs out. Every failure,
//! at connect or at call level, lowers the number of available nodes; the
//! pass fails as soon as that number drops below the quorum.

use crate::domain::{
    DiscoveryConfig, DiscoveryError, DiscoveryQuorum, Roster, FROM_NODE_INDEX_PARAM,
    LIST_NODES_METHOD, NODE_CAPABILITIES_METHOD,
};
use crate::ports::{RpcChannel, SChainRpc};
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, warn};

type OpenChannel = (usize, String, Arc<dyn RpcChannel>);

/// Runs discovery passes against one seed endpoint.
pub struct DiscoveryService {
    rpc: Arc<dyn SChainRpc>,
    config: DiscoveryConfig,
}

impl DiscoveryService {
    /// Create a service over the given transport.
    pub fn new(rpc: Arc<dyn SChainRpc>, config: DiscoveryConfig) -> Self {
        Self { rpc, config }
    }

    /// Discovery configuration.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    fn call_params(&self) -> Value {
        json!({ FROM_NODE_INDEX_PARAM: self.config.node_index })
    }

    /// Ask the seed for the node list.
    async fn fetch_roster(&self, silent: bool) -> Result<Roster, DiscoveryError> {
        let endpoint = self.config.seed_endpoint.as_str();
        let seed_failed = |reason: String| {
            if !silent {
                error!(endpoint, %reason, "[ima-01] JSON RPC call to S-Chain failed");
            }
            DiscoveryError::SeedUnreachable {
                endpoint: endpoint.to_string(),
                reason,
            }
        };

        let channel = self
            .rpc
            .connect(endpoint)
            .await
            .map_err(|e| seed_failed(e.to_string()))?;
        let result = channel
            .call(LIST_NODES_METHOD, self.call_params())
            .await
            .map_err(|e| seed_failed(e.to_string()))?;

        match Roster::from_seed_result(&result) {
            Some(roster) if roster.total() > 0 => Ok(roster),
            _ => {
                if !silent {
                    error!(endpoint, "[ima-01] S-Chain network description was not detected");
                }
                Err(DiscoveryError::EmptyRoster)
            }
        }
    }

    /// Run one discovery pass.
    ///
    /// `previous` supplies capability records to carry forward by index;
    /// those nodes are not queried again. `min_quorum` overrides the default
    /// two-thirds threshold when positive. A `silent` pass logs its progress
    /// at debug level.
    ///
    /// The returned roster is not installed anywhere; the caller decides.
    pub async fn discover(
        &self,
        previous: Option<&Roster>,
        min_quorum: Option<usize>,
        silent: bool,
    ) -> Result<Roster, DiscoveryError> {
        let mut roster = self.fetch_roster(silent).await?;
        let total = roster.total();
        let mut quorum = DiscoveryQuorum::new(total, min_quorum);
        progress!(
            silent,
            total,
            required = quorum.required,
            "[ima-01] Will gather details of {} of {} node(s)",
            quorum.required,
            total
        );

        let mut targets = Vec::new();
        for (index, node) in roster.network.iter_mut().enumerate() {
            let carried = previous
                .and_then(|prev| prev.node(index))
                .filter(|prev| prev.is_fully_discovered());
            if let Some(prev) = carried {
                node.ima_info = prev.ima_info.clone();
                progress!(silent, index, "[ima-01] Node #{} will use previous discovery result", index);
                continue;
            }
            match node.rpc_endpoint() {
                Some(endpoint) => targets.push((index, endpoint)),
                None => {
                    quorum.record_failure();
                    if !silent {
                        warn!(index, "[ima-01] S-Chain node #{} has no usable endpoint", index);
                    }
                }
            }
        }

        let connects = targets.into_iter().map(|(index, endpoint)| async move {
            let channel = self.rpc.connect(&endpoint).await;
            (index, endpoint, channel)
        });
        let mut channels: Vec<OpenChannel> = Vec::new();
        for (index, endpoint, channel) in join_all(connects).await {
            match channel {
                Ok(channel) => channels.push((index, endpoint, channel)),
                Err(e) => {
                    quorum.record_failure();
                    if !silent {
                        warn!(index, %endpoint, error = %e, "[ima-01] JSON RPC call to S-Chain node failed");
                    }
                }
            }
        }

        progress!(
            silent,
            total,
            available = quorum.available(),
            required = quorum.required,
            "[ima-01] Waiting for S-Chain nodes, total {}, available {}, expected at least {}",
            total,
            quorum.available(),
            quorum.required
        );
        if !quorum.is_reachable() {
            return Err(quorum_breach(&quorum, silent));
        }

        self.await_capabilities(&mut roster, channels, quorum, silent)
            .await?;
        progress!(
            silent,
            discovered = roster.discovered_count(),
            total,
            "[ima-01] S-Chain network discovery pass done: {}",
            roster.discovery_summary()
        );
        Ok(roster)
    }

    /// Wait phase: query every open channel concurrently. A failed query
    /// counts against the quorum exactly like a failed connect. The wait
    /// ends once `required` nodes answered with a capability record, nothing
    /// is outstanding, or the poll budget is spent.
    async fn await_capabilities(
        &self,
        roster: &mut Roster,
        channels: Vec<OpenChannel>,
        mut quorum: DiscoveryQuorum,
        silent: bool,
    ) -> Result<(), DiscoveryError> {
        let total = roster.total();
        let required = quorum.required;
        let params = self.call_params();
        let mut pending: FuturesUnordered<_> = channels
            .into_iter()
            .map(|(index, endpoint, channel)| {
                let params = params.clone();
                async move {
                    let answer = channel.call(NODE_CAPABILITIES_METHOD, params).await;
                    (index, endpoint, answer)
                }
            })
            .collect();

        let budget = self.config.wait_attempts();
        let poll = self.config.poll_interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + poll, poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempt = 0u32;
        let mut answered = 0usize;

        loop {
            if answered >= required {
                return Ok(());
            }
            if pending.is_empty() {
                break;
            }
            tokio::select! {
                Some((index, endpoint, answer)) = pending.next() => {
                    match answer {
                        Ok(info) => {
                            if let Some(node) = roster.network.get_mut(index) {
                                node.ima_info = Some(info);
                                if node.is_fully_discovered() {
                                    answered += 1;
                                }
                            }
                            progress!(
                                silent,
                                index,
                                %endpoint,
                                "[ima-01] OK, got node #{} IMA information ({} of {})",
                                index,
                                answered,
                                total
                            );
                        }
                        Err(e) => {
                            quorum.record_failure();
                            if !silent {
                                warn!(index, %endpoint, error = %e, "[ima-01] S-Chain node capability query failed");
                            }
                            if !quorum.is_reachable() {
                                return Err(quorum_breach(&quorum, silent));
                            }
                        }
                    }
                }
                _ = ticker.tick() => {
                    attempt += 1;
                    progress!(
                        silent,
                        attempt,
                        budget,
                        total,
                        available = quorum.available(),
                        required,
                        "[ima-01] Waiting attempt {} of {} for {} node answer(s)",
                        attempt,
                        budget,
                        required.saturating_sub(answered)
                    );
                    if attempt >= budget {
                        break;
                    }
                }
            }
        }

        let discovered = roster.discovered_count();
        if discovered >= required {
            return Ok(());
        }
        if discovered > 0 {
            if !silent {
                warn!(
                    discovered,
                    required,
                    "[ima-01] S-Chain network discovery wait timeout, network will be re-discovered"
                );
            }
            Ok(())
        } else {
            Err(DiscoveryError::Timeout {
                total,
                required,
                answered,
            })
        }
    }

    /// Query every node once and fail on the first node that cannot be
    /// reached or refuses the capability query.
    pub async fn browse(&self) -> Result<Roster, DiscoveryError> {
        let mut roster = self.fetch_roster(false).await?;
        let targets: Vec<(usize, Option<String>)> = roster
            .network
            .iter()
            .enumerate()
            .map(|(index, node)| (index, node.rpc_endpoint()))
            .collect();
        let params = self.call_params();

        let queries = targets.into_iter().map(|(index, endpoint)| {
            let params = params.clone();
            async move {
                let endpoint = endpoint.ok_or_else(|| DiscoveryError::NodeUnreachable {
                    index,
                    endpoint: String::new(),
                    reason: "no endpoint in node description".to_string(),
                })?;
                let channel = self.rpc.connect(&endpoint).await.map_err(|e| {
                    DiscoveryError::NodeUnreachable {
                        index,
                        endpoint: endpoint.clone(),
                        reason: e.to_string(),
                    }
                })?;
                let info = channel
                    .call(NODE_CAPABILITIES_METHOD, params)
                    .await
                    .map_err(|e| {
                        if e.is_transport() {
                            DiscoveryError::NodeUnreachable {
                                index,
                                endpoint: endpoint.clone(),
                                reason: e.to_string(),
                            }
                        } else {
                            DiscoveryError::NodeQueryFailed {
                                index,
                                endpoint: endpoint.clone(),
                                reason: e.to_string(),
                            }
                        }
                    })?;
                Ok::<_, DiscoveryError>((index, info))
            }
        });

        for outcome in join_all(queries).await {
            let (index, info) = outcome.inspect_err(|e| error!("[ima-01] {}", e))?;
            if let Some(node) = roster.network.get_mut(index) {
                node.ima_info = Some(info);
            }
        }
        Ok(roster)
    }
}

fn quorum_breach(quorum: &DiscoveryQuorum, silent: bool) -> DiscoveryError {
    let err = DiscoveryError::QuorumUnreachable {
        total: quorum.total,
        available: quorum.available(),
        required: quorum.required,
    };
    if !silent {
        error!(
            total = quorum.total,
            available = quorum.available(),
            required = quorum.required,
            "[ima-01] {}",
            err
        );
    }
    err
}
