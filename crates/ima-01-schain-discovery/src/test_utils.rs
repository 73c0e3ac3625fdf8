//! Test utilities: a scriptable in-memory S-Chain.
//!
//! `MockSChainRpc` plays both the seed endpoint and every node endpoint.
//! Each endpoint's behaviour can be changed between passes, and every
//! `connect` and `call` is counted so tests can assert on network traffic.

use crate::domain::{NodeDescriptor, LIST_NODES_METHOD, NODE_CAPABILITIES_METHOD};
use crate::ports::{RpcChannel, RpcError, SChainRpc};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Seed endpoint used by the helpers.
pub const MOCK_SEED_ENDPOINT: &str = "http://127.0.0.1:2231";

/// How an endpoint reacts.
#[derive(Debug, Clone)]
pub enum EndpointBehavior {
    /// Answer immediately with this `result`.
    Answer(Value),
    /// Answer with this `result` after a delay.
    Delayed(Duration, Value),
    /// Fail to open a channel.
    Unreachable,
    /// Answer with a JSON-RPC error.
    RemoteError,
    /// Never answer.
    Hang,
}

#[derive(Default)]
struct MockState {
    behaviors: HashMap<String, EndpointBehavior>,
    connects: HashMap<String, usize>,
    calls: HashMap<String, usize>,
}

/// In-memory seed plus nodes.
#[derive(Clone)]
pub struct MockSChainRpc {
    seed_endpoint: String,
    state: Arc<Mutex<MockState>>,
}

/// Endpoint of the `index`-th mock node.
pub fn node_endpoint(index: usize) -> String {
    format!("http://10.0.0.{}:2231", index + 1)
}

/// Capability record a healthy mock node answers with.
pub fn capability_record(index: usize) -> Value {
    json!({ "t": 2, "nodeIndex": index, "n": 16 })
}

/// `count` address-only descriptors pointing at the mock node endpoints.
pub fn mock_roster_nodes(count: usize) -> Vec<NodeDescriptor> {
    (0..count)
        .map(|i| NodeDescriptor::with_url(i as u64, node_endpoint(i)))
        .collect()
}

impl MockSChainRpc {
    /// Empty mock: the seed answers with `null`.
    pub fn new(seed_endpoint: impl Into<String>) -> Self {
        let mock = Self {
            seed_endpoint: seed_endpoint.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        };
        mock.set_seed(EndpointBehavior::Answer(Value::Null));
        mock
    }

    /// Seed listing `count` nodes, all of which answer their capability query.
    pub fn with_healthy_nodes(count: usize) -> Self {
        let mock = Self::new(MOCK_SEED_ENDPOINT);
        mock.set_roster(mock_roster_nodes(count));
        for i in 0..count {
            mock.set_node(i, EndpointBehavior::Answer(capability_record(i)));
        }
        mock
    }

    /// Seed endpoint URL.
    pub fn seed_endpoint(&self) -> &str {
        &self.seed_endpoint
    }

    /// Make the seed answer with the given node list.
    pub fn set_roster(&self, nodes: Vec<NodeDescriptor>) {
        let network = serde_json::to_value(nodes).unwrap_or(Value::Null);
        self.set_seed(EndpointBehavior::Answer(json!({ "network": network })));
    }

    /// Change the seed's behaviour.
    pub fn set_seed(&self, behavior: EndpointBehavior) {
        let endpoint = self.seed_endpoint.clone();
        self.state.lock().behaviors.insert(endpoint, behavior);
    }

    /// Change the `index`-th node's behaviour.
    pub fn set_node(&self, index: usize, behavior: EndpointBehavior) {
        self.state
            .lock()
            .behaviors
            .insert(node_endpoint(index), behavior);
    }

    /// `listNodes` calls the seed received.
    pub fn seed_calls(&self) -> usize {
        self.calls_to(&self.seed_endpoint)
    }

    /// Capability queries the `index`-th node received.
    pub fn node_calls(&self, index: usize) -> usize {
        self.calls_to(&node_endpoint(index))
    }

    /// Capability queries across all nodes.
    pub fn total_node_calls(&self) -> usize {
        let state = self.state.lock();
        state
            .calls
            .iter()
            .filter(|(endpoint, _)| **endpoint != self.seed_endpoint)
            .map(|(_, count)| *count)
            .sum()
    }

    /// Channel openings towards the `index`-th node.
    pub fn node_connects(&self, index: usize) -> usize {
        self.state
            .lock()
            .connects
            .get(&node_endpoint(index))
            .copied()
            .unwrap_or(0)
    }

    fn calls_to(&self, endpoint: &str) -> usize {
        self.state.lock().calls.get(endpoint).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SChainRpc for MockSChainRpc {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn RpcChannel>, RpcError> {
        let mut state = self.state.lock();
        *state.connects.entry(endpoint.to_string()).or_default() += 1;
        match state.behaviors.get(endpoint) {
            None => Err(RpcError::Transport(format!("no route to {}", endpoint))),
            Some(EndpointBehavior::Unreachable) => {
                Err(RpcError::Transport(format!("connection refused by {}", endpoint)))
            }
            Some(_) => Ok(Arc::new(MockChannel {
                endpoint: endpoint.to_string(),
                state: Arc::clone(&self.state),
            })),
        }
    }
}

struct MockChannel {
    endpoint: String,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl RpcChannel for MockChannel {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        if method != LIST_NODES_METHOD && method != NODE_CAPABILITIES_METHOD {
            return Err(RpcError::Remote {
                code: -32601,
                message: format!("method not found: {}", method),
            });
        }
        if params.get("fromNodeIndex").is_none() {
            return Err(RpcError::Remote {
                code: -32602,
                message: "missing fromNodeIndex".to_string(),
            });
        }
        let behavior = {
            let mut state = self.state.lock();
            *state.calls.entry(self.endpoint.clone()).or_default() += 1;
            state.behaviors.get(&self.endpoint).cloned()
        };
        match behavior {
            Some(EndpointBehavior::Answer(value)) => Ok(value),
            Some(EndpointBehavior::Delayed(delay, value)) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Some(EndpointBehavior::RemoteError) => Err(RpcError::Remote {
                code: -32000,
                message: "node is not ready".to_string(),
            }),
            Some(EndpointBehavior::Hang) => std::future::pending().await,
            Some(EndpointBehavior::Unreachable) | None => {
                Err(RpcError::Transport(format!("connection reset by {}", self.endpoint)))
            }
        }
    }
}
