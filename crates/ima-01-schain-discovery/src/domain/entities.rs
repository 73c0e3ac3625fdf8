//! # Domain Entities
//!
//! Node descriptors and the roster they form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write as _;

/// Capability field whose numeric presence marks a node as fully discovered.
pub const DISCOVERY_MARKER_FIELD: &str = "t";

/// One physical S-Chain participant as reported by the seed.
///
/// Address fields mirror the upstream node list; anything not modelled
/// explicitly is kept in `extra` so snapshots round-trip to operators intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Stable node identifier.
    #[serde(rename = "nodeID", default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<u64>,
    /// IPv4/IPv6 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Host name, used when `ip` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// HTTP JSON-RPC port.
    #[serde(rename = "httpRpcPort", default, skip_serializing_if = "Option::is_none")]
    pub http_rpc_port: Option<u16>,
    /// Generic port, used when `httpRpcPort` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Explicit endpoint URL; wins over host/port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Capability record returned by the node itself.
    #[serde(rename = "imaInfo", default, skip_serializing_if = "Option::is_none")]
    pub ima_info: Option<Value>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeDescriptor {
    /// Descriptor reachable at an explicit URL.
    pub fn with_url(node_id: u64, url: impl Into<String>) -> Self {
        Self {
            node_id: Some(node_id),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Descriptor reachable at `http://ip:port`.
    pub fn with_address(node_id: u64, ip: impl Into<String>, port: u16) -> Self {
        Self {
            node_id: Some(node_id),
            ip: Some(ip.into()),
            http_rpc_port: Some(port),
            ..Self::default()
        }
    }

    /// JSON-RPC endpoint of this node, if enough address data is present.
    pub fn rpc_endpoint(&self) -> Option<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }
        let host = self
            .ip
            .as_deref()
            .or(self.host.as_deref())
            .filter(|h| !h.is_empty())?;
        let port = self.http_rpc_port.or(self.port)?;
        if host.contains(':') {
            Some(format!("http://[{}]:{}", host, port))
        } else {
            Some(format!("http://{}:{}", host, port))
        }
    }

    /// Whether the capability record carries the numeric discovery marker.
    pub fn is_fully_discovered(&self) -> bool {
        self.ima_info
            .as_ref()
            .and_then(|info| info.get(DISCOVERY_MARKER_FIELD))
            .is_some_and(Value::is_number)
    }

    /// Endpoint text for log lines.
    pub fn describe_endpoint(&self) -> String {
        self.rpc_endpoint()
            .unwrap_or_else(|| "<no endpoint>".to_string())
    }
}

/// Ordered S-Chain membership; index is the position in the seed's list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    /// Node descriptors in upstream order.
    pub network: Vec<NodeDescriptor>,
    /// Other fields of the seed's network description.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Roster {
    /// Roster over the given nodes.
    pub fn new(network: Vec<NodeDescriptor>) -> Self {
        Self {
            network,
            extra: Map::new(),
        }
    }

    /// Decode the seed's `result` object.
    ///
    /// Returns `None` when there is no `network` list. Entries that are `null`
    /// or malformed become address-less descriptors so indices stay stable.
    pub fn from_seed_result(result: &Value) -> Option<Self> {
        let object = result.as_object()?;
        let entries = object.get("network")?.as_array()?;
        let network = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                if entry.is_null() {
                    return NodeDescriptor::default();
                }
                serde_json::from_value(entry.clone()).unwrap_or_else(|e| {
                    tracing::warn!(index, error = %e, "[ima-01] Malformed node descriptor");
                    NodeDescriptor::default()
                })
            })
            .collect();
        let extra = object
            .iter()
            .filter(|(key, _)| key.as_str() != "network")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self { network, extra })
    }

    /// Number of nodes.
    pub fn total(&self) -> usize {
        self.network.len()
    }

    /// Number of nodes carrying the discovery marker.
    pub fn discovered_count(&self) -> usize {
        self.network
            .iter()
            .filter(|node| node.is_fully_discovered())
            .count()
    }

    /// Whether every node is discovered. An empty roster counts as complete.
    pub fn is_fully_discovered(&self) -> bool {
        self.discovered_count() >= self.total()
    }

    /// Node at `index`.
    pub fn node(&self, index: usize) -> Option<&NodeDescriptor> {
        self.network.get(index)
    }

    /// Indices and descriptors of nodes still lacking a capability record.
    pub fn unknown_nodes(&self) -> impl Iterator<Item = (usize, &NodeDescriptor)> {
        self.network
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_fully_discovered())
    }

    /// One-line progress summary, e.g.
    /// `3 of 4 discovered, 1 still unknown (#3(http://10.0.0.4:2231))`.
    pub fn discovery_summary(&self) -> String {
        let total = self.total();
        let discovered = self.discovered_count();
        let mut summary = format!("{} of {} discovered", discovered, total);
        let unknown = total.saturating_sub(discovered);
        if unknown > 0 {
            let _ = write!(summary, ", {} still unknown (", unknown);
            for (n, (index, node)) in self.unknown_nodes().enumerate() {
                if n > 0 {
                    summary.push_str(", ");
                }
                let _ = write!(summary, "#{}({})", index, node.describe_endpoint());
            }
            summary.push(')');
        }
        summary
    }
}
