//! # Agent Configuration
//!
//! Every setting comes from a command-line flag or its environment variable
//! and is fixed for the life of the process. Components receive the parts
//! they need at construction.

use clap::{ArgAction, Args};
use ima_01_schain_discovery::{DiscoveryConfig, DEFAULT_WAIT_SAFETY_MARGIN};
use ima_02_time_framing::{FrameConfig, FrameConfigError, DEFAULT_FRAME_GAP_SECS};
use ima_03_transfer_loop::DEFAULT_ERROR_LOG_CAPACITY;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Time-framing parameters are inconsistent.
    #[error(transparent)]
    Frame(#[from] FrameConfigError),

    /// The discovery wait phase cannot poll at zero interval.
    #[error("discovery poll interval must be positive")]
    ZeroPollInterval,
}

/// Agent settings.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// S-Chain JSON-RPC URL, used as the discovery seed
    #[arg(long = "url-s-chain", env = "URL_W3_S_CHAIN")]
    pub url_schain: Option<String>,

    /// Main net JSON-RPC URL
    #[arg(long = "url-main-net", env = "URL_W3_ETHEREUM")]
    pub url_main_net: Option<String>,

    /// Main net chain name
    #[arg(long = "id-main-net", env = "IMA_CHAIN_NAME_MAIN_NET", default_value = "Mainnet")]
    pub chain_name_main_net: String,

    /// S-Chain name
    #[arg(long = "id-s-chain", env = "IMA_CHAIN_NAME_S_CHAIN", default_value = "id-S-chain")]
    pub chain_name_schain: String,

    /// This agent's 0-based node index
    #[arg(long = "node-number", env = "IMA_NODE_NUMBER", default_value_t = 0)]
    pub node_index: u64,

    /// Number of S-Chain nodes sharing the transfer schedule
    #[arg(long = "nodes-count", env = "IMA_NODES_COUNT", default_value_t = 1)]
    pub node_count: u64,

    /// Time frame length in seconds; 0 disables time framing
    #[arg(long = "time-framing", env = "IMA_TIME_FRAMING", default_value_t = 0)]
    pub time_frame_secs: u64,

    /// Seconds at the end of each frame in which no transfer is started
    #[arg(long = "time-gap", env = "IMA_TIME_GAP", default_value_t = DEFAULT_FRAME_GAP_SECS)]
    pub next_frame_gap_secs: u64,

    /// Pause between transfer cycles in seconds
    #[arg(long = "period", env = "IMA_LOOP_PERIOD", default_value_t = 10)]
    pub loop_period_secs: u64,

    /// S-Chain rediscovery interval in milliseconds; 0 disables rediscovery
    #[arg(long = "s-chain-rediscovery-interval", env = "IMA_REDISCOVERY_INTERVAL_MS", default_value_t = 10_000)]
    pub rediscovery_interval_ms: u64,

    /// Wait-phase attempts kept in reserve below one rediscovery interval
    #[arg(long = "discovery-safety-margin", env = "IMA_DISCOVERY_SAFETY_MARGIN", default_value_t = DEFAULT_WAIT_SAFETY_MARGIN)]
    pub wait_safety_margin: u32,

    /// Wait-phase poll interval in milliseconds
    #[arg(long = "discovery-poll-interval", env = "IMA_DISCOVERY_POLL_MS", default_value_t = 1_000)]
    pub discovery_poll_ms: u64,

    /// Minimum number of discovered nodes; 0 means two thirds of the roster
    #[arg(long = "discovery-quorum", env = "IMA_DISCOVERY_QUORUM", default_value_t = 0)]
    pub discovery_quorum: usize,

    /// Log periodic rediscovery progress at debug level only
    #[arg(long = "silent-rediscovery", env = "IMA_SILENT_REDISCOVERY", default_value_t = true, action = ArgAction::Set)]
    pub silent_rediscovery: bool,

    /// Monitoring WebSocket port; 0 disables the endpoint
    #[arg(long = "monitoring-port", env = "IMA_MONITORING_PORT", default_value_t = 0)]
    pub monitoring_port: u16,

    /// Do not wait for the S-Chain to answer before starting
    #[arg(long = "no-wait-s-chain", env = "IMA_NO_WAIT_S_CHAIN")]
    pub no_wait_schain_started: bool,

    /// Give up waiting for the S-Chain after this many attempts
    #[arg(long = "max-wait-s-chain-attempts", env = "IMA_MAX_WAIT_S_CHAIN_ATTEMPTS")]
    pub max_wait_schain_attempts: Option<u32>,

    /// Defer the first transfer cycle by one loop period
    #[arg(long = "delay-first-run", env = "IMA_DELAY_FIRST_RUN")]
    pub delay_first_run: bool,

    /// Transfer failures kept for the monitoring endpoint
    #[arg(long = "error-history", env = "IMA_ERROR_HISTORY", default_value_t = DEFAULT_ERROR_LOG_CAPACITY)]
    pub error_history: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url_schain: None,
            url_main_net: None,
            chain_name_main_net: "Mainnet".to_string(),
            chain_name_schain: "id-S-chain".to_string(),
            node_index: 0,
            node_count: 1,
            time_frame_secs: 0,
            next_frame_gap_secs: DEFAULT_FRAME_GAP_SECS,
            loop_period_secs: 10,
            rediscovery_interval_ms: 10_000,
            wait_safety_margin: DEFAULT_WAIT_SAFETY_MARGIN,
            discovery_poll_ms: 1_000,
            discovery_quorum: 0,
            silent_rediscovery: true,
            monitoring_port: 0,
            no_wait_schain_started: false,
            max_wait_schain_attempts: None,
            delay_first_run: false,
            error_history: DEFAULT_ERROR_LOG_CAPACITY,
        }
    }
}

impl AgentConfig {
    /// Reject settings no component could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frame_config().validate()?;
        if self.discovery_poll_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Time-framing parameters.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig::new(
            self.node_index,
            self.node_count,
            self.time_frame_secs,
            self.next_frame_gap_secs,
        )
    }

    /// Discovery parameters, or `None` without an S-Chain URL.
    pub fn discovery_config(&self) -> Option<DiscoveryConfig> {
        let seed_endpoint = self.url_schain.clone().filter(|url| !url.is_empty())?;
        Some(DiscoveryConfig {
            seed_endpoint,
            node_index: self.node_index,
            repeat_interval: Duration::from_millis(self.rediscovery_interval_ms),
            poll_interval: Duration::from_millis(self.discovery_poll_ms),
            wait_safety_margin: self.wait_safety_margin,
        })
    }

    /// Quorum override, `None` for the two-thirds default.
    pub fn min_quorum(&self) -> Option<usize> {
        (self.discovery_quorum > 0).then_some(self.discovery_quorum)
    }

    /// Pause between transfer cycles.
    pub fn loop_period(&self) -> Duration {
        Duration::from_secs(self.loop_period_secs)
    }

    /// The settings operators may read through the monitoring endpoint.
    pub fn runtime_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        let mut put = |key: &str, value: Value| {
            params.insert(key.to_string(), value);
        };
        put("no_wait_schain_started", json!(self.no_wait_schain_started));
        put("max_wait_schain_attempts", json!(self.max_wait_schain_attempts));
        put("url_main_net", json!(self.url_main_net));
        put("url_schain", json!(self.url_schain));
        put("chain_name_main_net", json!(self.chain_name_main_net));
        put("chain_name_schain", json!(self.chain_name_schain));
        put("loop_period_secs", json!(self.loop_period_secs));
        put("node_index", json!(self.node_index));
        put("node_count", json!(self.node_count));
        put("time_frame_secs", json!(self.time_frame_secs));
        put("next_frame_gap_secs", json!(self.next_frame_gap_secs));
        put("rediscovery_interval_ms", json!(self.rediscovery_interval_ms));
        put("discovery_quorum", json!(self.discovery_quorum));
        put("monitoring_port", json!(self.monitoring_port));
        params
    }
}
