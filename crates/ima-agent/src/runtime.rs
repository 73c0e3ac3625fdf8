//! # Agent Runtime
//!
//! Wires the subsystems together and owns the shutdown channel.
//!
//! ## Startup Sequence
//!
//! 1. Bind the time-frame scheduler to the clock
//! 2. Open the monitoring endpoint over the still empty roster
//! 3. Wait for the S-Chain (StartupGate), unless disabled
//! 4. Initial discovery; a failure here closes the endpoint and ends the
//!    action
//! 5. Start rediscovery, the metrics sampler and the transfer loop

use crate::config::{AgentConfig, ConfigError};
use crate::sampler::MetricsSampler;
use ima_01_schain_discovery::{
    DiscoveryError, DiscoveryService, RediscoveryScheduler, Roster, RosterStore, RosterView,
    SChainRpc, StartupGate, DEFAULT_STARTUP_BACKOFF,
};
use ima_02_time_framing::{TimeFrameScheduler, TimeSource};
use ima_03_transfer_loop::{TransferLoop, TransferPort};
use ima_04_monitoring::{MonitoringError, MonitoringServer, MonitoringState};
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long the monitoring listener may take to drain on shutdown.
const MONITORING_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors that end an action.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("S-Chain URL was not specified")]
    SChainUrlMissing,

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Monitoring(#[from] MonitoringError),
}

/// The agent process minus its entry point.
pub struct AgentRuntime {
    config: AgentConfig,
    rpc: Arc<dyn SChainRpc>,
    transfer: Arc<dyn TransferPort>,
    clock: Arc<dyn TimeSource>,
    store: Arc<RosterStore>,
    startup_backoff: Duration,
    monitoring_addr: Option<SocketAddr>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl AgentRuntime {
    /// Assemble a runtime; nothing runs until [`AgentRuntime::start`].
    ///
    /// Monitoring listens on all interfaces at the configured port, or not
    /// at all when the port is `0`.
    pub fn new(
        config: AgentConfig,
        rpc: Arc<dyn SChainRpc>,
        transfer: Arc<dyn TransferPort>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let monitoring_addr = (config.monitoring_port != 0)
            .then(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.monitoring_port)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config,
            rpc,
            transfer,
            clock,
            store: Arc::new(RosterStore::new()),
            startup_backoff: DEFAULT_STARTUP_BACKOFF,
            monitoring_addr,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// Override the pause between start-up readiness probes.
    pub fn with_startup_backoff(mut self, backoff: Duration) -> Self {
        self.startup_backoff = backoff;
        self
    }

    /// Serve monitoring on `addr` regardless of the configured port.
    pub fn with_monitoring_addr(mut self, addr: SocketAddr) -> Self {
        self.monitoring_addr = Some(addr);
        self
    }

    /// Configuration the runtime was built with.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Roster shared with rediscovery and the monitoring endpoint.
    pub fn store(&self) -> Arc<RosterStore> {
        Arc::clone(&self.store)
    }

    fn discovery(&self) -> Option<Arc<DiscoveryService>> {
        self.config
            .discovery_config()
            .map(|config| Arc::new(DiscoveryService::new(Arc::clone(&self.rpc), config)))
    }

    /// Strict one-shot query of every node.
    pub async fn browse(&self) -> Result<Roster, AgentError> {
        let discovery = self.discovery().ok_or(AgentError::SChainUrlMissing)?;
        Ok(discovery.browse().await?)
    }

    /// Run the start-up sequence and spawn the long-lived tasks.
    pub async fn start(&self) -> Result<RunningAgent, AgentError> {
        info!("===========================================");
        info!("  IMA Agent v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let framing = TimeFrameScheduler::new(self.config.frame_config(), Arc::clone(&self.clock))
            .map_err(ConfigError::from)?;
        let framing = Arc::new(framing);

        let monitoring = self.start_monitoring().await?;

        let scheduler = match self.discovery() {
            Some(discovery) => match self.discover_network(discovery).await {
                Ok(scheduler) => Some(scheduler),
                Err(e) => {
                    if let Some(server) = monitoring {
                        server.abort().await;
                    }
                    return Err(e);
                }
            },
            None => {
                warn!("[ima-agent] S-Chain URL was not specified, S-Chain network discovery skipped");
                None
            }
        };

        let transfer_loop = Arc::new(TransferLoop::new(
            Arc::clone(&self.transfer),
            framing,
            self.config.loop_period(),
        ));

        let sampler = MetricsSampler::new(
            Arc::clone(&self.store) as Arc<dyn RosterView>,
            scheduler.clone(),
            Arc::clone(&transfer_loop),
        );
        let tasks = vec![
            tokio::spawn(sampler.run(self.shutdown_rx.clone())),
            tokio::spawn(
                Arc::clone(&transfer_loop)
                    .run_forever(self.config.delay_first_run, self.shutdown_rx.clone()),
            ),
        ];

        info!("[ima-agent] All subsystems started");
        Ok(RunningAgent {
            scheduler,
            transfer_loop,
            monitoring,
            tasks,
            shutdown_tx: Arc::clone(&self.shutdown_tx),
        })
    }

    async fn start_monitoring(&self) -> Result<Option<MonitoringServer>, AgentError> {
        let Some(addr) = self.monitoring_addr else {
            info!("[ima-agent] Monitoring endpoint disabled");
            return Ok(None);
        };
        let state = MonitoringState::new(
            Arc::clone(&self.store) as Arc<dyn RosterView>,
            self.config.runtime_params(),
            self.transfer.error_log(),
        );
        let server = MonitoringServer::bind(addr, Arc::new(state), self.shutdown_rx.clone()).await?;
        Ok(Some(server))
    }

    async fn discover_network(
        &self,
        discovery: Arc<DiscoveryService>,
    ) -> Result<Arc<RediscoveryScheduler>, AgentError> {
        if self.config.no_wait_schain_started {
            info!("[ima-agent] Not waiting for S-Chain to start");
        } else {
            let outcome = StartupGate::new(Arc::clone(&discovery))
                .with_backoff(self.startup_backoff)
                .await_ready(self.config.max_wait_schain_attempts)
                .await;
            if !outcome.is_ready() {
                warn!(?outcome, "[ima-agent] S-Chain did not answer, continuing start-up");
            }
        }

        info!("[ima-agent] Will discover S-Chain network");
        let roster = discovery.discover(None, None, false).await.inspect_err(|e| {
            error!(error = %e, "[ima-agent] Failed to discover S-Chain network");
        })?;
        let installed = self.store.install(roster);
        info!(
            discovered = installed.discovered_count(),
            total = installed.total(),
            "[ima-agent] S-Chain network discovered: {}",
            installed.discovery_summary()
        );

        let scheduler = RediscoveryScheduler::new(
            discovery,
            Arc::clone(&self.store),
            self.config.min_quorum(),
        );
        scheduler.start(self.config.silent_rediscovery);
        Ok(scheduler)
    }

    /// Start, wait for `signal`, then shut down.
    pub async fn run<F>(&self, signal: F) -> Result<(), AgentError>
    where
        F: Future<Output = ()>,
    {
        let running = self.start().await?;
        info!("[ima-agent] Agent is running. Press Ctrl+C to stop.");
        signal.await;
        running.shutdown().await;
        Ok(())
    }
}

/// Handles of a started agent.
pub struct RunningAgent {
    scheduler: Option<Arc<RediscoveryScheduler>>,
    transfer_loop: Arc<TransferLoop>,
    monitoring: Option<MonitoringServer>,
    tasks: Vec<JoinHandle<()>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl RunningAgent {
    /// Rediscovery scheduler, absent without an S-Chain URL.
    pub fn scheduler(&self) -> Option<&Arc<RediscoveryScheduler>> {
        self.scheduler.as_ref()
    }

    /// The transfer loop driven by this agent.
    pub fn transfer_loop(&self) -> &Arc<TransferLoop> {
        &self.transfer_loop
    }

    /// Bound monitoring address, if the endpoint is enabled.
    pub fn monitoring_addr(&self) -> Option<SocketAddr> {
        self.monitoring.as_ref().map(MonitoringServer::local_addr)
    }

    /// Broadcast shutdown and wait for the tasks to finish.
    pub async fn shutdown(self) {
        info!("[ima-agent] Initiating graceful shutdown...");
        if self.shutdown_tx.send(true).is_err() {
            warn!("[ima-agent] No task was listening for shutdown");
        }
        if let Some(scheduler) = &self.scheduler {
            scheduler.stop();
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "[ima-agent] Task ended abnormally");
            }
        }
        if let Some(server) = self.monitoring {
            server.abort_after(MONITORING_DRAIN_TIMEOUT).await;
        }
        info!("[ima-agent] Shutdown complete");
    }
}
