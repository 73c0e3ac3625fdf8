//! Listener: `/` upgrades to the monitoring socket, `/metrics` serves the
//! Prometheus text exposition.

use super::ws::MonitoringConnection;
use crate::domain::MonitoringError;
use crate::service::MonitoringState;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ConnectInfo;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Build the monitoring router.
pub fn build_router(state: Arc<MonitoringState>) -> Router {
    Router::new()
        .route(
            "/",
            get(
                move |ws: WebSocketUpgrade, ConnectInfo(peer): ConnectInfo<SocketAddr>| async move {
                    ws.on_upgrade(move |socket| async move {
                        MonitoringConnection::new(state, peer).handle(socket).await;
                    })
                },
            ),
        )
        .route("/metrics", get(metrics))
}

async fn metrics() -> Response {
    match ima_telemetry::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// A running monitoring listener.
pub struct MonitoringServer {
    local_addr: SocketAddr,
    handle: JoinHandle<Result<(), MonitoringError>>,
}

impl MonitoringServer {
    /// Bind `addr` and start serving until `shutdown` flips to `true`.
    ///
    /// Port `0` picks a free port; see [`MonitoringServer::local_addr`].
    pub async fn bind(
        addr: SocketAddr,
        state: Arc<MonitoringState>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Self, MonitoringError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| MonitoringError::Bind {
                addr,
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr().map_err(|e| MonitoringError::Bind {
            addr,
            reason: e.to_string(),
        })?;
        info!(addr = %local_addr, "[ima-04] Monitoring server listening");

        let router = build_router(state);
        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                while !*shutdown.borrow() {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await
            .map_err(|e| {
                error!(error = %e, "[ima-04] Monitoring server failed");
                MonitoringError::Serve(e.to_string())
            })
        });

        Ok(Self { local_addr, handle })
    }

    /// Address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the listener to stop.
    pub async fn join(self) -> Result<(), MonitoringError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(MonitoringError::Serve(e.to_string())),
        }
    }

    /// Stop serving right away, without waiting for a shutdown signal.
    ///
    /// Returns once the listening socket is closed.
    pub async fn abort(self) {
        self.handle.abort();
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                warn!(error = %e, "[ima-04] Monitoring server ended abnormally");
            }
        }
        debug!("[ima-04] Monitoring server aborted");
    }

    /// Give the listener `grace` to drain after shutdown was signalled, then
    /// drop it together with any connection still open.
    pub async fn abort_after(self, grace: Duration) {
        let abort = self.handle.abort_handle();
        match tokio::time::timeout(grace, self.join()).await {
            Ok(Ok(())) => debug!("[ima-04] Monitoring server stopped"),
            Ok(Err(e)) => warn!(error = %e, "[ima-04] Monitoring server stopped with error"),
            Err(_) => {
                abort.abort();
                debug!("[ima-04] Monitoring server aborted with open connections");
            }
        }
    }
}
