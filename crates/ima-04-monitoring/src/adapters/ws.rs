//! One monitoring WebSocket connection.

use crate::domain::MonitoringError;
use crate::service::MonitoringState;
use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Serves request/answer exchanges on a single socket.
pub struct MonitoringConnection {
    state: Arc<MonitoringState>,
    peer: SocketAddr,
}

impl MonitoringConnection {
    /// Connection from `peer`, answering from `state`.
    pub fn new(state: Arc<MonitoringState>, peer: SocketAddr) -> Self {
        Self { state, peer }
    }

    /// Answer every text or binary frame until the peer goes away.
    ///
    /// A failed send ends this connection only.
    pub async fn handle(self, mut socket: WebSocket) {
        info!(peer = %self.peer, "[ima-04] New monitoring connection");

        while let Some(result) = socket.next().await {
            let answer = match result {
                Ok(Message::Text(text)) => self.state.handle_message(&text),
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => self.state.handle_message(&text),
                    Err(_) => not_utf8_answer(),
                },
                // Pongs are sent by axum itself
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    debug!(peer = %self.peer, error = %e, "[ima-04] Monitoring socket error");
                    break;
                }
            };

            if let Err(e) = socket.send(Message::Text(answer)).await {
                warn!(peer = %self.peer, error = %e, "[ima-04] Failed to send answer");
                break;
            }
        }

        debug!(peer = %self.peer, "[ima-04] Monitoring connection closed");
    }
}

fn not_utf8_answer() -> String {
    let error = MonitoringError::MalformedRequest("binary frame is not UTF-8".to_string());
    json!({ "method": null, "id": null, "error": error.to_string() }).to_string()
}
