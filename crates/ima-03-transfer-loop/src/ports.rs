//! # Ports
//!
//! The relay itself (message scanning, signing, submission) lives behind
//! [`TransferPort`]; this crate only decides when it runs.

use crate::domain::{TransferDirection, TransferError, TransferErrorLog};
use async_trait::async_trait;
use std::sync::Arc;

/// External bidirectional transfer collaborator.
#[async_trait]
pub trait TransferPort: Send + Sync {
    /// Relay pending messages in `direction` once.
    async fn transfer(&self, direction: TransferDirection) -> Result<(), TransferError>;

    /// History of recent failures, shared with the monitoring endpoint.
    fn error_log(&self) -> Arc<TransferErrorLog>;
}
