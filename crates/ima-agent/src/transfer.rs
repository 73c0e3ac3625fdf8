//! Transfer collaborator shipped with the binary.

use async_trait::async_trait;
use ima_03_transfer_loop::{TransferDirection, TransferError, TransferErrorLog, TransferPort};
use std::sync::Arc;
use tracing::debug;

/// Collaborator with no relay behind it: every direction succeeds and the
/// error history stays empty.
#[derive(Debug)]
pub struct IdleTransfer {
    log: Arc<TransferErrorLog>,
}

impl IdleTransfer {
    /// Collaborator exposing an empty history of `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            log: Arc::new(TransferErrorLog::new(capacity)),
        }
    }
}

#[async_trait]
impl TransferPort for IdleTransfer {
    async fn transfer(&self, direction: TransferDirection) -> Result<(), TransferError> {
        debug!(%direction, "[ima-agent] No relay attached, {} transfer is a no-op", direction);
        Ok(())
    }

    fn error_log(&self) -> Arc<TransferErrorLog> {
        Arc::clone(&self.log)
    }
}
