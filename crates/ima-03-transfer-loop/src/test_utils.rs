//! Test utilities: a transfer collaborator whose outcome is scripted per
//! direction.

use crate::domain::{TransferDirection, TransferError, TransferErrorLog};
use crate::ports::TransferPort;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Records every call; fails the directions marked as failing.
#[derive(Debug, Default)]
pub struct ScriptedTransfer {
    failing: Mutex<HashSet<TransferDirection>>,
    calls: Mutex<Vec<TransferDirection>>,
    log: Arc<TransferErrorLog>,
}

impl ScriptedTransfer {
    /// Collaborator on which every direction succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `direction` fail from now on.
    pub fn fail(&self, direction: TransferDirection) {
        self.failing.lock().insert(direction);
    }

    /// Make `direction` succeed from now on.
    pub fn succeed(&self, direction: TransferDirection) {
        self.failing.lock().remove(&direction);
    }

    /// Directions invoked so far, in call order.
    pub fn calls(&self) -> Vec<TransferDirection> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TransferPort for ScriptedTransfer {
    async fn transfer(&self, direction: TransferDirection) -> Result<(), TransferError> {
        self.calls.lock().push(direction);
        if self.failing.lock().contains(&direction) {
            let err = TransferError::failed(direction, "scripted failure");
            self.log.record(err.to_string());
            return Err(err);
        }
        Ok(())
    }

    fn error_log(&self) -> Arc<TransferErrorLog> {
        Arc::clone(&self.log)
    }
}
