//! Request dispatch.
//!
//! Every inbound message gets exactly one answer of the form
//! `{method, id, error, ...payload}`. Failures are reported in `error` and
//! never escape to the connection.

use crate::domain::{MonitoringError, MonitoringMethod};
use ima_01_schain_discovery::RosterView;
use ima_03_transfer_loop::TransferErrorLog;
use ima_telemetry::{metric_inc, MONITORING_REQUESTS};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{trace, warn};

/// Read-only sources the endpoint serves from.
pub struct MonitoringState {
    roster: Arc<dyn RosterView>,
    runtime_params: Map<String, Value>,
    transfer_errors: Arc<TransferErrorLog>,
}

impl MonitoringState {
    /// State over the live roster, a fixed parameter map and the transfer
    /// error history.
    pub fn new(
        roster: Arc<dyn RosterView>,
        runtime_params: Map<String, Value>,
        transfer_errors: Arc<TransferErrorLog>,
    ) -> Self {
        Self {
            roster,
            runtime_params,
            transfer_errors,
        }
    }

    /// Answer one raw message.
    pub fn handle_message(&self, text: &str) -> String {
        self.answer(text).to_string()
    }

    /// Answer one raw message as JSON.
    pub fn answer(&self, text: &str) -> Value {
        let mut answer = Map::new();
        answer.insert("method".to_string(), Value::Null);
        answer.insert("id".to_string(), Value::Null);
        answer.insert("error".to_string(), Value::Null);

        let outcome = self.dispatch(text, &mut answer);
        let label = match &outcome {
            Ok(method) => method.as_str(),
            Err(MonitoringError::UnknownMethod(_)) => "unknown",
            Err(_) => "malformed",
        };
        metric_inc!(MONITORING_REQUESTS, &[label]);

        if let Err(e) = outcome {
            warn!(error = %e, message = text, "[ima-04] Bad monitoring message");
            answer.insert("error".to_string(), Value::String(e.to_string()));
        }
        let answer = Value::Object(answer);
        trace!(%answer, "[ima-04] Monitoring answer");
        answer
    }

    fn dispatch(
        &self,
        text: &str,
        answer: &mut Map<String, Value>,
    ) -> Result<MonitoringMethod, MonitoringError> {
        let request: Value = serde_json::from_str(text)
            .map_err(|e| MonitoringError::MalformedRequest(e.to_string()))?;
        let Value::Object(request) = request else {
            return Err(MonitoringError::MalformedRequest(
                "request is not a JSON object".to_string(),
            ));
        };

        if let Some(method) = request.get("method") {
            answer.insert("method".to_string(), method.clone());
        }
        if let Some(id) = request.get("id") {
            answer.insert("id".to_string(), id.clone());
        }
        let name = request
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| MonitoringError::MalformedRequest("missing method".to_string()))?;
        if !request.contains_key("id") {
            return Err(MonitoringError::MalformedRequest("missing id".to_string()));
        }

        let method: MonitoringMethod = name.parse()?;
        if let Some(field) = method.payload_field() {
            answer.insert(field.to_string(), self.payload(method));
        }
        Ok(method)
    }

    fn payload(&self, method: MonitoringMethod) -> Value {
        match method {
            MonitoringMethod::Echo | MonitoringMethod::Ping => Value::Null,
            MonitoringMethod::GetSChainNetworkInfo => self
                .roster
                .snapshot()
                .and_then(|roster| serde_json::to_value(roster.as_ref()).ok())
                .unwrap_or(Value::Null),
            MonitoringMethod::GetRuntimeParams => Value::Object(self.runtime_params.clone()),
            MonitoringMethod::GetLastTransferErrors => {
                serde_json::to_value(self.transfer_errors.snapshot())
                    .unwrap_or_else(|_| Value::Array(Vec::new()))
            }
        }
    }
}
