//! Dispatch table of the monitoring socket.

use super::MonitoringError;
use std::fmt;
use std::str::FromStr;

/// A recognised request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitoringMethod {
    /// Liveness probe; answers with the envelope only.
    Echo,
    /// Same as `Echo`.
    Ping,
    /// Current roster snapshot under `schain_network_info`.
    GetSChainNetworkInfo,
    /// Allow-listed configuration under `runtime_params`.
    GetRuntimeParams,
    /// Recent transfer failures under `last_transfer_errors`.
    GetLastTransferErrors,
}

impl MonitoringMethod {
    /// Every method, in table order.
    pub const ALL: [MonitoringMethod; 5] = [
        MonitoringMethod::Echo,
        MonitoringMethod::Ping,
        MonitoringMethod::GetSChainNetworkInfo,
        MonitoringMethod::GetRuntimeParams,
        MonitoringMethod::GetLastTransferErrors,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitoringMethod::Echo => "echo",
            MonitoringMethod::Ping => "ping",
            MonitoringMethod::GetSChainNetworkInfo => "get_schain_network_info",
            MonitoringMethod::GetRuntimeParams => "get_runtime_params",
            MonitoringMethod::GetLastTransferErrors => "get_last_transfer_errors",
        }
    }

    /// Answer field carrying this method's payload, if any.
    pub fn payload_field(&self) -> Option<&'static str> {
        match self {
            MonitoringMethod::Echo | MonitoringMethod::Ping => None,
            MonitoringMethod::GetSChainNetworkInfo => Some("schain_network_info"),
            MonitoringMethod::GetRuntimeParams => Some("runtime_params"),
            MonitoringMethod::GetLastTransferErrors => Some("last_transfer_errors"),
        }
    }
}

impl FromStr for MonitoringMethod {
    type Err = MonitoringError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == name)
            .ok_or_else(|| MonitoringError::UnknownMethod(name.to_string()))
    }
}

impl fmt::Display for MonitoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
