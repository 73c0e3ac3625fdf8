//! Transfer directions.

use serde::Serialize;
use std::fmt;

/// One leg of a transfer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransferDirection {
    /// Main net to S-Chain.
    #[serde(rename = "M2S")]
    MainToSChain,
    /// S-Chain to main net.
    #[serde(rename = "S2M")]
    SChainToMain,
}

impl TransferDirection {
    /// Both directions in cycle order.
    pub const CYCLE: [Self; 2] = [Self::MainToSChain, Self::SChainToMain];

    /// Short operator-facing name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainToSChain => "M2S",
            Self::SChainToMain => "S2M",
        }
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
