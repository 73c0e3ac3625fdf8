//! Process exit codes.
//!
//! Each start-up failure class has its own code so operators can tell them
//! apart from the exit status alone. Otherwise the process exits with the
//! number of failed actions.

use crate::runtime::AgentError;
use ima_01_schain_discovery::DiscoveryError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_SCHAIN_URL_MISSING: i32 = 154;
pub const EXIT_SEED_UNREACHABLE: i32 = 155;
pub const EXIT_EMPTY_ROSTER: i32 = 156;
pub const EXIT_NODE_UNREACHABLE: i32 = 157;
pub const EXIT_NODE_QUERY_FAILED: i32 = 158;
pub const EXIT_QUORUM_UNREACHABLE: i32 = 161;
pub const EXIT_DISCOVERY_TIMEOUT: i32 = 162;

/// Dedicated code of a discovery failure.
pub fn for_discovery_error(error: &DiscoveryError) -> i32 {
    match error {
        DiscoveryError::SeedUnreachable { .. } => EXIT_SEED_UNREACHABLE,
        DiscoveryError::EmptyRoster => EXIT_EMPTY_ROSTER,
        DiscoveryError::NodeUnreachable { .. } => EXIT_NODE_UNREACHABLE,
        DiscoveryError::NodeQueryFailed { .. } => EXIT_NODE_QUERY_FAILED,
        DiscoveryError::QuorumUnreachable { .. } => EXIT_QUORUM_UNREACHABLE,
        DiscoveryError::Timeout { .. } => EXIT_DISCOVERY_TIMEOUT,
    }
}

/// Dedicated code of an action failure, if it has one.
pub fn for_agent_error(error: &AgentError) -> Option<i32> {
    match error {
        AgentError::SChainUrlMissing => Some(EXIT_SCHAIN_URL_MISSING),
        AgentError::Discovery(e) => Some(for_discovery_error(e)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let mut codes = vec![
            EXIT_SCHAIN_URL_MISSING,
            EXIT_SEED_UNREACHABLE,
            EXIT_EMPTY_ROSTER,
            EXIT_NODE_UNREACHABLE,
            EXIT_NODE_QUERY_FAILED,
            EXIT_QUORUM_UNREACHABLE,
            EXIT_DISCOVERY_TIMEOUT,
        ];
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 7);
        assert!(!codes.contains(&EXIT_SUCCESS));
    }

    #[test]
    fn test_discovery_errors_map_to_codes() {
        let timeout = DiscoveryError::Timeout {
            total: 4,
            required: 3,
            answered: 0,
        };
        assert_eq!(for_discovery_error(&timeout), 162);
        assert_eq!(for_discovery_error(&DiscoveryError::EmptyRoster), 156);
        assert_eq!(
            for_agent_error(&AgentError::Discovery(DiscoveryError::QuorumUnreachable {
                total: 4,
                available: 2,
                required: 3,
            })),
            Some(161)
        );
    }

    #[test]
    fn test_url_missing_has_its_own_code() {
        assert_eq!(for_agent_error(&AgentError::SChainUrlMissing), Some(154));
    }
}
