//! Advisory remote connection state.

use serde::{Deserialize, Serialize};

/// Last known reachability of the remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// No check has completed yet.
    #[default]
    Unknown,
    Reachable,
    /// Unconfigured, or the last check failed.
    Unreachable,
}
