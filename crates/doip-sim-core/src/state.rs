//! Service state of platforms and gateways

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a platform or gateway.
///
/// The uppercase token is the wire representation, both in resource JSON
/// and in the `?status=` overview filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceState {
    Stopped,
    Starting,
    Running,
    Stopping,
    /// The component failed to come up (e.g. its DoIP port was taken).
    Error,
}

impl ServiceState {
    /// Wire token for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Stopped => "STOPPED",
            ServiceState::Starting => "STARTING",
            ServiceState::Running => "RUNNING",
            ServiceState::Stopping => "STOPPING",
            ServiceState::Error => "ERROR",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown state token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseServiceStateError(pub String);

impl fmt::Display for ParseServiceStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown service state: {}", self.0)
    }
}

impl std::error::Error for ParseServiceStateError {}

impl FromStr for ServiceState {
    type Err = ParseServiceStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STOPPED" => Ok(ServiceState::Stopped),
            "STARTING" => Ok(ServiceState::Starting),
            "RUNNING" => Ok(ServiceState::Running),
            "STOPPING" => Ok(ServiceState::Stopping),
            "ERROR" => Ok(ServiceState::Error),
            other => Err(ParseServiceStateError(other.to_string())),
        }
    }
}
