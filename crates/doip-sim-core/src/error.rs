//! Common error types for simulation backends

use thiserror::Error;

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimulationError>;

/// Errors that can occur in the simulation domain
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Platform not found
    #[error("Platform not found: {0}")]
    PlatformNotFound(String),

    /// Gateway not found within a platform
    #[error("Gateway not found: {0}")]
    GatewayNotFound(String),

    /// A network resource could not be bound (e.g. DoIP port already in use)
    #[error("Bind error: {0}")]
    Bind(String),

    /// Invalid platform or gateway configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimulationError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            SimulationError::PlatformNotFound(_) => 404,
            SimulationError::GatewayNotFound(_) => 404,
            SimulationError::Bind(_) => 409,
            SimulationError::Config(_) => 400,
            SimulationError::Internal(_) => 500,
        }
    }
}
