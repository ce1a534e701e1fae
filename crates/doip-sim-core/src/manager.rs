//! SimulationManager trait - the capability interface to the simulation engine
//!
//! The HTTP layer only ever sees these traits. Accessors are synchronous
//! (the engine keeps its object tree in memory); the platform actions are
//! async because starting a platform binds network resources.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SimResult;
use crate::state::ServiceState;

/// A single diagnostic request/response mapping of an ECU.
///
/// `modifiers` carries regex/result overrides applied after a base match;
/// it may be empty but is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupEntry {
    pub regex: String,
    pub result: String,
    pub modifiers: Vec<LookupEntry>,
}

impl LookupEntry {
    pub fn new(regex: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
            result: result.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, regex: impl Into<String>, result: impl Into<String>) -> Self {
        self.modifiers.push(LookupEntry::new(regex, result));
        self
    }
}

/// An ordered set of lookup entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    pub entries: Vec<LookupEntry>,
}

impl LookupTable {
    pub fn new(entries: Vec<LookupEntry>) -> Self {
        Self { entries }
    }
}

/// Top-level capability: enumerate and look up platforms.
///
/// Implementations must be safe for concurrent reads and action dispatch;
/// the HTTP layer performs no synchronization of its own around them.
pub trait SimulationManager: Send + Sync {
    /// All platforms known to the engine.
    fn platforms(&self) -> SimResult<Vec<Arc<dyn Platform>>>;

    /// Look up a platform by its unique name.
    fn platform_by_name(&self, name: &str) -> Option<Arc<dyn Platform>>;
}

/// A named, independently startable simulated diagnostic network.
#[async_trait]
pub trait Platform: Send + Sync {
    fn name(&self) -> &str;

    fn state(&self) -> ServiceState;

    fn gateways(&self) -> Vec<Arc<dyn Gateway>>;

    fn gateway_by_name(&self, name: &str) -> Option<Arc<dyn Gateway>>;

    /// Start the platform. Fails when a gateway cannot bind its port.
    async fn start(&self) -> SimResult<()>;

    /// Stop the platform. Never fails.
    async fn stop(&self);
}

/// A platform's network entry point; aggregates ECUs.
pub trait Gateway: Send + Sync {
    fn name(&self) -> &str;

    fn state(&self) -> ServiceState;

    /// Bind/config failure detail, present only when the state warrants it.
    fn error(&self) -> Option<String>;

    fn ecus(&self) -> Vec<Arc<dyn Ecu>>;
}

/// A simulated control unit answering diagnostic requests via lookup tables.
pub trait Ecu: Send + Sync {
    fn name(&self) -> &str;

    /// The static table loaded at ECU construction.
    fn configured_lookup_table(&self) -> LookupTable;

    /// The current effective table; may evolve while the simulation runs.
    fn runtime_lookup_table(&self) -> LookupTable;
}
