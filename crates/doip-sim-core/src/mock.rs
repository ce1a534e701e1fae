//! In-memory simulation manager for demos and testing

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;

use crate::error::{SimResult, SimulationError};
use crate::manager::{Ecu, Gateway, LookupEntry, LookupTable, Platform, SimulationManager};
use crate::state::ServiceState;

/// Mock simulation manager holding a fixed set of platforms.
#[derive(Default)]
pub struct MockSimulationManager {
    platforms: Vec<Arc<MockPlatform>>,
}

impl MockSimulationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_platform(&mut self, platform: MockPlatform) -> &mut Self {
        self.platforms.push(Arc::new(platform));
        self
    }
}

impl SimulationManager for MockSimulationManager {
    fn platforms(&self) -> SimResult<Vec<Arc<dyn Platform>>> {
        Ok(self
            .platforms
            .iter()
            .map(|p| p.clone() as Arc<dyn Platform>)
            .collect())
    }

    fn platform_by_name(&self, name: &str) -> Option<Arc<dyn Platform>> {
        self.platforms
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.clone() as Arc<dyn Platform>)
    }
}

/// Mock platform with settable state and an optional injected start failure.
pub struct MockPlatform {
    name: String,
    state: RwLock<ServiceState>,
    gateways: Vec<Arc<MockGateway>>,
    /// When set, `start()` fails with this message and the platform goes to ERROR.
    fail_start: Option<String>,
}

impl MockPlatform {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(ServiceState::Stopped),
            gateways: Vec::new(),
            fail_start: None,
        }
    }

    pub fn with_state(self, state: ServiceState) -> Self {
        *self.state.write() = state;
        self
    }

    pub fn with_gateway(mut self, gateway: MockGateway) -> Self {
        self.gateways.push(Arc::new(gateway));
        self
    }

    /// Rig `start()` to fail, e.g. to simulate an occupied DoIP port.
    pub fn fail_start_with(mut self, message: impl Into<String>) -> Self {
        self.fail_start = Some(message.into());
        self
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ServiceState {
        *self.state.read()
    }

    fn gateways(&self) -> Vec<Arc<dyn Gateway>> {
        self.gateways
            .iter()
            .map(|g| g.clone() as Arc<dyn Gateway>)
            .collect()
    }

    fn gateway_by_name(&self, name: &str) -> Option<Arc<dyn Gateway>> {
        self.gateways
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.clone() as Arc<dyn Gateway>)
    }

    async fn start(&self) -> SimResult<()> {
        if let Some(ref message) = self.fail_start {
            *self.state.write() = ServiceState::Error;
            return Err(SimulationError::Bind(message.clone()));
        }
        *self.state.write() = ServiceState::Running;
        info!(platform = %self.name, "Mock platform started");
        Ok(())
    }

    async fn stop(&self) {
        *self.state.write() = ServiceState::Stopped;
        info!(platform = %self.name, "Mock platform stopped");
    }
}

/// Mock gateway with a fixed ECU set.
pub struct MockGateway {
    name: String,
    state: RwLock<ServiceState>,
    error: Option<String>,
    ecus: Vec<Arc<MockEcu>>,
}

impl MockGateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(ServiceState::Stopped),
            error: None,
            ecus: Vec::new(),
        }
    }

    pub fn with_state(self, state: ServiceState) -> Self {
        *self.state.write() = state;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_ecu(mut self, ecu: MockEcu) -> Self {
        self.ecus.push(Arc::new(ecu));
        self
    }
}

impl Gateway for MockGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ServiceState {
        *self.state.read()
    }

    fn error(&self) -> Option<String> {
        self.error.clone()
    }

    fn ecus(&self) -> Vec<Arc<dyn Ecu>> {
        self.ecus
            .iter()
            .map(|e| e.clone() as Arc<dyn Ecu>)
            .collect()
    }
}

/// Mock ECU whose runtime table starts as a copy of the configured table.
pub struct MockEcu {
    name: String,
    configured: LookupTable,
    runtime: RwLock<LookupTable>,
}

impl MockEcu {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configured: LookupTable::default(),
            runtime: RwLock::new(LookupTable::default()),
        }
    }

    pub fn with_lookup_entry(mut self, entry: LookupEntry) -> Self {
        self.configured.entries.push(entry.clone());
        self.runtime.write().entries.push(entry);
        self
    }

    /// Replace the runtime table, simulating an evolving running simulation.
    pub fn set_runtime_table(&self, table: LookupTable) {
        *self.runtime.write() = table;
    }
}

impl Ecu for MockEcu {
    fn name(&self) -> &str {
        &self.name
    }

    fn configured_lookup_table(&self) -> LookupTable {
        self.configured.clone()
    }

    fn runtime_lookup_table(&self) -> LookupTable {
        self.runtime.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manager() -> MockSimulationManager {
        let mut manager = MockSimulationManager::new();
        manager.add_platform(
            MockPlatform::new("X2024").with_gateway(
                MockGateway::new("GW").with_ecu(
                    MockEcu::new("EMS").with_lookup_entry(
                        LookupEntry::new("10 03", "50 03 00 32 01 F4")
                            .with_modifier("22 F1 86", "62 F1 86 03"),
                    ),
                ),
            ),
        );
        manager
    }

    #[test]
    fn platform_lookup() {
        let manager = sample_manager();
        assert!(manager.platform_by_name("X2024").is_some());
        assert!(manager.platform_by_name("Unknown").is_none());
        assert_eq!(manager.platforms().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn start_and_stop_drive_state() {
        let manager = sample_manager();
        let platform = manager.platform_by_name("X2024").unwrap();
        assert_eq!(platform.state(), ServiceState::Stopped);

        platform.start().await.unwrap();
        assert_eq!(platform.state(), ServiceState::Running);

        platform.stop().await;
        assert_eq!(platform.state(), ServiceState::Stopped);
    }

    #[tokio::test]
    async fn injected_start_failure() {
        let platform = MockPlatform::new("X2024").fail_start_with("port 13400 in use");
        let err = platform.start().await.unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(platform.state(), ServiceState::Error);
    }

    #[test]
    fn runtime_table_is_independent_of_configured() {
        let ecu = MockEcu::new("EMS").with_lookup_entry(LookupEntry::new("3E 00", "7E 00"));
        ecu.set_runtime_table(LookupTable::new(vec![
            LookupEntry::new("3E 00", "7E 00"),
            LookupEntry::new("10 02", "50 02"),
        ]));
        assert_eq!(ecu.configured_lookup_table().entries.len(), 1);
        assert_eq!(ecu.runtime_lookup_table().entries.len(), 2);
    }
}
