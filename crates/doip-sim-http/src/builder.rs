//! Builder wiring a server with the default resource handlers

use std::net::SocketAddr;
use std::sync::Arc;

use doip_sim_core::SimulationManager;
use tracing::warn;

use crate::connector::SimulationConnector;
use crate::handlers::{PlatformOverviewHandler, SimulationOverviewHandler};
use crate::server::{ContextBinding, DoipHttpServer, DEFAULT_PORT};

/// Builds a [`DoipHttpServer`] with the overview and platform handlers
/// registered under their conventional prefixes.
///
/// ```ignore
/// let server = DoipHttpServerBuilder::new(manager)
///     .port(8080)
///     .server_name("http://localhost:8080")
///     .build()
///     .await;
/// ```
pub struct DoipHttpServerBuilder {
    manager: Arc<dyn SimulationManager>,
    addr: SocketAddr,
    server_name: String,
}

impl DoipHttpServerBuilder {
    pub fn new(manager: Arc<dyn SimulationManager>) -> Self {
        Self {
            manager,
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            server_name: format!("http://localhost:{DEFAULT_PORT}"),
        }
    }

    /// Listen on all interfaces on `port`.
    pub fn port(mut self, port: u16) -> Self {
        self.addr = SocketAddr::from(([0, 0, 0, 0], port));
        self
    }

    /// Listen on a specific address (port 0 picks a free port).
    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Host embedded in computed links for requests without a Host header.
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Create the server and register the default handlers. The server is
    /// not started; call [`DoipHttpServer::start`] on the result.
    pub async fn build(self) -> DoipHttpServer {
        let connector = Arc::new(SimulationConnector::new(self.manager, self.server_name));

        let server = DoipHttpServer::new(self.addr);
        server
            .add_bindings(vec![
                ContextBinding::new(
                    SimulationOverviewHandler::RESOURCE_PATH,
                    Arc::new(SimulationOverviewHandler::new(connector.clone())),
                ),
                ContextBinding::new(
                    PlatformOverviewHandler::RESOURCE_PATH,
                    Arc::new(PlatformOverviewHandler::new(connector)),
                ),
            ])
            .await;

        if server.binding_prefixes().await.len() != 2 {
            // add_bindings already logged the details
            warn!("Not all default handlers could be registered");
        }

        server
    }
}

#[cfg(test)]
mod tests {
    use doip_sim_core::mock::MockSimulationManager;

    use super::*;

    #[tokio::test]
    async fn build_registers_default_handlers() {
        let manager = Arc::new(MockSimulationManager::new());
        let server = DoipHttpServerBuilder::new(manager).build().await;

        assert!(server.binding_exists("/doip-simulation/").await);
        assert!(server.binding_exists("/doip-simulation/platform").await);
        assert!(!server.is_running().await);
    }
}
