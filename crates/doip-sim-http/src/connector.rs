//! Domain ↔ DTO projection and action dispatch
//!
//! The connector is the only place that talks to the [`SimulationManager`],
//! which makes it the seam to mock in tests. It projects live domain
//! objects into link-decorated wire resources and executes platform actions,
//! converting every domain failure into an error envelope.
//!
//! The effective host is threaded as an explicit parameter into every
//! DTO-building call; the connector holds no per-request state.

use std::sync::Arc;

use axum::http::StatusCode;
use doip_sim_core::{Gateway, Platform, ServiceState, SimulationManager};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::envelope::SimulationResponse;
use crate::resources;
use crate::PLATFORM_PATH;

/// Connects the HTTP surface to the simulation engine.
pub struct SimulationConnector {
    manager: Arc<dyn SimulationManager>,
    /// Fallback host for computed links when the request has no Host header.
    server_name: String,
}

impl SimulationConnector {
    pub fn new(manager: Arc<dyn SimulationManager>, server_name: impl Into<String>) -> Self {
        Self {
            manager,
            server_name: server_name.into(),
        }
    }

    pub fn manager(&self) -> &Arc<dyn SimulationManager> {
        &self.manager
    }

    /// Host to embed in computed links: the request's Host header when
    /// present, otherwise the configured server name. Request-scoped, so
    /// links stay correct behind any forwarding layer.
    pub fn effective_host(&self, host_header: Option<&str>) -> String {
        match host_header {
            Some(host) => format!("http://{host}"),
            None => self.server_name.clone(),
        }
    }

    /// All platforms, or an empty list when the engine cannot deliver them.
    /// "No platforms retrievable" is a representable state, not an error.
    pub fn platform_overview(&self) -> Vec<Arc<dyn Platform>> {
        match self.manager.platforms() {
            Ok(platforms) => {
                info!(total = platforms.len(), "Retrieved platform overview");
                platforms
            }
            Err(err) => {
                error!(error = %err, "Error retrieving platform overview");
                Vec::new()
            }
        }
    }

    /// Look up a platform; absence is logged at warn level.
    pub fn find_platform(&self, name: &str) -> Option<Arc<dyn Platform>> {
        let platform = self.manager.platform_by_name(name);
        match platform {
            Some(ref platform) => {
                info!(platform = %name, state = %platform.state(), "Platform resolved")
            }
            None => warn!(platform = %name, "Platform not found"),
        }
        platform
    }

    /// Look up a gateway within a platform; absence is logged at warn level.
    pub fn find_gateway(&self, platform_name: &str, gateway_name: &str) -> Option<Arc<dyn Gateway>> {
        let gateway = self
            .find_platform(platform_name)?
            .gateway_by_name(gateway_name);
        if gateway.is_none() {
            warn!(platform = %platform_name, gateway = %gateway_name, "Gateway not found");
        }
        gateway
    }

    /// Overview of all platforms, optionally filtered by state.
    pub fn build_overview_response(
        &self,
        host: &str,
        status_filter: Option<ServiceState>,
    ) -> SimulationResponse {
        let platforms = self.platform_overview();

        let info = resources::ServerInfo {
            platforms: platforms
                .iter()
                .filter(|p| status_filter.is_none_or(|wanted| p.state() == wanted))
                .map(|p| self.project_platform(host, p.as_ref()))
                .collect(),
        };

        self.serialize_envelope(&info)
    }

    /// A single platform, or a 404 envelope when the name is unknown.
    pub fn build_platform_response(&self, host: &str, platform_name: &str) -> SimulationResponse {
        let Some(platform) = self.find_platform(platform_name) else {
            return SimulationResponse::error(
                StatusCode::NOT_FOUND,
                format!("Platform not found: {platform_name}"),
            );
        };

        let dto = self.project_platform(host, platform.as_ref());
        self.serialize_envelope(&dto)
    }

    /// A single gateway with full ECU and lookup-table detail, or a 404
    /// envelope when either name is unknown.
    pub fn build_gateway_response(
        &self,
        host: &str,
        platform_name: &str,
        gateway_name: &str,
    ) -> SimulationResponse {
        let Some(gateway) = self.find_gateway(platform_name, gateway_name) else {
            return SimulationResponse::error(
                StatusCode::NOT_FOUND,
                format!("Gateway not found: {gateway_name} (platform {platform_name})"),
            );
        };

        let dto = self.project_gateway(host, platform_name, gateway.as_ref(), true);
        self.serialize_envelope(&dto)
    }

    /// Execute a start/stop action against a platform. Domain failures are
    /// converted to error envelopes here and never propagate upward.
    pub async fn dispatch_action(
        &self,
        platform_name: &str,
        request: resources::ActionRequest,
    ) -> SimulationResponse {
        let Some(platform) = self.find_platform(platform_name) else {
            error!(
                platform = %platform_name,
                "Action cannot be executed because the platform does not exist"
            );
            return SimulationResponse::error(
                StatusCode::NOT_FOUND,
                format!("Platform not found: {platform_name}"),
            );
        };

        match request.action {
            resources::Action::Start => {
                info!(platform = %platform_name, "Starting platform");
                if let Err(err) = platform.start().await {
                    error!(platform = %platform_name, error = %err, "Failed to start platform");
                    return SimulationResponse::from_simulation_error(&err);
                }
            }
            resources::Action::Stop => {
                info!(platform = %platform_name, "Stopping platform");
                platform.stop().await;
            }
        }

        SimulationResponse::ok(
            serde_json::json!({
                "platform": platform_name,
                "action": request.action.as_str(),
                "result": "ok",
            })
            .to_string(),
        )
    }

    fn project_platform(&self, host: &str, platform: &dyn Platform) -> resources::Platform {
        let platform_url = format!("{host}{PLATFORM_PATH}/{}", platform.name());

        resources::Platform {
            name: platform.name().to_string(),
            status: platform.state().to_string(),
            gateways: platform
                .gateways()
                .iter()
                .map(|g| self.project_gateway(host, platform.name(), g.as_ref(), false))
                .collect(),
            url: platform_url,
        }
    }

    fn project_gateway(
        &self,
        host: &str,
        platform_name: &str,
        gateway: &dyn Gateway,
        with_ecus: bool,
    ) -> resources::Gateway {
        let gateway_url = format!("{host}{PLATFORM_PATH}/{platform_name}/gateway/{}", gateway.name());

        let ecus = with_ecus.then(|| {
            gateway
                .ecus()
                .iter()
                .map(|ecu| resources::Ecu {
                    name: ecu.name().to_string(),
                    url: format!("{gateway_url}/ecu/{}", ecu.name()),
                    configured_lookup_table: project_entries(
                        &ecu.configured_lookup_table().entries,
                    ),
                    runtime_lookup_table: project_entries(&ecu.runtime_lookup_table().entries),
                })
                .collect()
        });

        resources::Gateway {
            name: gateway.name().to_string(),
            status: gateway.state().to_string(),
            error: gateway.error(),
            url: gateway_url,
            ecus,
        }
    }

    fn serialize_envelope<T: Serialize>(&self, value: &T) -> SimulationResponse {
        match serde_json::to_string(value) {
            Ok(json) => SimulationResponse::ok(json),
            Err(err) => {
                error!(error = %err, "Error serializing response");
                SimulationResponse::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error building JSON response: {err}"),
                )
            }
        }
    }
}

fn project_entries(entries: &[doip_sim_core::LookupEntry]) -> Vec<resources::LookupEntry> {
    entries
        .iter()
        .map(|entry| resources::LookupEntry {
            regex: entry.regex.clone(),
            result: entry.result.clone(),
            modifiers: entry
                .modifiers
                .iter()
                .map(|m| resources::Modifier {
                    regex: m.regex.clone(),
                    result: m.result.clone(),
                })
                .collect(),
        })
        .collect()
}
