//! Handler for the `/doip-simulation/` overview resource

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use doip_sim_core::ServiceState;
use tracing::error;

use crate::connector::SimulationConnector;
use crate::routing::parse_query;
use crate::server::{ContextHandler, SimRequest};
use crate::DOIP_SIMULATION_PATH;

/// Serves the platform overview, optionally filtered by state:
/// `/doip-simulation/` and `/doip-simulation/?status=RUNNING`.
pub struct SimulationOverviewHandler {
    connector: Arc<SimulationConnector>,
}

impl SimulationOverviewHandler {
    pub const RESOURCE_PATH: &'static str = DOIP_SIMULATION_PATH;

    pub fn new(connector: Arc<SimulationConnector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl ContextHandler for SimulationOverviewHandler {
    async fn handle(&self, request: SimRequest) -> Response {
        if request.method != Method::GET {
            error!(method = %request.method, "Method not allowed on overview resource");
            return StatusCode::METHOD_NOT_ALLOWED.into_response();
        }

        let host = self.connector.effective_host(request.host.as_deref());

        // A present but unrecognized status filter is a client error;
        // an absent one means "all platforms".
        let mut status_filter: Option<ServiceState> = None;
        if let Some(ref query) = request.query {
            if let Some(token) = parse_query(query).get("status") {
                match token.parse() {
                    Ok(state) => status_filter = Some(state),
                    Err(_) => {
                        error!(status = %token, "Invalid status provided");
                        return StatusCode::BAD_REQUEST.into_response();
                    }
                }
            }
        }

        self.connector
            .build_overview_response(&host, status_filter)
            .into_response()
    }
}
