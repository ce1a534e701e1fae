//! Handler for the `/doip-simulation/platform` resource family
//!
//! Dispatches, per request:
//! - `GET  .../platform/{name}` — platform read
//! - `GET  .../platform/{name}?action=start|stop` — action via GET (kept
//!   for wire compatibility with existing tooling)
//! - `GET  .../platform/{name}/gateway/{gw}` — gateway read
//! - `POST .../platform/{name}` — action via JSON body, empty body reads

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use doip_sim_core::SimulationError;
use tracing::{error, info, warn};

use crate::connector::SimulationConnector;
use crate::resources::{Action, ActionRequest};
use crate::routing::{parse_query, path_segment_value};
use crate::server::{ContextHandler, SimRequest};
use crate::PLATFORM_PATH;

const GATEWAY_PATH: &str = "/gateway";

/// Serves platform and gateway reads and platform start/stop actions.
pub struct PlatformOverviewHandler {
    connector: Arc<SimulationConnector>,
}

impl PlatformOverviewHandler {
    pub const RESOURCE_PATH: &'static str = PLATFORM_PATH;

    pub fn new(connector: Arc<SimulationConnector>) -> Self {
        Self { connector }
    }

    fn action_token(request: &SimRequest) -> Option<String> {
        let query = request.query.as_deref()?;
        parse_query(query).get("action").cloned()
    }

    /// GET with an `action` query parameter and a resolvable platform
    /// segment is an action dispatch, not a read.
    fn is_action_request(request: &SimRequest) -> bool {
        Self::action_token(request).is_some()
            && path_segment_value(&request.path, "platform").is_some()
    }

    fn handle_gateway_read(&self, host: &str, request: &SimRequest) -> Response {
        let platform = path_segment_value(&request.path, "platform");
        let gateway = path_segment_value(&request.path, "gateway");

        let (Some(platform), Some(gateway)) = (platform, gateway) else {
            error!(path = %request.path, "Invalid URL parameters for gateway request");
            return StatusCode::BAD_REQUEST.into_response();
        };

        info!(platform = %platform, gateway = %gateway, "GET gateway");
        self.connector
            .build_gateway_response(host, platform, gateway)
            .into_response()
    }

    fn handle_platform_read(&self, host: &str, request: &SimRequest) -> Response {
        let Some(platform) = path_segment_value(&request.path, "platform") else {
            error!(path = %request.path, "Invalid URL parameters for platform request");
            return StatusCode::BAD_REQUEST.into_response();
        };

        info!(platform = %platform, "GET platform");
        self.connector
            .build_platform_response(host, platform)
            .into_response()
    }

    async fn handle_action_via_get(&self, host: &str, request: &SimRequest) -> Response {
        // is_action_request established both parts; re-extract for use
        let Some(platform) = path_segment_value(&request.path, "platform") else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        let token = Self::action_token(request).unwrap_or_default();

        let Some(action) = Action::from_token(&token) else {
            error!(action = %token, "Invalid action provided");
            return StatusCode::BAD_REQUEST.into_response();
        };

        info!(platform = %platform, action = %token, "Action via GET");
        self.run_action(host, platform, ActionRequest { action }).await
    }

    async fn handle_post(&self, host: &str, request: &SimRequest) -> Response {
        let Some(platform) = path_segment_value(&request.path, "platform") else {
            error!(path = %request.path, "Invalid URL parameters for POST request");
            return StatusCode::BAD_REQUEST.into_response();
        };

        match request.content_type.as_deref() {
            Some(value) if value.starts_with("application/json") => {}
            other => warn!(
                content_type = other.unwrap_or("<missing>"),
                "Invalid or missing Content-Type header; proceeding with the request"
            ),
        }

        // An empty body is a plain read of the current representation.
        if request.body.iter().all(u8::is_ascii_whitespace) {
            return self
                .connector
                .build_platform_response(host, platform)
                .into_response();
        }

        let action: ActionRequest = match serde_json::from_slice(&request.body) {
            Ok(action) => action,
            Err(err) => {
                error!(error = %err, "Received JSON structure is invalid");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        info!(platform = %platform, action = %action.action.as_str(), "Action via POST");
        self.run_action(host, platform, action).await
    }

    /// Dispatch the action, then answer with the refreshed platform
    /// representation unless the dispatch itself failed.
    async fn run_action(&self, host: &str, platform: &str, action: ActionRequest) -> Response {
        let dispatch = self.connector.dispatch_action(platform, action).await;

        if !dispatch.is_ok() {
            return dispatch.into_response();
        }
        self.connector
            .build_platform_response(host, platform)
            .into_response()
    }

    async fn route(&self, request: &SimRequest) -> Result<Response, SimulationError> {
        let host = self.connector.effective_host(request.host.as_deref());

        let response = if request.method == Method::GET && request.path.contains(GATEWAY_PATH) {
            self.handle_gateway_read(&host, request)
        } else if request.method == Method::GET && Self::is_action_request(request) {
            self.handle_action_via_get(&host, request).await
        } else if request.method == Method::GET {
            self.handle_platform_read(&host, request)
        } else if request.method == Method::POST {
            self.handle_post(&host, request).await
        } else {
            error!(method = %request.method, "Method not allowed on platform resource");
            StatusCode::METHOD_NOT_ALLOWED.into_response()
        };

        Ok(response)
    }
}

#[async_trait]
impl ContextHandler for PlatformOverviewHandler {
    async fn handle(&self, request: SimRequest) -> Response {
        // Transport-level safety net: nothing below may cross this boundary.
        match self.route(&request).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "Error processing request");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
