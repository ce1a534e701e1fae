//! Uniform response envelope returned by connector operations
//!
//! Every handler-facing connector operation answers with a status code and
//! a JSON body, keeping HTTP response writing out of the business logic.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// A `(status, json)` pair. The body is always syntactically valid JSON,
/// for error cases too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResponse {
    status: StatusCode,
    json: String,
}

impl SimulationResponse {
    /// A 200 response carrying an already-serialized JSON document.
    pub fn ok(json: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            json: json.into(),
        }
    }

    /// An error response with an `{"error": message}` body. Going through
    /// `serde_json` keeps the body valid JSON whatever the message contains.
    pub fn error(status: StatusCode, message: impl AsRef<str>) -> Self {
        Self {
            status,
            json: serde_json::json!({ "error": message.as_ref() }).to_string(),
        }
    }

    /// Error response from a domain failure, using its HTTP status mapping.
    pub fn from_simulation_error(err: &doip_sim_core::SimulationError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::error(status, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

impl IntoResponse for SimulationResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.json,
        )
            .into_response()
    }
}
