//! # Gateway Error Types
//!
//! HTTP-facing error handling. Every engine failure is mapped onto a status
//! code and a JSON body of the shape `{"error": {"message", "type", "code"}}`.
//!
//! Mapping:
//! - validation failures: 400
//! - no viable or healthy provider: 503
//! - execution API rejections: the downstream status code, body verbatim
//! - transport failures: 502
//! - everything else: 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use vidroute_core::CoreError;

/// Errors surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Errors bubbling up from the orchestration engine.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Invalid or malformed request detected at the gateway edge.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Unexpected internal failures.
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type) = match &self {
            GatewayError::Core(e) => match e {
                CoreError::InvalidRequest { .. } => {
                    (StatusCode::BAD_REQUEST, self.to_string(), "invalid_request")
                }
                CoreError::NoViableProvider => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    self.to_string(),
                    "no_viable_provider",
                ),
                CoreError::NoHealthyProvider => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    self.to_string(),
                    "no_healthy_provider",
                ),
                CoreError::Dispatch { status, .. } => {
                    (dispatch_status(*status), self.to_string(), "execution_api_error")
                }
                CoreError::Http(_) => (StatusCode::BAD_GATEWAY, self.to_string(), "transport_error"),
                CoreError::Serialization(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.to_string(),
                    "serialization_error",
                ),
            },
            GatewayError::InvalidRequest { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string(), "invalid_request")
            }
            GatewayError::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                "internal_error",
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16()
            }
        }));

        (status, body).into_response()
    }
}

/// The downstream status is reported as-is when it is itself an error; a
/// non-202 success answer still has to become an error on our side.
fn dispatch_status(downstream: u16) -> StatusCode {
    match StatusCode::from_u16(downstream) {
        Ok(status) if status.is_client_error() || status.is_server_error() => status,
        _ => StatusCode::BAD_GATEWAY,
    }
}
