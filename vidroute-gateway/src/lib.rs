//! # Vidroute Gateway
//!
//! HTTP front-end for the vidroute orchestration engine. For every incoming
//! request it decides which video-generation provider should handle it,
//! verifies the provider is alive (substituting the recorded fallback when it
//! is not), translates the request into a provider-specific job
//! configuration, and dispatches the job to the downstream execution API.
//!
//! ## Endpoints
//!
//! - `POST /orchestrate/video`: full orchestration of one request
//! - `POST /analyze/request`: routing decision and scoring breakdown only
//! - `GET /providers/status`: concurrent provider health fan-out
//! - `GET /providers/capabilities`: capability registry dump
//! - `POST /batch/orchestrate`: independent per-item orchestration
//! - `GET /health`: service liveness

pub mod config;
pub mod gateway_error;
pub mod handlers;
pub mod server;

pub use server::create_server;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn test_server() -> TestServer {
        let app = create_server(Config::default()).unwrap();
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = test_server();
        let response = server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "vidroute-gateway");
        assert!(body["version"].is_string());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_capability_dump_lists_every_provider() {
        let server = test_server();
        let response = server.get("/providers/capabilities").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.json::<serde_json::Value>();
        for provider in ["runway", "pika", "gemini_veo", "slideshow"] {
            assert!(body[provider].is_object(), "missing {provider}");
        }
        assert_eq!(body["runway"]["max_duration"], 300);
        assert_eq!(body["slideshow"]["cost_tier"], "very_low");
    }

    #[tokio::test]
    async fn test_analyze_returns_decision_and_breakdown() {
        let server = test_server();
        let response = server
            .post("/analyze/request")
            .json(&serde_json::json!({
                "topic": "space exploration",
                "style": "cinematic",
                "duration": 45
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["routing_decision"]["provider"], "runway");
        assert_eq!(body["routing_decision"]["mode"], "ai_generated");
        assert!(body["analysis"]["scores"].is_array());
        assert_eq!(body["analysis"]["scores"].as_array().unwrap().len(), 4);
        assert!(body["provider_capabilities"]["pika"].is_object());
    }

    #[tokio::test]
    async fn test_invalid_request_is_a_client_error() {
        let server = test_server();
        // Unknown style never reaches the router.
        let response = server
            .post("/analyze/request")
            .json(&serde_json::json!({
                "topic": "space",
                "style": "vaporwave"
            }))
            .await;
        assert!(response.status_code().is_client_error());

        // Zero duration fails validation.
        let response = server
            .post("/analyze/request")
            .json(&serde_json::json!({
                "topic": "space",
                "style": "cinematic",
                "duration": 0
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["type"], "invalid_request");
    }

    #[tokio::test]
    async fn test_unservable_duration_is_service_unavailable() {
        let server = test_server();
        let response = server
            .post("/analyze/request")
            .json(&serde_json::json!({
                "topic": "x",
                "style": "photorealistic",
                "duration": 9999
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["type"], "no_viable_provider");
    }
}
