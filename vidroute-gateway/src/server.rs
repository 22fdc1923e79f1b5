//! # HTTP Server
//!
//! Axum server wiring: shared application state, routes, and the middleware
//! stack (CORS, request tracing, timeouts). The capability registry is built
//! exactly once here and shared read-only; the router, health checker, and
//! orchestrator it feeds are stateless across calls.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use vidroute_core::{CapabilityRegistry, ExecutionClient, HealthChecker, Orchestrator};

use crate::config::Config;
use crate::handlers;

/// Liveness probes answer fast or not at all.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<CapabilityRegistry>,
    pub router: Arc<vidroute_core::Router>,
    pub health: Arc<HealthChecker>,
    pub orchestrator: Arc<Orchestrator>,
    pub execution: Arc<ExecutionClient>,
}

/// Build the application router from a validated configuration.
pub fn create_server(config: Config) -> anyhow::Result<Router> {
    let registry = Arc::new(CapabilityRegistry::load(
        config.execution.capabilities_file.as_deref(),
    ));
    let execution = Arc::new(ExecutionClient::new(
        config.execution.node_api_url.clone(),
        config.execution.api_key.clone(),
    )?);
    let router = Arc::new(vidroute_core::Router::new(registry.clone()));
    let health = Arc::new(HealthChecker::new(execution.clone(), registry.clone()));

    let server_timeout = config.server_timeout();
    let state = AppState {
        config: Arc::new(config),
        registry,
        router,
        health,
        orchestrator: Arc::new(Orchestrator::new()),
        execution,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/orchestrate/video", post(handlers::orchestrate_video))
        .route("/analyze/request", post(handlers::analyze_request))
        .route("/providers/status", get(handlers::provider_status))
        .route(
            "/providers/capabilities",
            get(handlers::provider_capabilities),
        )
        .route("/batch/orchestrate", post(handlers::batch_orchestrate))
        .merge(
            Router::new()
                .route("/health", get(handlers::health_check))
                .route_layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    HEALTH_TIMEOUT,
                )),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    server_timeout,
                ))
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}
