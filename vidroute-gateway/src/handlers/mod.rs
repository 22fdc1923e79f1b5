//! # HTTP Request Handlers
//!
//! The public surface of the orchestration service:
//!
//! - `POST /orchestrate/video`: route, health-check, transform, dispatch.
//! - `POST /analyze/request`: the routing verdict and scoring breakdown,
//!   with no downstream call.
//! - `GET /providers/status`: concurrent health fan-out.
//! - `GET /providers/capabilities`: capability registry dump.
//! - `POST /batch/orchestrate`: independent per-item orchestration with
//!   batch staggering hints.
//! - `GET /health`: static liveness probe.
//!
//! Each orchestrated request flows strictly forward. A health failure on the
//! chosen provider causes exactly one fallback substitution; there is no
//! retry loop, and dispatch failures are reported to the caller verbatim.

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use vidroute_core::dispatch::{BATCH_DISPATCH_TIMEOUT, DISPATCH_TIMEOUT};
use vidroute_core::routing::style_adaptations;
use vidroute_core::{
    CoreError, OrchestrationResponse, RoutingDecision, VideoRequest,
};

use crate::gateway_error::GatewayError;
use crate::server::AppState;

/// Static liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "vidroute-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Main orchestration endpoint: decides the provider and hands the job to
/// the execution API.
pub async fn orchestrate_video(
    State(state): State<AppState>,
    Json(request): Json<VideoRequest>,
) -> Result<Json<OrchestrationResponse>, GatewayError> {
    let trace_id = Uuid::new_v4();
    tracing::info!(
        %trace_id,
        topic = %request.topic,
        style = %request.style,
        request_id = ?request.request_id,
        "orchestrating video generation"
    );

    let response = orchestrate(&state, &request, DISPATCH_TIMEOUT).await?;
    tracing::info!(%trace_id, job_id = %response.job_id, provider = %response.provider, "job accepted");
    Ok(Json(response))
}

/// Routing verdict plus the full scoring breakdown, without executing
/// anything.
pub async fn analyze_request(
    State(state): State<AppState>,
    Json(request): Json<VideoRequest>,
) -> Result<Json<Value>, GatewayError> {
    request.validate()?;
    let decision = state.router.route(&request)?;
    let analysis = state.router.analyze(&request);

    Ok(Json(json!({
        "routing_decision": decision,
        "provider_capabilities": state.registry.all(),
        "analysis": analysis,
    })))
}

/// Concurrent health fan-out across every provider.
pub async fn provider_status(State(state): State<AppState>) -> Json<Value> {
    let statuses = state.health.check_all().await;
    Json(json!(statuses))
}

/// Capability registry dump.
pub async fn provider_capabilities(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.registry.all()))
}

/// Batch orchestration. Items are processed independently: routing and
/// health resolution first, then batch-aware payload preparation, then
/// concurrent dispatch. One failing item never aborts the rest.
pub async fn batch_orchestrate(
    State(state): State<AppState>,
    Json(requests): Json<Vec<VideoRequest>>,
) -> Json<Value> {
    let mut results: Vec<Option<Value>> = vec![None; requests.len()];
    let mut routed: Vec<(usize, VideoRequest, RoutingDecision)> = Vec::new();

    for (index, request) in requests.into_iter().enumerate() {
        match resolve_decision(&state, &request).await {
            Ok(decision) => routed.push((index, request, decision)),
            Err(e) => {
                results[index] = Some(json!({
                    "status": "error",
                    "request_id": request.request_id,
                    "error": e.to_string(),
                }));
            }
        }
    }

    let batch_requests: Vec<VideoRequest> = routed.iter().map(|(_, r, _)| r.clone()).collect();
    let batch_decisions: Vec<RoutingDecision> = routed.iter().map(|(_, _, d)| d.clone()).collect();
    let configs = state
        .orchestrator
        .prepare_batch(&batch_requests, &batch_decisions);

    let dispatches = configs.iter().zip(&routed).map(|(config, (index, request, decision))| {
        let state = state.clone();
        async move {
            let outcome = state
                .execution
                .submit_job(config, BATCH_DISPATCH_TIMEOUT)
                .await;
            (*index, request, decision, outcome)
        }
    });

    for (index, request, decision, outcome) in futures::future::join_all(dispatches).await {
        results[index] = Some(match outcome {
            Ok(outcome) => json!({
                "status": "success",
                "request_id": request.request_id.clone(),
                "result": OrchestrationResponse {
                    job_id: outcome.job_id,
                    provider: decision.provider,
                    mode: decision.mode,
                    routing_reason: decision.reason.clone(),
                    estimated_duration: outcome.estimated_duration,
                    node_api_response: outcome.raw,
                },
            }),
            Err(e) => {
                tracing::warn!(request_id = ?request.request_id, error = %e, "batch item failed");
                json!({
                    "status": "error",
                    "request_id": request.request_id.clone(),
                    "error": GatewayError::from(e).to_string(),
                })
            }
        });
    }

    Json(json!({ "batch_results": results }))
}

/// One full orchestration pass for a single request.
async fn orchestrate(
    state: &AppState,
    request: &VideoRequest,
    dispatch_timeout: Duration,
) -> Result<OrchestrationResponse, GatewayError> {
    let decision = resolve_decision(state, request).await?;
    let config = state.orchestrator.prepare(request, &decision);
    let outcome = state.execution.submit_job(&config, dispatch_timeout).await?;

    Ok(OrchestrationResponse {
        job_id: outcome.job_id,
        provider: decision.provider,
        mode: decision.mode,
        routing_reason: decision.reason,
        estimated_duration: outcome.estimated_duration,
        node_api_response: outcome.raw,
    })
}

/// Validate, route, and verify provider health. An unhealthy primary is
/// substituted by its recorded fallback exactly once; with no fallback the
/// request fails as unservable.
async fn resolve_decision(
    state: &AppState,
    request: &VideoRequest,
) -> Result<RoutingDecision, GatewayError> {
    request.validate()?;
    let decision = state.router.route(request)?;

    let status = state.health.check(decision.provider).await;
    if status.is_healthy {
        return Ok(decision);
    }

    let Some(fallback) = decision.fallback_provider else {
        tracing::error!(provider = %decision.provider, "provider unhealthy with no fallback");
        return Err(CoreError::NoHealthyProvider.into());
    };

    tracing::warn!(
        primary = %decision.provider,
        fallback = %fallback,
        "primary provider unavailable, substituting fallback"
    );
    Ok(RoutingDecision {
        provider: fallback,
        mode: fallback.mode(),
        reason: format!("Primary provider unavailable, using fallback: {fallback}"),
        confidence: decision.confidence,
        fallback_provider: None,
        adaptations: style_adaptations(request.style, fallback),
    })
}
