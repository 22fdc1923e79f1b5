//! # Provider Health
//!
//! On-demand liveness checks for every provider. The slideshow generator is
//! local and therefore always healthy; the AI providers are probed through
//! the execution API's aggregated health endpoint. When that probe cannot be
//! completed (transport failure or a non-2xx answer) the checker falls back
//! to environment presence: a provider whose API-key variable is set and
//! non-empty is assumed reachable.
//!
//! Statuses are produced per call and never cached or persisted.

use chrono::{DateTime, Utc};
use futures::future;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::capabilities::{Capabilities, CapabilityRegistry};
use crate::dispatch::ExecutionClient;
use crate::models::VideoProvider;

/// Backoff schedule for recovery polling, in seconds.
const RECOVERY_BACKOFF_SECS: [u64; 5] = [5, 10, 20, 30, 60];

/// Point-in-time health snapshot for one provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: VideoProvider,
    pub is_healthy: bool,
    /// Wall-clock milliseconds spent probing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
    /// Probe failure detail, present only when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Stateless health checker. Shared across handlers; every call probes
/// fresh.
#[derive(Clone)]
pub struct HealthChecker {
    client: Arc<ExecutionClient>,
    registry: Arc<CapabilityRegistry>,
}

impl HealthChecker {
    pub fn new(client: Arc<ExecutionClient>, registry: Arc<CapabilityRegistry>) -> Self {
        Self { client, registry }
    }

    /// Check a single provider. Never fails; failures become unhealthy
    /// statuses.
    pub async fn check(&self, provider: VideoProvider) -> ProviderStatus {
        let started = Instant::now();
        let (is_healthy, error) = self.probe(provider).await;
        let response_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        ProviderStatus {
            provider,
            is_healthy,
            response_time_ms: Some(response_time_ms),
            capabilities: Some(self.registry.capabilities(provider).clone()),
            error: if is_healthy { None } else { error },
            checked_at: Utc::now(),
        }
    }

    async fn probe(&self, provider: VideoProvider) -> (bool, Option<String>) {
        // Local assembly has no upstream to be down.
        if provider == VideoProvider::Slideshow {
            return (true, None);
        }

        match self.client.provider_health().await {
            Ok(report) => (report.is_healthy(provider), None),
            Err(e) => {
                tracing::warn!(
                    provider = %provider,
                    error = %e,
                    "health probe failed, falling back to environment check"
                );
                let healthy = has_api_key(provider);
                let error = if healthy { None } else { Some(e.to_string()) };
                (healthy, error)
            }
        }
    }

    /// Probe every provider concurrently. Always returns exactly one status
    /// per provider; individual failures never propagate.
    pub async fn check_all(&self) -> BTreeMap<VideoProvider, ProviderStatus> {
        let probes = VideoProvider::ALL.iter().map(|p| self.check(*p));
        future::join_all(probes)
            .await
            .into_iter()
            .map(|status| (status.provider, status))
            .collect()
    }

    /// Providers currently reporting healthy.
    pub async fn healthy_providers(&self) -> Vec<VideoProvider> {
        self.check_all()
            .await
            .into_values()
            .filter(|status| status.is_healthy)
            .map(|status| status.provider)
            .collect()
    }

    /// Poll for a provider to come back, sleeping the fixed backoff schedule
    /// between probes. Stops on the first healthy status or once the
    /// cumulative wait reaches `max_wait`. Returns whether recovery was
    /// observed.
    pub async fn wait_for_recovery(&self, provider: VideoProvider, max_wait: Duration) -> bool {
        let mut waited = Duration::ZERO;

        for secs in RECOVERY_BACKOFF_SECS {
            if waited >= max_wait {
                break;
            }
            let pause = Duration::from_secs(secs);
            tracing::info!(provider = %provider, wait_secs = secs, "waiting for provider recovery");
            tokio::time::sleep(pause).await;
            waited += pause;

            if self.check(provider).await.is_healthy {
                tracing::info!(provider = %provider, "provider recovered");
                return true;
            }
        }

        tracing::warn!(
            provider = %provider,
            max_wait_secs = max_wait.as_secs(),
            "provider did not recover in time"
        );
        false
    }
}

fn api_key_var(provider: VideoProvider) -> Option<&'static str> {
    match provider {
        VideoProvider::Runway => Some("RUNWAY_API_KEY"),
        VideoProvider::Pika => Some("PIKA_API_KEY"),
        VideoProvider::GeminiVeo => Some("GEMINI_API_KEY"),
        VideoProvider::Slideshow => None,
    }
}

fn has_api_key(provider: VideoProvider) -> bool {
    match api_key_var(provider) {
        Some(var) => std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false),
        None => true,
    }
}
