//! Client for the downstream execution API that actually renders jobs.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::{JobConfig, VideoProvider};

/// Timeout for a single job dispatch.
pub const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for dispatching an item that is part of a batch.
pub const BATCH_DISPATCH_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for the provider health probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY_HEADER: &str = "X-API-KEY";

/// Result of a successful dispatch: the job handle plus the raw response
/// body, which is passed back to the caller untouched.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub job_id: String,
    pub estimated_duration: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DispatchBody {
    #[serde(rename = "jobId")]
    job_id: String,
    #[serde(rename = "estimatedDuration")]
    estimated_duration: Option<String>,
}

/// Downstream view of provider health, as reported by the execution API.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderHealthReport {
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderHealthEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderHealthEntry {
    #[serde(default)]
    pub healthy: bool,
}

impl ProviderHealthReport {
    /// A provider missing from the report counts as unhealthy.
    pub fn is_healthy(&self, provider: VideoProvider) -> bool {
        self.providers
            .get(provider.as_str())
            .map(|entry| entry.healthy)
            .unwrap_or(false)
    }
}

/// Thin reqwest wrapper around the execution API. One shared instance serves
/// all handlers; timeouts are applied per request.
#[derive(Clone)]
pub struct ExecutionClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ExecutionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, CoreError> {
        let http = Client::builder().build()?;
        let base_url = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a prepared job. Only HTTP 202 counts as accepted; anything
    /// else comes back as [`CoreError::Dispatch`] with the downstream status
    /// and body verbatim.
    pub async fn submit_job(
        &self,
        config: &JobConfig,
        timeout: Duration,
    ) -> Result<DispatchOutcome, CoreError> {
        let resp = self
            .http
            .post(self.url("/video/generate"))
            .timeout(timeout)
            .header(API_KEY_HEADER, &self.api_key)
            .json(config)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::ACCEPTED {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::Dispatch {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = resp.json().await?;
        let body: DispatchBody = serde_json::from_value(raw.clone())?;
        Ok(DispatchOutcome {
            job_id: body.job_id,
            estimated_duration: body.estimated_duration,
            raw,
        })
    }

    /// Probe the execution API's aggregated provider health endpoint.
    pub async fn provider_health(&self) -> Result<ProviderHealthReport, CoreError> {
        let resp = self
            .http
            .get(self.url("/video/providers/health"))
            .timeout(PROBE_TIMEOUT)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::Dispatch {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, Priority, VideoMode, VideoStyle};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_config() -> JobConfig {
        JobConfig {
            topic: "space".to_string(),
            prompt: None,
            style: VideoStyle::Cinematic,
            theme: None,
            duration: Some(45),
            aspect_ratio: AspectRatio::Widescreen,
            voice_style: None,
            background_music: None,
            provider: VideoProvider::Runway,
            mode: VideoMode::AiGenerated,
            routing_reason: "test".to_string(),
            request_id: Some("req-1".to_string()),
            priority: Priority::Standard,
            adaptations: None,
            params: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn test_accepted_dispatch_parses_the_job_handle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/video/generate"))
            .and(header("X-API-KEY", "testkey"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "jobId": "job-42",
                "estimatedDuration": "90s",
                "queuePosition": 3
            })))
            .mount(&server)
            .await;

        let client = ExecutionClient::new(server.uri(), "testkey").unwrap();
        let outcome = client
            .submit_job(&sample_config(), DISPATCH_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome.job_id, "job-42");
        assert_eq!(outcome.estimated_duration.as_deref(), Some("90s"));
        assert_eq!(outcome.raw["queuePosition"], 3);
    }

    #[tokio::test]
    async fn test_non_accepted_status_surfaces_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/video/generate"))
            .respond_with(ResponseTemplate::new(429).set_body_string("provider rate limited"))
            .mount(&server)
            .await;

        let client = ExecutionClient::new(server.uri(), "testkey").unwrap();
        let err = client
            .submit_job(&sample_config(), DISPATCH_TIMEOUT)
            .await
            .unwrap_err();
        match err {
            CoreError::Dispatch { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "provider rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ok_but_not_accepted_is_still_a_dispatch_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/video/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jobId": "job-42"
            })))
            .mount(&server)
            .await;

        let client = ExecutionClient::new(server.uri(), "testkey").unwrap();
        let err = client
            .submit_job(&sample_config(), DISPATCH_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Dispatch { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_health_report_reads_the_provider_map() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video/providers/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "providers": {
                    "runway": { "healthy": true, "latency_ms": 120 },
                    "pika": { "healthy": false }
                }
            })))
            .mount(&server)
            .await;

        let client = ExecutionClient::new(server.uri(), "testkey").unwrap();
        let report = client.provider_health().await.unwrap();
        assert!(report.is_healthy(VideoProvider::Runway));
        assert!(!report.is_healthy(VideoProvider::Pika));
        // Providers absent from the report are not healthy.
        assert!(!report.is_healthy(VideoProvider::GeminiVeo));
    }
}
