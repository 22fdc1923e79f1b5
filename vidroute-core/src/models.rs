//! # Data Model
//!
//! Shared wire types for the orchestration engine: the incoming
//! [`VideoRequest`], the [`RoutingDecision`] produced by the router, and the
//! provider-specific [`JobConfig`] handed to the downstream execution API.
//!
//! All closed sets (providers, styles, modes, content types, priorities,
//! aspect ratios) are enums with fixed wire tags. Unknown tags are rejected
//! at deserialization time rather than surfacing as typos deep inside the
//! scoring pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreError;

/// Visual style requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStyle {
    Cinematic,
    Photorealistic,
    Animation,
    Artistic,
    Abstract,
    Documentary,
    SlideshowModern,
    SlideshowClassic,
}

impl VideoStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStyle::Cinematic => "cinematic",
            VideoStyle::Photorealistic => "photorealistic",
            VideoStyle::Animation => "animation",
            VideoStyle::Artistic => "artistic",
            VideoStyle::Abstract => "abstract",
            VideoStyle::Documentary => "documentary",
            VideoStyle::SlideshowModern => "slideshow_modern",
            VideoStyle::SlideshowClassic => "slideshow_classic",
        }
    }
}

impl std::fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A downstream video-generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoProvider {
    Runway,
    Pika,
    GeminiVeo,
    Slideshow,
}

impl VideoProvider {
    /// Fixed provider order. Used for iteration and as the tie-break order
    /// during selection.
    pub const ALL: [VideoProvider; 4] = [
        VideoProvider::Runway,
        VideoProvider::Pika,
        VideoProvider::GeminiVeo,
        VideoProvider::Slideshow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoProvider::Runway => "runway",
            VideoProvider::Pika => "pika",
            VideoProvider::GeminiVeo => "gemini_veo",
            VideoProvider::Slideshow => "slideshow",
        }
    }

    /// Execution flavor for this provider: slideshow assembly is local and
    /// deterministic, everything else is an external generative call.
    pub fn mode(&self) -> VideoMode {
        match self {
            VideoProvider::Slideshow => VideoMode::Slideshow,
            _ => VideoMode::AiGenerated,
        }
    }

    /// Position within [`VideoProvider::ALL`], for indexing score tables.
    pub(crate) fn index(&self) -> usize {
        match self {
            VideoProvider::Runway => 0,
            VideoProvider::Pika => 1,
            VideoProvider::GeminiVeo => 2,
            VideoProvider::Slideshow => 3,
        }
    }
}

impl std::fmt::Display for VideoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution flavor of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoMode {
    AiGenerated,
    Slideshow,
}

/// Thematic category of the requested content, distinct from style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Educational,
    Entertainment,
    Corporate,
    Creative,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Educational => "educational",
            ContentType::Entertainment => "entertainment",
            ContentType::Corporate => "corporate",
            ContentType::Creative => "creative",
        }
    }
}

/// Request priority. Influences how heavily cost weighs in routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Standard,
    High,
}

/// Output aspect ratio, from the closed set the providers support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Vertical => "9:16",
            AspectRatio::Square => "1:1",
        }
    }
}

/// Output quality tier a provider generates at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    High,
    Creative,
    Standard,
}

/// Relative cost bracket of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
    VeryLow,
    Low,
    Medium,
    High,
}

/// Incoming request for video generation.
///
/// Only `topic` and `style` are required. Everything else either has a wire
/// default or is optional guidance the transformer passes through to the
/// chosen provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    #[serde(default)]
    pub request_id: Option<String>,
    pub topic: String,
    #[serde(default)]
    pub prompt: Option<String>,
    pub style: VideoStyle,
    #[serde(default)]
    pub theme: Option<String>,
    /// Target duration in seconds. Must be positive when present.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub voice_style: Option<String>,
    #[serde(default)]
    pub background_music: Option<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub priority: Priority,
    /// Explicit provider override. Skips scoring entirely.
    #[serde(default)]
    pub preferred_provider: Option<VideoProvider>,
}

impl VideoRequest {
    /// Validate the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.topic.trim().is_empty() {
            return Err(CoreError::InvalidRequest {
                message: "topic must not be empty".to_string(),
            });
        }
        if self.duration == Some(0) {
            return Err(CoreError::InvalidRequest {
                message: "duration must be a positive number of seconds".to_string(),
            });
        }
        Ok(())
    }
}

/// The router's verdict for a single request.
///
/// Immutable once constructed; the orchestration handler replaces the whole
/// value when it substitutes a fallback provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub provider: VideoProvider,
    pub mode: VideoMode,
    /// Human-readable explanation of why this provider won.
    pub reason: String,
    /// Total weighted score of the winner, in [0, 1]. 1.0 for explicit
    /// overrides.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_provider: Option<VideoProvider>,
    /// Hints for emulating the requested style on a non-canonical provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptations: Option<BTreeMap<String, String>>,
}

/// Provider-specific job payload sent to the downstream execution API.
///
/// The fixed fields mirror the original request plus the routing verdict;
/// `params` carries the layered provider defaults and optimizations
/// (resolution, fps, creativity knobs, slideshow timings) and is flattened
/// into the top-level JSON object on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub topic: String,
    pub prompt: Option<String>,
    pub style: VideoStyle,
    pub theme: Option<String>,
    pub duration: Option<u32>,
    pub aspect_ratio: AspectRatio,
    pub voice_style: Option<String>,
    pub background_music: Option<String>,

    pub provider: VideoProvider,
    pub mode: VideoMode,
    pub routing_reason: String,

    pub request_id: Option<String>,
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptations: Option<BTreeMap<String, String>>,

    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl JobConfig {
    /// Look up a provider-specific parameter by key.
    pub fn param(&self, key: &str) -> Option<&serde_json::Value> {
        self.params.get(key)
    }

    pub(crate) fn set_param(&mut self, key: &str, value: serde_json::Value) {
        self.params.insert(key.to_string(), value);
    }
}

/// Response returned to the caller once a job has been accepted downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResponse {
    pub job_id: String,
    pub provider: VideoProvider,
    pub mode: VideoMode,
    pub routing_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    pub node_api_response: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_wire_tags_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&VideoProvider::GeminiVeo).unwrap(),
            "\"gemini_veo\""
        );
        assert_eq!(
            serde_json::from_str::<VideoProvider>("\"runway\"").unwrap(),
            VideoProvider::Runway
        );
    }

    #[test]
    fn test_aspect_ratio_uses_literal_tags() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Vertical).unwrap(),
            "\"9:16\""
        );
        assert_eq!(
            serde_json::from_str::<AspectRatio>("\"1:1\"").unwrap(),
            AspectRatio::Square
        );
    }

    #[test]
    fn test_unknown_style_is_rejected() {
        let body = serde_json::json!({
            "topic": "space",
            "style": "vaporwave"
        });
        assert!(serde_json::from_value::<VideoRequest>(body).is_err());
    }

    #[test]
    fn test_request_defaults_apply() {
        let request: VideoRequest = serde_json::from_value(serde_json::json!({
            "topic": "space",
            "style": "cinematic"
        }))
        .unwrap();
        assert_eq!(request.aspect_ratio, AspectRatio::Widescreen);
        assert_eq!(request.priority, Priority::Standard);
        assert!(request.preferred_provider.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zero_duration_fails_validation() {
        let request: VideoRequest = serde_json::from_value(serde_json::json!({
            "topic": "space",
            "style": "cinematic",
            "duration": 0
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_slideshow_mode_is_derived_from_provider() {
        for provider in VideoProvider::ALL {
            let expected = if provider == VideoProvider::Slideshow {
                VideoMode::Slideshow
            } else {
                VideoMode::AiGenerated
            };
            assert_eq!(provider.mode(), expected);
        }
    }

    #[test]
    fn test_job_config_flattens_params() {
        let mut config = JobConfig {
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
            request_id: None,
            priority: Priority::Standard,
            adaptations: None,
            params: serde_json::Map::new(),
        };
        config.set_param("resolution", serde_json::json!("1920x1080"));

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["resolution"], "1920x1080");
        assert_eq!(value["provider"], "runway");
        assert!(value.get("params").is_none());
    }
}
