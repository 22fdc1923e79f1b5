//! # Job Configuration
//!
//! Turns a high-level request plus a routing decision into the
//! provider-specific payload the execution API understands. The payload is
//! layered: the request fields verbatim, then per-provider defaults, then
//! style adaptations, then provider-specific optimizations. Batch
//! preparation adds priority and staggering hints on top.

use serde_json::{json, Map, Value};

use crate::models::{
    AspectRatio, ContentType, JobConfig, RoutingDecision, VideoProvider, VideoRequest, VideoStyle,
};

/// Seconds of delay between consecutive batch items on the same AI provider.
const BATCH_STAGGER_SECS: u64 = 10;

/// Stateless request-to-payload transformer.
#[derive(Clone, Default)]
pub struct Orchestrator;

impl Orchestrator {
    pub fn new() -> Self {
        Self
    }

    /// Build the provider payload for one routed request.
    pub fn prepare(&self, request: &VideoRequest, decision: &RoutingDecision) -> JobConfig {
        let mut config = JobConfig {
            topic: request.topic.clone(),
            prompt: request.prompt.clone(),
            style: request.style,
            theme: request.theme.clone(),
            duration: request.duration,
            aspect_ratio: request.aspect_ratio,
            voice_style: request.voice_style.clone(),
            background_music: request.background_music.clone(),
            provider: decision.provider,
            mode: decision.mode,
            routing_reason: decision.reason.clone(),
            request_id: request.request_id.clone(),
            priority: request.priority,
            adaptations: decision.adaptations.clone(),
            params: Map::new(),
        };

        for (key, value) in provider_defaults(decision.provider) {
            config.set_param(key, value);
        }

        if let Some(adaptations) = &decision.adaptations {
            if let Some(enhancement) = adaptations.get("prompt_enhancement") {
                let original = config.prompt.take().unwrap_or_default();
                config.prompt = Some(format!("{original}. Style note: {enhancement}"));
            }
            if let Some(image_style) = adaptations.get("image_style") {
                config.set_param("image_style_override", json!(image_style));
            }
        }

        match decision.provider {
            VideoProvider::Runway => optimize_for_runway(&mut config, request),
            VideoProvider::Pika => optimize_for_pika(&mut config, request),
            VideoProvider::GeminiVeo => optimize_for_gemini_veo(&mut config, request),
            VideoProvider::Slideshow => optimize_for_slideshow(&mut config, request),
        }

        tracing::debug!(
            provider = %decision.provider,
            request_id = ?request.request_id,
            "prepared provider config"
        );
        config
    }

    /// Build payloads for a whole batch. Every item is prepared
    /// independently, then grouped by provider: slideshow items are flagged
    /// high priority (local assembly handles a pile of jobs fine), while AI
    /// providers with more than one item get staggered start delays to stay
    /// under their rate limits.
    pub fn prepare_batch(
        &self,
        requests: &[VideoRequest],
        decisions: &[RoutingDecision],
    ) -> Vec<JobConfig> {
        let mut configs: Vec<JobConfig> = requests
            .iter()
            .zip(decisions)
            .map(|(request, decision)| {
                let mut config = self.prepare(request, decision);
                config.set_param("batch_processing", json!(true));
                config
            })
            .collect();

        let mut group_sizes = std::collections::BTreeMap::new();
        for config in &configs {
            *group_sizes.entry(config.provider).or_insert(0usize) += 1;
        }

        let mut positions = std::collections::BTreeMap::new();
        for config in &mut configs {
            match config.provider {
                VideoProvider::Slideshow => {
                    config.set_param("batch_priority", json!("high"));
                }
                provider if group_sizes[&provider] > 1 => {
                    let idx = positions.entry(provider).or_insert(0u64);
                    config.set_param("batch_delay", json!(*idx * BATCH_STAGGER_SECS));
                    *idx += 1;
                }
                _ => {}
            }
        }

        configs
    }
}

fn provider_defaults(provider: VideoProvider) -> Vec<(&'static str, Value)> {
    match provider {
        VideoProvider::Runway => vec![
            ("resolution", json!("1920x1080")),
            ("fps", json!(24)),
            ("quality", json!("high")),
            ("style_strength", json!(0.8)),
        ],
        VideoProvider::Pika => vec![
            ("resolution", json!("1280x720")),
            ("fps", json!(24)),
            ("quality", json!("creative")),
            ("style_strength", json!(0.9)),
        ],
        VideoProvider::GeminiVeo => vec![
            ("resolution", json!("1280x720")),
            ("fps", json!(24)),
            ("quality", json!("creative")),
            ("style_strength", json!(0.7)),
        ],
        VideoProvider::Slideshow => vec![
            ("resolution", json!("1920x1080")),
            ("transition_duration", json!(0.5)),
            ("image_display_time", json!(3.0)),
            ("include_captions", json!(true)),
        ],
    }
}

fn optimize_for_runway(config: &mut JobConfig, request: &VideoRequest) {
    if matches!(
        request.style,
        VideoStyle::Cinematic | VideoStyle::Photorealistic | VideoStyle::Documentary
    ) {
        config.set_param("quality", json!("high"));
        config.set_param("style_strength", json!(0.9));
        config.set_param("enable_camera_movements", json!(true));
    }

    // Long renders go out as stitched segments.
    if matches!(request.duration, Some(d) if d > 60) {
        config.set_param("segment_generation", json!(true));
        config.set_param("max_segment_length", json!(30));
    }

    match request.aspect_ratio {
        AspectRatio::Vertical => config.set_param("resolution", json!("1080x1920")),
        AspectRatio::Square => config.set_param("resolution", json!("1080x1080")),
        AspectRatio::Widescreen => {}
    }
}

fn optimize_for_pika(config: &mut JobConfig, request: &VideoRequest) {
    if matches!(
        request.style,
        VideoStyle::Animation | VideoStyle::Artistic | VideoStyle::Abstract
    ) {
        config.set_param("creativity_boost", json!(true));
        config.set_param("style_strength", json!(1.0));
    }

    if matches!(request.duration, Some(d) if d <= 30) {
        config.set_param("generation_mode", json!("fast"));
        config.set_param("quality", json!("balanced"));
    }
}

fn optimize_for_gemini_veo(config: &mut JobConfig, request: &VideoRequest) {
    if matches!(request.style, VideoStyle::Animation | VideoStyle::Artistic) {
        config.set_param("animation_strength", json!(0.9));
        config.set_param("creative_freedom", json!(0.8));
    }

    config.set_param("cost_optimization", json!(true));
}

fn optimize_for_slideshow(config: &mut JobConfig, request: &VideoRequest) {
    match request.content_type {
        Some(ContentType::Educational) => {
            // Longer display so viewers can actually read the slides.
            config.set_param("image_display_time", json!(4.0));
            config.set_param("include_captions", json!(true));
            config.set_param("caption_position", json!("bottom"));
            config.set_param("transition_style", json!("fade"));
        }
        Some(ContentType::Corporate) => {
            config.set_param("transition_style", json!("professional"));
            config.set_param("image_style", json!("clean"));
            config.set_param("include_logo_space", json!(true));
        }
        _ => {}
    }

    if let Some(duration) = request.duration {
        let display_time = config
            .param("image_display_time")
            .and_then(Value::as_f64)
            .unwrap_or(3.0);
        let transition = config
            .param("transition_duration")
            .and_then(Value::as_f64)
            .unwrap_or(0.5);
        let images_needed = ((duration as f64 / (display_time + transition)) as i64).max(3);
        config.set_param("target_image_count", json!(images_needed));
    }

    if request.voice_style.is_some() {
        config.set_param("sync_to_voice", json!(true));
        config.set_param("voice_pause_detection", json!(true));
    }
}
