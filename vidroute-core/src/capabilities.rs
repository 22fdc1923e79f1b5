//! # Capability Registry
//!
//! Static per-provider metadata: duration limits, strengths, supported
//! resolutions, cost tiers, and the ordered fallback chain. The registry is
//! built once at startup from the built-in table, optionally overlaid with a
//! JSON document, and read-only afterwards. A broken or missing overlay file
//! logs a warning and leaves the built-ins in place; it never fails startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::{CostTier, QualityTier, VideoProvider, VideoStyle};

/// Immutable capability sheet for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Longest job this provider accepts, in seconds.
    pub max_duration: u32,
    /// Rough generation cost in wall-clock seconds per second of output.
    pub estimated_time_per_second: f64,
    pub quality: QualityTier,
    /// Style and content tags this provider is genuinely good at.
    pub strengths: Vec<String>,
    /// Supported output resolutions, preferred first.
    pub resolutions: Vec<String>,
    pub features: Vec<String>,
    pub cost_tier: CostTier,
    /// Ordered substitutes when this provider is unavailable. Never contains
    /// the provider itself.
    pub fallbacks: Vec<VideoProvider>,
}

impl Capabilities {
    pub fn supports_style(&self, style: VideoStyle) -> bool {
        self.strengths.iter().any(|s| s == style.as_str())
    }
}

/// Process-wide provider metadata, initialized once and shared behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    providers: BTreeMap<VideoProvider, Capabilities>,
    style_routing: BTreeMap<VideoStyle, VideoProvider>,
}

/// Partial per-provider override from the overlay document. Absent fields
/// keep their built-in values.
#[derive(Debug, Deserialize)]
struct CapabilityOverlay {
    max_duration: Option<u32>,
    estimated_time_per_second: Option<f64>,
    quality: Option<QualityTier>,
    strengths: Option<Vec<String>>,
    resolutions: Option<Vec<String>>,
    features: Option<Vec<String>>,
    cost_tier: Option<CostTier>,
    fallbacks: Option<Vec<VideoProvider>>,
}

#[derive(Debug, Deserialize)]
struct StyleRoute {
    provider: VideoProvider,
}

#[derive(Debug, Deserialize)]
struct OverlayDocument {
    #[serde(default)]
    providers: BTreeMap<VideoProvider, CapabilityOverlay>,
    #[serde(default)]
    style_routing: BTreeMap<VideoStyle, StyleRoute>,
}

impl CapabilityRegistry {
    /// The authoritative built-in table.
    pub fn builtin() -> Self {
        let mut providers = BTreeMap::new();

        providers.insert(
            VideoProvider::Runway,
            Capabilities {
                max_duration: 300,
                estimated_time_per_second: 2.0,
                quality: QualityTier::High,
                strengths: tags(&["cinematic", "photorealistic", "documentary", "corporate"]),
                resolutions: tags(&["1920x1080", "1080x1920", "1080x1080"]),
                features: tags(&["camera_movements", "photorealism", "narrative_flow"]),
                cost_tier: CostTier::High,
                fallbacks: vec![VideoProvider::GeminiVeo, VideoProvider::Slideshow],
            },
        );
        providers.insert(
            VideoProvider::Pika,
            Capabilities {
                max_duration: 120,
                estimated_time_per_second: 1.5,
                quality: QualityTier::Creative,
                strengths: tags(&["animation", "artistic", "abstract", "creative"]),
                resolutions: tags(&["1280x720", "720x1280", "1080x1080"]),
                features: tags(&["artistic_styles", "fast_generation", "experimental"]),
                cost_tier: CostTier::Medium,
                fallbacks: vec![
                    VideoProvider::GeminiVeo,
                    VideoProvider::Runway,
                    VideoProvider::Slideshow,
                ],
            },
        );
        providers.insert(
            VideoProvider::GeminiVeo,
            Capabilities {
                max_duration: 180,
                estimated_time_per_second: 1.0,
                quality: QualityTier::Creative,
                strengths: tags(&["animation", "creative", "artistic", "abstract"]),
                resolutions: tags(&["1280x720", "720x1280", "1080x1080"]),
                features: tags(&["fast_generation", "creative_effects", "animation"]),
                cost_tier: CostTier::Low,
                fallbacks: vec![
                    VideoProvider::Pika,
                    VideoProvider::Runway,
                    VideoProvider::Slideshow,
                ],
            },
        );
        providers.insert(
            VideoProvider::Slideshow,
            Capabilities {
                max_duration: 600,
                estimated_time_per_second: 0.1,
                quality: QualityTier::Standard,
                strengths: tags(&["educational", "presentation", "cost_effective", "long_form"]),
                resolutions: tags(&["1920x1080", "1080x1920", "1080x1080"]),
                features: tags(&[
                    "cost_effective",
                    "voice_sync",
                    "fast_generation",
                    "image_generation",
                ]),
                cost_tier: CostTier::VeryLow,
                fallbacks: vec![],
            },
        );

        let style_routing = BTreeMap::from([
            (VideoStyle::Cinematic, VideoProvider::Runway),
            (VideoStyle::Photorealistic, VideoProvider::Runway),
            (VideoStyle::Animation, VideoProvider::Pika),
            (VideoStyle::Artistic, VideoProvider::Pika),
            (VideoStyle::Abstract, VideoProvider::Pika),
            (VideoStyle::Documentary, VideoProvider::Runway),
            (VideoStyle::SlideshowModern, VideoProvider::Slideshow),
            (VideoStyle::SlideshowClassic, VideoProvider::Slideshow),
        ]);

        Self {
            providers,
            style_routing,
        }
    }

    /// Build the registry, overlaying the built-in table with the JSON
    /// document at `path` when one is configured. Any failure to read or
    /// parse the overlay logs a warning and keeps the built-ins.
    pub fn load(path: Option<&Path>) -> Self {
        let mut registry = Self::builtin();
        let Some(path) = path else {
            return registry;
        };

        match Self::read_overlay(path) {
            Ok(overlay) => {
                registry.apply_overlay(overlay);
                tracing::info!(path = %path.display(), "applied capability overlay");
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load capability overlay, using built-in defaults"
                );
            }
        }
        registry
    }

    fn read_overlay(path: &Path) -> anyhow::Result<OverlayDocument> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn apply_overlay(&mut self, overlay: OverlayDocument) {
        for (provider, patch) in overlay.providers {
            let caps = self
                .providers
                .get_mut(&provider)
                .expect("registry covers every provider");
            if let Some(v) = patch.max_duration {
                caps.max_duration = v;
            }
            if let Some(v) = patch.estimated_time_per_second {
                caps.estimated_time_per_second = v;
            }
            if let Some(v) = patch.quality {
                caps.quality = v;
            }
            if let Some(v) = patch.strengths {
                caps.strengths = v;
            }
            if let Some(v) = patch.resolutions {
                caps.resolutions = v;
            }
            if let Some(v) = patch.features {
                caps.features = v;
            }
            if let Some(v) = patch.cost_tier {
                caps.cost_tier = v;
            }
            if let Some(v) = patch.fallbacks {
                // A provider can never fall back to itself.
                caps.fallbacks = v.into_iter().filter(|p| *p != provider).collect();
            }
        }
        for (style, route) in overlay.style_routing {
            self.style_routing.insert(style, route.provider);
        }
    }

    /// Synchronous lookup. Every provider in the enum has an entry.
    pub fn capabilities(&self, provider: VideoProvider) -> &Capabilities {
        self.providers
            .get(&provider)
            .expect("registry covers every provider")
    }

    /// Full table, for the capabilities dump endpoint.
    pub fn all(&self) -> &BTreeMap<VideoProvider, Capabilities> {
        &self.providers
    }

    /// The provider a style is natively routed to when nothing else pulls
    /// the decision elsewhere.
    pub fn canonical_provider(&self, style: VideoStyle) -> Option<VideoProvider> {
        self.style_routing.get(&style).copied()
    }
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_matches_authoritative_values() {
        let registry = CapabilityRegistry::builtin();

        let runway = registry.capabilities(VideoProvider::Runway);
        assert_eq!(runway.max_duration, 300);
        assert_eq!(runway.quality, QualityTier::High);
        assert_eq!(runway.cost_tier, CostTier::High);
        assert_eq!(
            runway.fallbacks,
            vec![VideoProvider::GeminiVeo, VideoProvider::Slideshow]
        );

        let pika = registry.capabilities(VideoProvider::Pika);
        assert_eq!(pika.max_duration, 120);
        assert_eq!(pika.cost_tier, CostTier::Medium);

        let veo = registry.capabilities(VideoProvider::GeminiVeo);
        assert_eq!(veo.max_duration, 180);
        assert_eq!(veo.cost_tier, CostTier::Low);

        let slideshow = registry.capabilities(VideoProvider::Slideshow);
        assert_eq!(slideshow.max_duration, 600);
        assert_eq!(slideshow.cost_tier, CostTier::VeryLow);
        assert!(slideshow.fallbacks.is_empty());
    }

    #[test]
    fn test_every_provider_has_an_entry_and_no_self_fallback() {
        let registry = CapabilityRegistry::builtin();
        for provider in VideoProvider::ALL {
            let caps = registry.capabilities(provider);
            assert!(!caps.fallbacks.contains(&provider));
        }
        assert_eq!(registry.all().len(), VideoProvider::ALL.len());
    }

    #[test]
    fn test_missing_overlay_path_keeps_builtins() {
        let registry = CapabilityRegistry::load(Some(Path::new("/nonexistent/overlay.json")));
        assert_eq!(registry.capabilities(VideoProvider::Runway).max_duration, 300);
    }

    #[test]
    fn test_overlay_patches_only_named_fields() {
        let dir = std::env::temp_dir().join("vidroute-capability-overlay-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("overlay.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "providers": {
                    "runway": { "max_duration": 240, "fallbacks": ["runway", "slideshow"] }
                },
                "style_routing": {
                    "documentary": { "provider": "slideshow" }
                }
            })
            .to_string(),
        )
        .unwrap();

        let registry = CapabilityRegistry::load(Some(&path));
        let runway = registry.capabilities(VideoProvider::Runway);
        assert_eq!(runway.max_duration, 240);
        // Self-reference is dropped from the overlaid chain.
        assert_eq!(runway.fallbacks, vec![VideoProvider::Slideshow]);
        // Untouched fields keep their built-in values.
        assert_eq!(runway.quality, QualityTier::High);
        assert_eq!(
            registry.canonical_provider(VideoStyle::Documentary),
            Some(VideoProvider::Slideshow)
        );
        assert_eq!(
            registry.canonical_provider(VideoStyle::Cinematic),
            Some(VideoProvider::Runway)
        );
    }

    #[test]
    fn test_malformed_overlay_falls_back_to_builtins() {
        let dir = std::env::temp_dir().join("vidroute-capability-overlay-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let registry = CapabilityRegistry::load(Some(&path));
        assert_eq!(registry.capabilities(VideoProvider::Pika).max_duration, 120);
    }

    #[test]
    fn test_strengths_cover_the_advertised_styles() {
        let registry = CapabilityRegistry::builtin();
        assert!(registry
            .capabilities(VideoProvider::Runway)
            .supports_style(VideoStyle::Cinematic));
        assert!(registry
            .capabilities(VideoProvider::Pika)
            .supports_style(VideoStyle::Animation));
        assert!(!registry
            .capabilities(VideoProvider::Slideshow)
            .supports_style(VideoStyle::Cinematic));
    }
}
