//! # Provider Routing
//!
//! Multi-factor provider selection. Every provider is scored on five factors
//! (style, content type, duration, quality, cost), each in [0, 1], combined
//! with fixed weights into a total. The best-scoring provider wins, the
//! second-best is recorded as the fallback, and the winning factor is turned
//! into a human-readable reason.
//!
//! All scoring tables live here as static data rather than branching logic,
//! so property tests can sweep every (style, provider) pair. Columns follow
//! [`VideoProvider::ALL`] order: runway, pika, gemini_veo, slideshow.
//!
//! The router is stateless; scoring is deterministic for a given registry.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::capabilities::CapabilityRegistry;
use crate::error::CoreError;
use crate::models::{
    ContentType, CostTier, Priority, QualityTier, RoutingDecision, VideoProvider, VideoRequest,
    VideoStyle,
};

const WEIGHT_STYLE: f64 = 0.30;
const WEIGHT_CONTENT: f64 = 0.25;
const WEIGHT_DURATION: f64 = 0.20;
const WEIGHT_QUALITY: f64 = 0.15;
const WEIGHT_COST: f64 = 0.10;

/// Style compatibility when the style is not among a provider's strengths.
/// Styles without a row (the slideshow_* pair) score the neutral 0.5.
const STYLE_COMPATIBILITY: &[(VideoStyle, [f64; 4])] = &[
    (VideoStyle::Cinematic, [1.0, 0.6, 0.7, 0.3]),
    (VideoStyle::Photorealistic, [1.0, 0.5, 0.6, 0.4]),
    (VideoStyle::Animation, [0.6, 1.0, 0.9, 0.7]),
    (VideoStyle::Artistic, [0.5, 1.0, 0.9, 0.6]),
    (VideoStyle::Abstract, [0.4, 1.0, 0.9, 0.5]),
    (VideoStyle::Documentary, [1.0, 0.4, 0.6, 0.8]),
];

const CONTENT_PREFERENCES: &[(ContentType, [f64; 4])] = &[
    (ContentType::Educational, [0.7, 0.5, 0.6, 1.0]),
    (ContentType::Entertainment, [0.8, 1.0, 0.9, 0.4]),
    (ContentType::Corporate, [1.0, 0.4, 0.6, 0.8]),
    (ContentType::Creative, [0.6, 1.0, 0.9, 0.5]),
];

/// Duration preference bands: short favors fast generators, medium is
/// balanced, long favors cost-effective options.
const DURATION_SHORT: [f64; 4] = [0.7, 0.9, 1.0, 0.8];
const DURATION_MEDIUM: [f64; 4] = [1.0, 0.9, 0.9, 0.8];
const DURATION_LONG: [f64; 4] = [0.5, 0.6, 0.7, 1.0];

/// Quality compatibility keyed as (required tier, provider tier).
const QUALITY_SCORES: &[(QualityTier, QualityTier, f64)] = &[
    (QualityTier::High, QualityTier::High, 1.0),
    (QualityTier::High, QualityTier::Creative, 0.8),
    (QualityTier::High, QualityTier::Standard, 0.6),
    (QualityTier::Creative, QualityTier::Creative, 1.0),
    (QualityTier::Creative, QualityTier::High, 0.9),
    (QualityTier::Creative, QualityTier::Standard, 0.7),
    (QualityTier::Standard, QualityTier::Standard, 1.0),
    (QualityTier::Standard, QualityTier::Creative, 0.9),
    (QualityTier::Standard, QualityTier::High, 0.8),
];

/// Hints attached when a provider is asked to emulate a style it is not the
/// canonical home for.
const STYLE_ADAPTATIONS: &[(VideoStyle, VideoProvider, &[(&str, &str)])] = &[
    (
        VideoStyle::Cinematic,
        VideoProvider::GeminiVeo,
        &[
            (
                "prompt_enhancement",
                "cinematic style with dramatic camera angles and professional lighting",
            ),
            (
                "duration_adjustment",
                "Consider shorter duration for optimal quality",
            ),
        ],
    ),
    (
        VideoStyle::Cinematic,
        VideoProvider::Pika,
        &[
            (
                "prompt_enhancement",
                "cinematic style with dramatic lighting and camera movements",
            ),
            (
                "quality_note",
                "May have more artistic interpretation than pure cinematic",
            ),
        ],
    ),
    (
        VideoStyle::Cinematic,
        VideoProvider::Slideshow,
        &[
            (
                "image_style",
                "cinematic photography style with dramatic lighting",
            ),
            (
                "transition_effects",
                "Use cross-fades and professional transitions",
            ),
        ],
    ),
    (
        VideoStyle::Animation,
        VideoProvider::Runway,
        &[
            (
                "prompt_enhancement",
                "animated style with smooth motion and cartoon-like elements",
            ),
            ("style_note", "May be more realistic than pure animation"),
        ],
    ),
    (
        VideoStyle::Animation,
        VideoProvider::Slideshow,
        &[
            ("image_style", "cartoon and animated illustration style"),
            (
                "sequence_timing",
                "Use quick transitions to simulate animation",
            ),
        ],
    ),
];

/// The scoring factor that contributed most to a provider's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Style,
    Content,
    Duration,
    Quality,
    Cost,
}

/// Full scoring breakdown for one provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderScore {
    pub provider: VideoProvider,
    pub style_score: f64,
    pub content_score: f64,
    pub duration_score: f64,
    pub quality_score: f64,
    pub cost_score: f64,
    /// Weighted sum, forced to 0.0 when the provider is excluded.
    pub total_score: f64,
    /// True when the requested duration exceeds the provider's limit.
    pub excluded: bool,
    pub primary_factor: ScoreFactor,
    pub reason: String,
    /// Projected generation time for the requested duration, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_generation_seconds: Option<f64>,
}

/// Scoring breakdown for a request without executing anything.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingAnalysis {
    /// Per-provider breakdowns in the fixed provider order.
    pub scores: Vec<ProviderScore>,
    /// Viable providers, best first.
    pub ranked: Vec<VideoProvider>,
    /// Providers excluded by the duration limit.
    pub excluded: Vec<VideoProvider>,
    /// Where this style is natively routed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_provider: Option<VideoProvider>,
    pub recommendations: Vec<String>,
}

/// Multi-factor provider router.
///
/// Holds only a shared handle to the immutable capability registry; safe to
/// call from any number of request handlers concurrently.
#[derive(Clone)]
pub struct Router {
    registry: Arc<CapabilityRegistry>,
}

impl Router {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Decide which provider should handle `request`.
    ///
    /// An explicit `preferred_provider` short-circuits scoring entirely and
    /// comes back with confidence 1.0. Otherwise all providers are scored,
    /// the winner becomes the decision and the runner-up the fallback.
    /// Returns [`CoreError::NoViableProvider`] when every provider scores
    /// zero, which happens when the duration exceeds every limit.
    pub fn route(&self, request: &VideoRequest) -> Result<RoutingDecision, CoreError> {
        if let Some(provider) = request.preferred_provider {
            return Ok(RoutingDecision {
                provider,
                mode: provider.mode(),
                reason: format!("User explicitly requested {provider}"),
                confidence: 1.0,
                fallback_provider: None,
                adaptations: style_adaptations(request.style, provider),
            });
        }

        let scores = self.score_all(request);
        let ranked = rank(&scores);
        let best = *ranked.first().ok_or(CoreError::NoViableProvider)?;
        let fallback = ranked.get(1).map(|s| s.provider);

        tracing::debug!(
            provider = %best.provider,
            confidence = best.total_score,
            fallback = ?fallback,
            "routing decision"
        );

        Ok(RoutingDecision {
            provider: best.provider,
            mode: best.provider.mode(),
            reason: best.reason.clone(),
            confidence: best.total_score,
            fallback_provider: fallback,
            adaptations: style_adaptations(request.style, best.provider),
        })
    }

    /// Pure scoring view: the complete breakdown, ranking, and
    /// recommendations, with no side effects.
    pub fn analyze(&self, request: &VideoRequest) -> RoutingAnalysis {
        let scores = self.score_all(request);
        let ranked: Vec<VideoProvider> = rank(&scores).iter().map(|s| s.provider).collect();
        let excluded: Vec<VideoProvider> = scores
            .iter()
            .filter(|s| s.excluded)
            .map(|s| s.provider)
            .collect();
        let canonical = self.registry.canonical_provider(request.style);

        let mut recommendations = Vec::new();
        if let (Some(canonical), Some(winner)) = (canonical, ranked.first()) {
            if canonical != *winner {
                recommendations.push(format!(
                    "{} content is natively handled by {canonical}; style adaptations apply on {winner}",
                    request.style
                ));
            }
        }
        if let Some(duration) = request.duration {
            for provider in &excluded {
                let limit = self.registry.capabilities(*provider).max_duration;
                recommendations.push(format!(
                    "{provider} cannot handle {duration}s videos (limit {limit}s)"
                ));
            }
        }

        RoutingAnalysis {
            scores,
            ranked,
            excluded,
            canonical_provider: canonical,
            recommendations,
        }
    }

    fn score_all(&self, request: &VideoRequest) -> Vec<ProviderScore> {
        VideoProvider::ALL
            .iter()
            .map(|provider| self.score_provider(*provider, request))
            .collect()
    }

    fn score_provider(&self, provider: VideoProvider, request: &VideoRequest) -> ProviderScore {
        let caps = self.registry.capabilities(provider);

        let style_score = if caps.supports_style(request.style) {
            1.0
        } else {
            style_compatibility(request.style, provider)
        };
        let content_score = content_preference(request.content_type, provider);
        let excluded = matches!(request.duration, Some(d) if d > caps.max_duration);
        let duration_score = if excluded {
            0.0
        } else {
            duration_preference(request.duration, provider)
        };
        let quality_score = quality_match(required_quality(request.style), caps.quality);
        let cost_score = cost_efficiency(caps.cost_tier, request.priority);

        // A provider that cannot fit the requested duration is out entirely,
        // no matter how well the other factors line up.
        let total_score = if excluded {
            0.0
        } else {
            style_score * WEIGHT_STYLE
                + content_score * WEIGHT_CONTENT
                + duration_score * WEIGHT_DURATION
                + quality_score * WEIGHT_QUALITY
                + cost_score * WEIGHT_COST
        };

        let primary_factor = primary_factor(&[
            (ScoreFactor::Style, style_score),
            (ScoreFactor::Content, content_score),
            (ScoreFactor::Duration, duration_score),
            (ScoreFactor::Quality, quality_score),
            (ScoreFactor::Cost, cost_score),
        ]);
        let reason = routing_reason(provider, primary_factor, request);
        let estimated_generation_seconds = request
            .duration
            .map(|d| d as f64 * caps.estimated_time_per_second);

        ProviderScore {
            provider,
            style_score,
            content_score,
            duration_score,
            quality_score,
            cost_score,
            total_score,
            excluded,
            primary_factor,
            reason,
            estimated_generation_seconds,
        }
    }
}

/// Viable providers sorted best first. The sort is stable, so equal totals
/// keep the fixed provider order.
fn rank(scores: &[ProviderScore]) -> Vec<&ProviderScore> {
    let mut ranked: Vec<&ProviderScore> = scores.iter().filter(|s| s.total_score > 0.0).collect();
    ranked.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

fn style_compatibility(style: VideoStyle, provider: VideoProvider) -> f64 {
    STYLE_COMPATIBILITY
        .iter()
        .find(|(s, _)| *s == style)
        .map(|(_, row)| row[provider.index()])
        .unwrap_or(0.5)
}

fn content_preference(content_type: Option<ContentType>, provider: VideoProvider) -> f64 {
    let Some(content_type) = content_type else {
        return 0.7;
    };
    CONTENT_PREFERENCES
        .iter()
        .find(|(c, _)| *c == content_type)
        .map(|(_, row)| row[provider.index()])
        .unwrap_or(0.6)
}

fn duration_preference(duration: Option<u32>, provider: VideoProvider) -> f64 {
    let Some(duration) = duration else {
        return 0.7;
    };
    let band = if duration <= 30 {
        &DURATION_SHORT
    } else if duration <= 120 {
        &DURATION_MEDIUM
    } else {
        &DURATION_LONG
    };
    band[provider.index()]
}

fn required_quality(style: VideoStyle) -> QualityTier {
    match style {
        VideoStyle::Cinematic | VideoStyle::Photorealistic | VideoStyle::Documentary => {
            QualityTier::High
        }
        VideoStyle::Animation | VideoStyle::Artistic | VideoStyle::Abstract => QualityTier::Creative,
        VideoStyle::SlideshowModern | VideoStyle::SlideshowClassic => QualityTier::Standard,
    }
}

fn quality_match(required: QualityTier, provided: QualityTier) -> f64 {
    QUALITY_SCORES
        .iter()
        .find(|(r, p, _)| *r == required && *p == provided)
        .map(|(_, _, score)| *score)
        .unwrap_or(0.7)
}

fn cost_efficiency(tier: CostTier, priority: Priority) -> f64 {
    let base: f64 = match tier {
        CostTier::VeryLow => 1.0,
        CostTier::Low => 0.8,
        CostTier::Medium => 0.6,
        CostTier::High => 0.4,
    };
    match priority {
        // Cost matters less when the caller wants it fast.
        Priority::High => (base * 0.7).min(1.0),
        Priority::Low | Priority::Standard => base,
    }
}

/// Highest raw sub-score wins; ties resolve in factor order.
fn primary_factor(factors: &[(ScoreFactor, f64)]) -> ScoreFactor {
    let mut best = factors[0];
    for candidate in &factors[1..] {
        if candidate.1 > best.1 {
            best = *candidate;
        }
    }
    best.0
}

fn routing_reason(
    provider: VideoProvider,
    factor: ScoreFactor,
    request: &VideoRequest,
) -> String {
    match factor {
        ScoreFactor::Style => {
            format!("{provider} excels at {} style content", request.style)
        }
        ScoreFactor::Content => match request.content_type {
            Some(content_type) => format!(
                "{provider} is optimized for {} content",
                content_type.as_str()
            ),
            None => generic_reason(provider),
        },
        ScoreFactor::Duration => match request.duration {
            Some(duration) => {
                format!("{provider} is optimal for {duration}s duration videos")
            }
            None => generic_reason(provider),
        },
        ScoreFactor::Quality => format!(
            "{provider} provides the quality level needed for {}",
            request.style
        ),
        ScoreFactor::Cost => {
            format!("{provider} offers the most cost-effective solution")
        }
    }
}

fn generic_reason(provider: VideoProvider) -> String {
    format!("{provider} selected based on comprehensive analysis")
}

/// Style emulation hints for a (style, provider) pair, or `None` when the
/// pair needs no adaptation.
pub fn style_adaptations(
    style: VideoStyle,
    provider: VideoProvider,
) -> Option<BTreeMap<String, String>> {
    STYLE_ADAPTATIONS
        .iter()
        .find(|(s, p, _)| *s == style && *p == provider)
        .map(|(_, _, entries)| {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
}
