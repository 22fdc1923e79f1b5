//! # Vidroute Core
//!
//! The routing and orchestration engine behind the vidroute gateway. It
//! decides which downstream video-generation provider should handle a
//! request, why, and what the provider-specific job payload looks like.
//!
//! ## Components
//!
//! - [`capabilities`]: the immutable per-provider capability registry, with
//!   an optional JSON overlay applied once at startup.
//! - [`routing`]: the multi-factor scorer that ranks providers per request
//!   and produces an explainable decision with a fallback.
//! - [`health`]: concurrent provider liveness probes with an
//!   environment-presence fallback and a fixed-backoff recovery wait.
//! - [`orchestrator`]: the transformer from high-level requests to
//!   provider-specific job configurations, including batch staggering.
//! - [`dispatch`]: the HTTP client for the downstream execution API.
//!
//! A single request flows strictly forward: route, health-check, transform,
//! dispatch. The only shared state is the capability registry, which is
//! read-only after initialization; everything else is per-call.

pub mod capabilities;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod models;
pub mod orchestrator;
pub mod routing;

pub use capabilities::{Capabilities, CapabilityRegistry};
pub use dispatch::{DispatchOutcome, ExecutionClient};
pub use error::CoreError;
pub use health::{HealthChecker, ProviderStatus};
pub use models::{
    AspectRatio, ContentType, JobConfig, OrchestrationResponse, Priority, RoutingDecision,
    VideoMode, VideoProvider, VideoRequest, VideoStyle,
};
pub use orchestrator::Orchestrator;
pub use routing::{Router, RoutingAnalysis};
