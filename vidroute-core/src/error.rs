use thiserror::Error;

/// Errors produced by the orchestration engine.
///
/// The gateway maps each variant to an HTTP status; the library itself only
/// distinguishes the failure kinds.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed request: empty topic, non-positive duration.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Every provider scored zero for this request.
    #[error("No provider can satisfy this request")]
    NoViableProvider,

    /// The chosen provider is down and no fallback is available.
    #[error("No healthy providers available")]
    NoHealthyProvider,

    /// The execution API answered with something other than 202. The body is
    /// passed through verbatim.
    #[error("Execution API error: {status} - {body}")]
    Dispatch { status: u16, body: String },

    /// Network-level failure talking to the execution API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization and deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
