//! Common types, result aliases, and the pipeline error taxonomy.

use thiserror::Error;

/// Crate-wide error type.
pub type Err = anyhow::Error;
/// Crate-wide result type.
pub type Res<T> = Result<T, Err>;
/// Result type for operations that return no value.
pub type Void = Res<()>;

/// Failure taxonomy for the turn pipeline.
///
/// None of these are caught within the pipeline: they propagate through the
/// delivery controller and surface as an unhandled-error response to Slack.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The inbound payload was missing a required field (`event.user`,
    /// `event.text`, or the reply channel).
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    /// The agent backend or one of its tools failed (rate limit, network, ...).
    #[error("agent invocation failed: {0}")]
    AgentInvocation(#[source] Err),
    /// The conversation store rejected the write.
    #[error("store write failed: {0}")]
    StoreWrite(#[source] Err),
}
