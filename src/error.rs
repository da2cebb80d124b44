//! Error taxonomy for the monitoring pipeline.
//!
//! Each sub-component surfaces its own error type; failures stay contained
//! within that component's state. Only capture acquisition aborts a session
//! start. Cancellation is not an error and must never reach an error field.

use thiserror::Error;

/// Capture device acquisition / lifecycle errors.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Camera/microphone permission denied or no device available.
    /// Fatal to `start()`, recoverable by retrying.
    #[error("capture device unavailable: {0}")]
    Device(String),

    /// A stream is already held; the caller must release it first.
    #[error("capture already active; release the current stream first")]
    AlreadyActive,
}

/// Speech-to-text errors.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// No speech recognition engine is available in this runtime.
    /// Disables transcription only; the rest of the session continues.
    #[error("live transcription not supported: {0}")]
    Unsupported(String),
}

/// Object detection errors.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The detection model failed to load. Terminal for the loop; it does
    /// not start.
    #[error("detection model failed to load: {0}")]
    ModelLoad(String),

    /// A single inference tick failed. Transient; the loop keeps running.
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Transcript classification errors.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The request was cancelled. The caller discards the result entirely;
    /// this variant must never be surfaced as state.
    #[error("classification cancelled")]
    Cancelled,

    /// The classifier is missing required configuration (e.g. API key).
    #[error("classifier not configured: {0}")]
    Unconfigured(String),

    /// The backing service was unreachable or rejected the request.
    #[error("classification failed: {0}")]
    Service(String),

    /// The service responded, but the payload could not be interpreted.
    #[error("unexpected classifier response: {0}")]
    Malformed(String),
}

/// Report dispatch errors. Surfaced in `ReportState` only.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no notification address associated with this account")]
    NoRecipient,

    #[error("unable to send alert: {0}")]
    Dispatch(String),
}
