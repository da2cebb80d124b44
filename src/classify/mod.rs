//! Transcript threat classification
//!
//! Debounces transcript changes, keeps at most one classification request
//! in flight, and maintains the sticky alert state. Cancellation is
//! cooperative: a superseded or torn-down request's result is discarded
//! without touching any state.

mod gemini;
mod scheduler;

pub use gemini::GeminiClassifier;
pub use scheduler::{
    AlertState, AlertStatus, ClassifierScheduler, ThreatClassifier, Verdict, ANALYSIS_DEBOUNCE,
};
