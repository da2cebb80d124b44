use crate::classify::AlertState;
use crate::detect::DetectionState;
use crate::report::ReportState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Stopped,
    Starting,
    Active,
    Stopping,
}

/// Point-in-time snapshot of the whole session for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub phase: SessionPhase,
    pub started_at: Option<DateTime<Utc>>,
    /// Session-level error (capture acquisition failure)
    pub error: Option<String>,
    /// Whether the speech engine is currently listening
    pub listening: bool,
    /// Number of finalized transcript segments so far
    pub transcript_segments: usize,
    pub alert: AlertState,
    pub detection: DetectionState,
    pub report: ReportState,
}
