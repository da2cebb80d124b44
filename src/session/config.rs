use crate::classify::ANALYSIS_DEBOUNCE;
use crate::detect::{DETECTION_INTERVAL, MAX_TRACKED_OBJECTS, MIN_CONFIDENCE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a monitoring session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Minimum interval between detection inference passes
    pub detection_interval: Duration,

    /// Quiet period before transcript classification fires
    pub analysis_debounce: Duration,

    /// How many detections the live-object list retains
    pub max_tracked_objects: usize,

    /// Detections below this confidence are discarded
    pub min_confidence: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("monitor-{}", uuid::Uuid::new_v4()),
            detection_interval: DETECTION_INTERVAL,
            analysis_debounce: ANALYSIS_DEBOUNCE,
            max_tracked_objects: MAX_TRACKED_OBJECTS,
            min_confidence: MIN_CONFIDENCE,
        }
    }
}
