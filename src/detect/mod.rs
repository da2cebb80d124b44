//! Throttled object detection over live video frames
//!
//! A self-rescheduling loop feeds frames to a pretrained detection model
//! and renders bounding-box overlays. Inference is strictly sequential and
//! rate-limited; transient inference failures never stop the loop.

mod model;
mod overlay;
mod remote;
mod runner;

pub use model::{BoundingBox, Detection, DetectionModel, ModelLoader, NullModel, StaticModelLoader};
pub use overlay::{draw_detections, CommandSurface, DrawCommand, OverlaySurface};
pub use remote::RemoteModelLoader;
pub use runner::{
    DetectedObject, DetectionLoop, DetectionState, DetectionStatus, DETECTION_INTERVAL,
    MAX_TRACKED_OBJECTS, MIN_CONFIDENCE,
};
