use crate::capture::VideoFrame;
use crate::error::DetectError;
use std::sync::Arc;

/// Axis-aligned bounding box in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One detected object from a single inference pass.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Semantic label, when the model provides one
    pub label: Option<String>,
    /// Numeric class identifier, always present
    pub class_id: u32,
    /// Confidence in [0, 1]
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Label for display, falling back to the numeric class identifier.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("Class {}", self.class_id),
        }
    }
}

/// A loaded object-detection model.
#[async_trait::async_trait]
pub trait DetectionModel: Send + Sync {
    /// Run inference on a single frame.
    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<Detection>, DetectError>;
}

/// Loads a detection model. Loading happens at most once per session run;
/// the loop retains the loaded handle across stop/start cycles.
#[async_trait::async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn DetectionModel>, DetectError>;
}

/// Model that never reports anything. Keeps the loop shape intact when no
/// real model is configured.
#[derive(Debug, Default)]
pub struct NullModel;

#[async_trait::async_trait]
impl DetectionModel for NullModel {
    async fn detect(&self, _frame: &VideoFrame) -> Result<Vec<Detection>, DetectError> {
        Ok(Vec::new())
    }
}

/// Loader for an already-constructed model (tests, embedded models).
pub struct StaticModelLoader {
    model: Arc<dyn DetectionModel>,
}

impl StaticModelLoader {
    pub fn new(model: Arc<dyn DetectionModel>) -> Self {
        Self { model }
    }
}

#[async_trait::async_trait]
impl ModelLoader for StaticModelLoader {
    async fn load(&self) -> Result<Arc<dyn DetectionModel>, DetectError> {
        Ok(Arc::clone(&self.model))
    }
}
