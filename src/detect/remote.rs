use super::model::{BoundingBox, Detection, DetectionModel, ModelLoader};
use crate::capture::VideoFrame;
use crate::error::DetectError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Wire format for one detection from the remote inference server.
#[derive(Debug, Deserialize)]
struct RemoteDetection {
    label: Option<String>,
    class_id: u32,
    confidence: f32,
    /// [x, y, width, height] in frame pixel coordinates
    bbox: [f32; 4],
}

#[derive(Debug, Deserialize)]
struct RemoteModelInfo {
    model: String,
}

/// Loader for a YOLO-style inference server reachable over HTTP.
///
/// `load` verifies the server is up and the model is resident; `detect`
/// posts raw RGB frames and receives the detection list as JSON.
pub struct RemoteModelLoader {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteModelLoader {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ModelLoader for RemoteModelLoader {
    async fn load(&self) -> Result<Arc<dyn DetectionModel>, DetectError> {
        let url = format!("{}/model", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DetectError::ModelLoad(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DetectError::ModelLoad(format!(
                "inference server returned {}",
                response.status()
            )));
        }
        let info: RemoteModelInfo = response
            .json()
            .await
            .map_err(|e| DetectError::ModelLoad(e.to_string()))?;
        info!("remote detection model ready: {}", info.model);
        Ok(Arc::new(RemoteModel {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
        }))
    }
}

struct RemoteModel {
    http: reqwest::Client,
    base_url: String,
}

#[async_trait::async_trait]
impl DetectionModel for RemoteModel {
    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<Detection>, DetectError> {
        let url = format!(
            "{}/detect?width={}&height={}",
            self.base_url, frame.width, frame.height
        );
        let response = self
            .http
            .post(&url)
            .header("content-type", "application/octet-stream")
            .body(frame.data.clone())
            .send()
            .await
            .map_err(|e| DetectError::Inference(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DetectError::Inference(format!(
                "inference server returned {}",
                response.status()
            )));
        }
        let detections: Vec<RemoteDetection> = response
            .json()
            .await
            .map_err(|e| DetectError::Inference(e.to_string()))?;
        Ok(detections
            .into_iter()
            .map(|d| Detection {
                label: d.label,
                class_id: d.class_id,
                confidence: d.confidence,
                bbox: BoundingBox {
                    x: d.bbox[0],
                    y: d.bbox[1],
                    width: d.bbox[2],
                    height: d.bbox[3],
                },
            })
            .collect())
    }
}
