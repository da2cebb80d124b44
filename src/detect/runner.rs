use super::model::{DetectionModel, ModelLoader};
use super::overlay::{draw_detections, OverlaySurface};
use crate::capture::FrameSource;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Minimum interval between inference passes. Ticks arrive once per
/// rendered frame and may be far more frequent; inference itself is
/// rate-limited to this interval.
pub const DETECTION_INTERVAL: Duration = Duration::from_millis(250);

/// How many detections the state list retains per pass.
pub const MAX_TRACKED_OBJECTS: usize = 6;

/// Detections below this confidence are discarded before drawing.
pub const MIN_CONFIDENCE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    #[default]
    Idle,
    Loading,
    Running,
    Error,
}

/// One entry in the detected-object summary list.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f32,
}

/// Detection loop state, snapshotted for display. The object list is
/// transient; each successful pass overwrites the previous one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionState {
    pub status: DetectionStatus,
    pub objects: Vec<DetectedObject>,
    pub error: Option<String>,
}

/// Self-rescheduling detection loop bound to a [`FrameSource`].
///
/// Inference passes are strictly sequential: a tick that arrives while a
/// pass is in flight is simply consumed after the pass completes. The
/// loaded model is retained across stop/start cycles to avoid reload cost;
/// loop timing state is not.
pub struct DetectionLoop {
    loader: Arc<dyn ModelLoader>,
    surface: Arc<dyn OverlaySurface>,
    model: Arc<Mutex<Option<Arc<dyn DetectionModel>>>>,
    state: Arc<Mutex<DetectionState>>,
    interval: Duration,
    max_objects: usize,
    min_confidence: f32,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl DetectionLoop {
    pub fn new(loader: Arc<dyn ModelLoader>, surface: Arc<dyn OverlaySurface>) -> Self {
        Self {
            loader,
            surface,
            model: Arc::new(Mutex::new(None)),
            state: Arc::new(Mutex::new(DetectionState::default())),
            interval: DETECTION_INTERVAL,
            max_objects: MAX_TRACKED_OBJECTS,
            min_confidence: MIN_CONFIDENCE,
            cancel: None,
            task: None,
        }
    }

    /// Override the inference throttle interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override how many detections the state list retains.
    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    /// Override the confidence floor.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub async fn snapshot(&self) -> DetectionState {
        self.state.lock().await.clone()
    }

    /// Load the model (once) and start ticking against `frames`.
    ///
    /// A load failure is terminal for this run: it lands in the detection
    /// state and the loop does not start. It never propagates further.
    pub async fn start(&mut self, frames: Arc<FrameSource>) {
        self.halt().await;

        {
            let mut state = self.state.lock().await;
            state.status = DetectionStatus::Loading;
            state.error = None;
        }

        let model = {
            let mut cached = self.model.lock().await;
            match cached.as_ref() {
                Some(model) => Arc::clone(model),
                None => match self.loader.load().await {
                    Ok(model) => {
                        *cached = Some(Arc::clone(&model));
                        info!("detection model loaded");
                        model
                    }
                    Err(e) => {
                        warn!("detection disabled: {}", e);
                        let mut state = self.state.lock().await;
                        state.status = DetectionStatus::Error;
                        state.objects.clear();
                        state.error = Some(e.to_string());
                        return;
                    }
                },
            }
        };

        {
            let mut state = self.state.lock().await;
            state.status = DetectionStatus::Running;
        }
        self.surface.clear();

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let state = Arc::clone(&self.state);
        let surface = Arc::clone(&self.surface);
        let interval = self.interval;
        let max_objects = self.max_objects;
        let min_confidence = self.min_confidence;

        let task = tokio::spawn(async move {
            let mut last_inference: Option<Instant> = None;
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = frames.next_tick() => {}
                }
                // Frame source not decodable yet: wait for the next tick
                // without running inference.
                if !frames.ready() {
                    continue;
                }
                let now = Instant::now();
                if let Some(last) = last_inference {
                    if now.duration_since(last) < interval {
                        continue;
                    }
                }
                last_inference = Some(now);
                let Some(frame) = frames.latest() else {
                    continue;
                };
                match model.detect(&frame).await {
                    Ok(mut detections) => {
                        if task_cancel.is_cancelled() {
                            break;
                        }
                        detections.retain(|d| d.confidence >= min_confidence);
                        draw_detections(surface.as_ref(), &detections);
                        let mut s = state.lock().await;
                        s.status = DetectionStatus::Running;
                        s.error = None;
                        s.objects = detections
                            .iter()
                            .take(max_objects)
                            .map(|d| DetectedObject {
                                label: d.display_label(),
                                confidence: d.confidence,
                            })
                            .collect();
                    }
                    Err(e) => {
                        // Transient; keep rescheduling.
                        warn!("detection tick failed: {}", e);
                        if task_cancel.is_cancelled() {
                            break;
                        }
                        let mut s = state.lock().await;
                        s.status = DetectionStatus::Error;
                        s.objects.clear();
                        s.error = Some(e.to_string());
                    }
                }
            }
        });

        self.cancel = Some(cancel);
        self.task = Some(task);
    }

    /// Cancel the loop, clear the overlay and reset state to idle.
    /// Idempotent. The loaded model is retained.
    pub async fn stop(&mut self) {
        self.halt().await;
        self.surface.clear();
        let mut state = self.state.lock().await;
        *state = DetectionState::default();
    }

    async fn halt(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("detection task failed: {}", e);
                }
            }
        }
    }
}

impl Drop for DetectionLoop {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}
