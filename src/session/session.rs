use super::config::SessionConfig;
use super::state::{SessionPhase, SessionStatus};
use crate::capture::{CaptureBackend, MediaStream};
use crate::classify::{ClassifierScheduler, ThreatClassifier};
use crate::detect::{DetectionLoop, ModelLoader, OverlaySurface};
use crate::error::ReportError;
use crate::report::{IdentityProvider, ReportDispatcher, ReportMetadata, ReportState, ReportStatus};
use crate::transcribe::{SpeechEngine, TranscriptState, TranscriptionStream};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// External collaborators injected into a session.
///
/// Every seam is a trait so sessions are independently constructible in
/// tests with scripted implementations.
pub struct Collaborators {
    pub capture: Box<dyn CaptureBackend>,
    pub engine: Box<dyn SpeechEngine>,
    pub loader: Arc<dyn ModelLoader>,
    pub surface: Arc<dyn OverlaySurface>,
    pub classifier: Arc<dyn ThreatClassifier>,
    pub identity: Arc<dyn IdentityProvider>,
    pub dispatcher: Arc<dyn ReportDispatcher>,
}

/// The live monitoring session aggregate.
///
/// Owns the capture stream exclusively; the transcription stream and the
/// detection loop only ever receive read-only references and are never
/// allowed to tear capture down themselves. All sub-component failures are
/// contained within that component's state; only capture acquisition
/// failure aborts `start`.
pub struct MonitorSession {
    config: SessionConfig,

    /// Serializes lifecycle transitions so `stop` is safe even while a
    /// `start` is still completing.
    ops: Mutex<()>,

    phase: Arc<Mutex<SessionPhase>>,
    error: Arc<Mutex<Option<String>>>,
    started_at: Arc<Mutex<Option<DateTime<Utc>>>>,

    capture: Mutex<Box<dyn CaptureBackend>>,
    stream: Mutex<Option<MediaStream>>,
    transcription: Mutex<TranscriptionStream>,
    detection: Mutex<DetectionLoop>,
    scheduler: Arc<ClassifierScheduler>,

    identity: Arc<dyn IdentityProvider>,
    dispatcher: Arc<dyn ReportDispatcher>,
    report_state: Arc<Mutex<ReportState>>,

    /// Task feeding transcript changes into the classifier scheduler
    feed_cancel: Mutex<Option<CancellationToken>>,
    feed_task: Mutex<Option<JoinHandle<()>>>,
}

impl MonitorSession {
    pub fn new(config: SessionConfig, parts: Collaborators) -> Self {
        let detection = DetectionLoop::new(parts.loader, parts.surface)
            .with_interval(config.detection_interval)
            .with_max_objects(config.max_tracked_objects)
            .with_min_confidence(config.min_confidence);
        let scheduler = Arc::new(
            ClassifierScheduler::new(parts.classifier).with_debounce(config.analysis_debounce),
        );
        Self {
            config,
            ops: Mutex::new(()),
            phase: Arc::new(Mutex::new(SessionPhase::Stopped)),
            error: Arc::new(Mutex::new(None)),
            started_at: Arc::new(Mutex::new(None)),
            capture: Mutex::new(parts.capture),
            stream: Mutex::new(None),
            transcription: Mutex::new(TranscriptionStream::new(parts.engine)),
            detection: Mutex::new(detection),
            scheduler,
            identity: parts.identity,
            dispatcher: parts.dispatcher,
            report_state: Arc::new(Mutex::new(ReportState::default())),
            feed_cancel: Mutex::new(None),
            feed_task: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Start monitoring. Valid from `Stopped` only.
    ///
    /// Capture acquisition failure aborts the start and returns the
    /// session to `Stopped`. A missing speech engine or a failed model
    /// load do not: they disable only their own sub-component.
    pub async fn start(&self) -> Result<()> {
        let _ops = self.ops.lock().await;

        {
            let mut phase = self.phase.lock().await;
            if *phase != SessionPhase::Stopped {
                anyhow::bail!("monitoring session already active");
            }
            *phase = SessionPhase::Starting;
        }
        *self.error.lock().await = None;

        info!("starting monitoring session {}", self.config.session_id);

        // Fresh session: discard everything from the previous run.
        self.transcription.lock().await.reset().await;
        self.scheduler.reset().await;
        *self.report_state.lock().await = ReportState::default();

        let stream = {
            let mut capture = self.capture.lock().await;
            match capture.acquire().await {
                Ok(stream) => stream,
                Err(e) => {
                    *self.error.lock().await = Some(e.to_string());
                    *self.phase.lock().await = SessionPhase::Stopped;
                    return Err(anyhow::Error::new(e))
                        .context("failed to acquire capture device");
                }
            }
        };
        *self.started_at.lock().await = Some(Utc::now());

        {
            let mut transcription = self.transcription.lock().await;
            if let Err(e) = transcription.start().await {
                warn!("transcription disabled for this session: {}", e);
            }
        }
        self.spawn_transcript_feed().await;

        self.detection.lock().await.start(stream.frames()).await;
        *self.stream.lock().await = Some(stream);

        *self.phase.lock().await = SessionPhase::Active;
        info!("monitoring session {} active", self.config.session_id);
        Ok(())
    }

    /// Stop monitoring. Valid from any non-`Stopped` phase; a no-op when
    /// already stopped.
    ///
    /// Teardown is best-effort and total: every sub-step runs regardless
    /// of earlier failures, including mid-flight cancellation of the
    /// transcription stream, the detection loop, and any pending or
    /// in-flight classification.
    pub async fn stop(&self) {
        let _ops = self.ops.lock().await;

        {
            let mut phase = self.phase.lock().await;
            if *phase == SessionPhase::Stopped {
                return;
            }
            *phase = SessionPhase::Stopping;
        }
        info!("stopping monitoring session {}", self.config.session_id);

        self.transcription.lock().await.stop().await;

        if let Some(mut stream) = self.stream.lock().await.take() {
            stream.release();
        }

        self.detection.lock().await.stop().await;

        if let Some(cancel) = self.feed_cancel.lock().await.take() {
            cancel.cancel();
        }
        if let Some(task) = self.feed_task.lock().await.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("transcript feed task failed: {}", e);
                }
            }
        }

        self.scheduler.reset().await;
        *self.report_state.lock().await = ReportState::default();
        *self.started_at.lock().await = None;

        *self.phase.lock().await = SessionPhase::Stopped;
        info!("monitoring session {} stopped", self.config.session_id);
    }

    /// Dispatch a suspicious-activity report to the resolved recipient.
    ///
    /// Available independent of the alert state; the outcome lands in the
    /// report state only.
    pub async fn report(&self) -> Result<(), ReportError> {
        let Some(recipient) = self.identity.notification_address().await else {
            let error = ReportError::NoRecipient;
            *self.report_state.lock().await = ReportState {
                status: ReportStatus::Error,
                message: error.to_string(),
            };
            return Err(error);
        };

        *self.report_state.lock().await = ReportState {
            status: ReportStatus::Pending,
            message: "Sending alert...".to_string(),
        };

        let metadata = ReportMetadata::default();
        match self.dispatcher.dispatch(&recipient, &metadata).await {
            Ok(()) => {
                *self.report_state.lock().await = ReportState {
                    status: ReportStatus::Success,
                    message: "Alert sent. Check your inbox for BikeGuard updates.".to_string(),
                };
                Ok(())
            }
            Err(e) => {
                warn!("report dispatch failed: {}", e);
                *self.report_state.lock().await = ReportState {
                    status: ReportStatus::Error,
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Snapshot the whole session for the presentation layer.
    pub async fn status(&self) -> SessionStatus {
        let transcript = self.transcription.lock().await.snapshot().await;
        SessionStatus {
            session_id: self.config.session_id.clone(),
            phase: *self.phase.lock().await,
            started_at: *self.started_at.lock().await,
            error: self.error.lock().await.clone(),
            listening: transcript.listening,
            transcript_segments: transcript.segments.len(),
            alert: self.scheduler.snapshot().await,
            detection: self.detection.lock().await.snapshot().await,
            report: self.report_state.lock().await.clone(),
        }
    }

    /// Current transcript content (finalized segments plus live text).
    pub async fn transcript(&self) -> TranscriptState {
        self.transcription.lock().await.snapshot().await
    }

    async fn spawn_transcript_feed(&self) {
        let mut transcript_rx = self.transcription.lock().await.transcript_watch();
        let scheduler = Arc::clone(&self.scheduler);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    changed = transcript_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                let text = transcript_rx.borrow_and_update().clone();
                scheduler.on_transcript(&text).await;
            }
        });

        *self.feed_cancel.lock().await = Some(cancel);
        *self.feed_task.lock().await = Some(task);
    }
}
