use crate::error::ClassifyError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Quiet period after the last transcript change before a classification
/// request is issued.
pub const ANALYSIS_DEBOUNCE: Duration = Duration::from_millis(1200);

/// Classifier verdict for one transcript snapshot.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub alert: bool,
    pub reason: String,
}

/// External transcript classifier.
///
/// Implementations should abandon work promptly once `cancel` fires and
/// return [`ClassifyError::Cancelled`]; the scheduler discards cancelled
/// results entirely either way.
#[async_trait::async_trait]
pub trait ThreatClassifier: Send + Sync {
    async fn classify(
        &self,
        transcript: &str,
        cancel: &CancellationToken,
    ) -> Result<Verdict, ClassifyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Alert condition derived from transcript classification.
///
/// `triggered` is sticky: once a classification marks the transcript as
/// alerting it stays true until the session resets, even if a later
/// classification on newer text comes back negative.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertState {
    pub status: AlertStatus,
    pub triggered: bool,
    pub reason: String,
    pub error: String,
}

/// Debounce-and-cancel scheduler over transcript text.
///
/// At most one classification request is in flight at any time; scheduling
/// a new one cancels the previous request before it can mutate state.
pub struct ClassifierScheduler {
    classifier: Arc<dyn ThreatClassifier>,
    state: Arc<Mutex<AlertState>>,
    last_analyzed: Arc<Mutex<Option<String>>>,
    pending: Mutex<Option<CancellationToken>>,
    debounce: Duration,
}

impl ClassifierScheduler {
    pub fn new(classifier: Arc<dyn ThreatClassifier>) -> Self {
        Self {
            classifier,
            state: Arc::new(Mutex::new(AlertState::default())),
            last_analyzed: Arc::new(Mutex::new(None)),
            pending: Mutex::new(None),
            debounce: ANALYSIS_DEBOUNCE,
        }
    }

    /// Override the debounce quiet period.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub async fn snapshot(&self) -> AlertState {
        self.state.lock().await.clone()
    }

    /// Feed the current joined transcript text.
    ///
    /// Empty text resets the alert state outright. Text identical to the
    /// last analyzed snapshot is ignored. Anything else (re)schedules a
    /// classification after the quiet period, replacing any pending
    /// schedule and cancelling any in-flight request.
    pub async fn on_transcript(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            *self.last_analyzed.lock().await = None;
            *self.state.lock().await = AlertState::default();
            return;
        }
        if self.last_analyzed.lock().await.as_deref() == Some(text) {
            return;
        }
        self.schedule(text.to_string()).await;
    }

    /// Cancel any pending schedule or in-flight request and reset the
    /// alert state. Cancelled work never mutates state afterwards.
    pub async fn reset(&self) {
        if let Some(token) = self.pending.lock().await.take() {
            token.cancel();
        }
        *self.last_analyzed.lock().await = None;
        *self.state.lock().await = AlertState::default();
    }

    async fn schedule(&self, text: String) {
        let token = CancellationToken::new();
        {
            let mut pending = self.pending.lock().await;
            if let Some(previous) = pending.take() {
                previous.cancel();
            }
            *pending = Some(token.clone());
        }

        debug!("classification scheduled for {} chars", text.len());
        let classifier = Arc::clone(&self.classifier);
        let state = Arc::clone(&self.state);
        let last_analyzed = Arc::clone(&self.last_analyzed);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }

            {
                let mut s = state.lock().await;
                s.status = AlertStatus::Pending;
                s.error.clear();
            }

            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = classifier.classify(&text, &token) => result,
            };
            if token.is_cancelled() {
                // Superseded or torn down while resolving; discard.
                return;
            }

            match result {
                Ok(verdict) => {
                    *last_analyzed.lock().await = Some(text);
                    let mut s = state.lock().await;
                    let previously_triggered = s.triggered;
                    s.status = AlertStatus::Success;
                    s.triggered = previously_triggered || verdict.alert;
                    s.error.clear();
                    if verdict.alert {
                        s.reason = verdict.reason;
                    } else if !previously_triggered {
                        s.reason.clear();
                    }
                }
                Err(ClassifyError::Cancelled) => {}
                Err(e) => {
                    warn!("classification failed: {}", e);
                    // Record the text as analyzed anyway so an unchanged
                    // transcript does not retry forever.
                    *last_analyzed.lock().await = Some(text);
                    let mut s = state.lock().await;
                    s.status = AlertStatus::Error;
                    s.error = e.to_string();
                }
            }
        });
    }
}
