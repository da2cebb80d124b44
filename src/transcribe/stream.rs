use super::engine::{SpeechEngine, SpeechEvent};
use crate::error::TranscribeError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A finalized utterance. Immutable once appended.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSegment {
    /// Normalized text (trimmed, first character upper-cased)
    pub text: String,
    /// When the segment was finalized
    pub timestamp: DateTime<Utc>,
}

/// Shared transcription state, snapshotted for display.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranscriptState {
    /// Ordered finalized segments for the current session
    pub segments: Vec<TranscriptSegment>,
    /// Current unfinalized (interim) text, replaced on every event
    pub live: String,
    /// Whether the engine is currently listening
    pub listening: bool,
    /// Last engine error, if any
    pub error: Option<String>,
}

impl TranscriptState {
    /// The transcript as a single string, the unit the classifier sees.
    /// Interim text is never included.
    pub fn joined(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Consumes speech engine events and maintains the transcript.
pub struct TranscriptionStream {
    engine: Box<dyn SpeechEngine>,
    state: Arc<Mutex<TranscriptState>>,
    transcript_tx: watch::Sender<String>,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl TranscriptionStream {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        let (transcript_tx, _) = watch::channel(String::new());
        Self {
            engine,
            state: Arc::new(Mutex::new(TranscriptState::default())),
            transcript_tx,
            cancel: None,
            task: None,
        }
    }

    /// Watch the joined transcript text. Updated only when finalized
    /// segments change.
    pub fn transcript_watch(&self) -> watch::Receiver<String> {
        self.transcript_tx.subscribe()
    }

    pub async fn snapshot(&self) -> TranscriptState {
        self.state.lock().await.clone()
    }

    /// Discard all accumulated transcript content and errors.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.segments.clear();
        state.live.clear();
        state.error = None;
        self.transcript_tx.send_replace(String::new());
    }

    /// Begin listening. Any previous run is torn down first so stale
    /// engine events can never reach the new run.
    pub async fn start(&mut self) -> Result<(), TranscribeError> {
        self.teardown().await;

        let mut events = match self.engine.start().await {
            Ok(events) => events,
            Err(e) => {
                let mut state = self.state.lock().await;
                state.listening = false;
                state.error = Some(e.to_string());
                return Err(e);
            }
        };

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let state = Arc::clone(&self.state);
        let transcript_tx = self.transcript_tx.clone();

        {
            let mut s = state.lock().await;
            s.listening = true;
            s.error = None;
        }

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    event = events.recv() => event,
                };
                let Some(event) = event else {
                    // Channel closed without an explicit end event.
                    state.lock().await.listening = false;
                    break;
                };
                match event {
                    SpeechEvent::Result { finalized, interim } => {
                        let mut s = state.lock().await;
                        let mut appended = false;
                        for chunk in &finalized {
                            let text = chunk.trim();
                            if text.is_empty() {
                                continue;
                            }
                            s.segments.push(TranscriptSegment {
                                text: capitalize(text),
                                timestamp: Utc::now(),
                            });
                            appended = true;
                        }
                        if appended {
                            s.live.clear();
                            transcript_tx.send_replace(s.joined());
                        } else {
                            let interim = interim.trim();
                            if interim.is_empty() {
                                s.live.clear();
                            } else {
                                s.live = capitalize(interim);
                            }
                        }
                    }
                    SpeechEvent::Error(message) => {
                        warn!("speech engine error: {}", message);
                        let mut s = state.lock().await;
                        s.error = Some(message);
                        s.listening = false;
                    }
                    SpeechEvent::End => {
                        info!("speech engine ended");
                        state.lock().await.listening = false;
                        break;
                    }
                }
            }
        });

        self.cancel = Some(cancel);
        self.task = Some(task);
        Ok(())
    }

    /// Stop listening. Idempotent; always clears the interim segment since
    /// it is meaningless once stopped.
    pub async fn stop(&mut self) {
        self.teardown().await;
        let mut state = self.state.lock().await;
        state.listening = false;
        state.live.clear();
    }

    async fn teardown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("transcription task failed: {}", e);
                }
            }
        }
        self.engine.stop().await;
    }
}

impl Drop for TranscriptionStream {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::capitalize;

    #[test]
    fn capitalize_uppercases_first_character_only() {
        assert_eq!(capitalize("someone near the rack"), "Someone near the rack");
        assert_eq!(capitalize("Already upper"), "Already upper");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("é minuscule"), "É minuscule");
    }
}
