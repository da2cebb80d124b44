use crate::error::TranscribeError;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// An incremental recognition event from the speech engine.
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    /// A recognition update: zero or more newly finalized utterances plus
    /// the current unfinalized (interim) text.
    Result {
        finalized: Vec<String>,
        interim: String,
    },
    /// The engine failed; no further results will arrive.
    Error(String),
    /// The engine stopped on its own.
    End,
}

/// Continuous speech-to-text engine.
///
/// `start` hands back the event channel for one listening run. Engines that
/// are not available in the current runtime fail with
/// [`TranscribeError::Unsupported`] before any resources are committed.
#[async_trait::async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Begin a fresh listening run.
    async fn start(&mut self) -> Result<mpsc::Receiver<SpeechEvent>, TranscribeError>;

    /// Stop the current run. Safe to call when not listening.
    async fn stop(&mut self);
}

/// Engine stand-in for runtimes with no speech recognition available.
/// Always reports unsupported, which disables transcription only.
#[derive(Debug, Default)]
pub struct NullEngine;

#[async_trait::async_trait]
impl SpeechEngine for NullEngine {
    async fn start(&mut self) -> Result<mpsc::Receiver<SpeechEvent>, TranscribeError> {
        Err(TranscribeError::Unsupported(
            "no speech recognition engine in this runtime".to_string(),
        ))
    }

    async fn stop(&mut self) {}
}

/// Engine fed from pre-opened channels, one per listening run.
///
/// Each `feed()` call queues a fresh run and hands back its sender; every
/// `start()` consumes the next queued run, so restart semantics (a fresh
/// engine instance per start) are observable. With no runs queued it
/// behaves like [`NullEngine`].
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    runs: Mutex<VecDeque<mpsc::Receiver<SpeechEvent>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one listening run and return the sender that scripts it.
    pub fn feed(&self) -> mpsc::Sender<SpeechEvent> {
        let (tx, rx) = mpsc::channel(32);
        self.runs.lock().expect("scripted runs poisoned").push_back(rx);
        tx
    }
}

#[async_trait::async_trait]
impl SpeechEngine for ScriptedEngine {
    async fn start(&mut self) -> Result<mpsc::Receiver<SpeechEvent>, TranscribeError> {
        self.runs
            .lock()
            .expect("scripted runs poisoned")
            .pop_front()
            .ok_or_else(|| {
                TranscribeError::Unsupported("no scripted run queued".to_string())
            })
    }

    async fn stop(&mut self) {}
}
