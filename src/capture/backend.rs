use crate::error::CaptureError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A single decoded video frame (RGB24, row-major).
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Raw pixel data (3 bytes per pixel)
    pub data: Vec<u8>,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Media track kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A live media track. Stopping a track is idempotent.
#[derive(Debug)]
pub struct MediaTrack {
    kind: TrackKind,
    live: AtomicBool,
}

impl MediaTrack {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            live: AtomicBool::new(true),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// The video-frame tap shared between the capture producer and the
/// detection loop. The producer publishes the latest decoded frame and
/// wakes the consumer; the consumer paces itself on those wakeups, one
/// tick per rendered frame.
#[derive(Debug, Default)]
pub struct FrameSource {
    latest: Mutex<Option<VideoFrame>>,
    tick: Notify,
}

impl FrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a decoded frame and wake the consumer.
    pub fn publish(&self, frame: VideoFrame) {
        *self.latest.lock().expect("frame slot poisoned") = Some(frame);
        self.tick.notify_one();
    }

    /// Wake the consumer without publishing a frame (the source produced a
    /// tick but has nothing decodable yet).
    pub fn tick(&self) {
        self.tick.notify_one();
    }

    /// Whether at least one decodable frame has arrived.
    pub fn ready(&self) -> bool {
        self.latest.lock().expect("frame slot poisoned").is_some()
    }

    /// The most recently published frame, if any.
    pub fn latest(&self) -> Option<VideoFrame> {
        self.latest.lock().expect("frame slot poisoned").clone()
    }

    /// Wait for the next producer tick.
    pub async fn next_tick(&self) {
        self.tick.notified().await;
    }
}

/// The live audio/video stream handed out by a [`CaptureBackend`].
///
/// Owned exclusively by the session coordinator; sub-components only ever
/// see the shared [`FrameSource`] reference and must not stop tracks
/// themselves.
pub struct MediaStream {
    tracks: Vec<MediaTrack>,
    frames: Arc<FrameSource>,
    producer_cancel: Option<CancellationToken>,
    producer_task: Option<JoinHandle<()>>,
    released: bool,
}

impl MediaStream {
    pub fn new(
        tracks: Vec<MediaTrack>,
        frames: Arc<FrameSource>,
        producer_cancel: Option<CancellationToken>,
        producer_task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            tracks,
            frames,
            producer_cancel,
            producer_task,
            released: false,
        }
    }

    /// Shared read-only frame tap for the detection loop.
    pub fn frames(&self) -> Arc<FrameSource> {
        Arc::clone(&self.frames)
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// Stop every underlying track and the frame producer. Safe to call
    /// when already released.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(cancel) = self.producer_cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.producer_task.take() {
            task.abort();
        }
        for track in &self.tracks {
            track.stop();
        }
        info!("media stream released ({} tracks stopped)", self.tracks.len());
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Capture device acquisition.
///
/// Implementations are backing-specific (real camera stacks, network
/// streams, synthetic test patterns). Acquisition fails with
/// [`CaptureError::Device`] when permission is denied or no device is
/// available, and with [`CaptureError::AlreadyActive`] when a stream is
/// still held; the caller must stop the session first.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquire the live stream.
    async fn acquire(&mut self) -> Result<MediaStream, CaptureError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
