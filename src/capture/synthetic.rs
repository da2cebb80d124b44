use super::backend::{CaptureBackend, FrameSource, MediaStream, MediaTrack, TrackKind, VideoFrame};
use crate::error::CaptureError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Configuration for the synthetic capture backend
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frames per second produced by the generator
    pub fps: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

/// Test-pattern capture backend.
///
/// Produces a moving gradient at a fixed frame rate. Used in headless runs
/// and tests, the same way a file-based audio source stands in for a live
/// microphone. `denied()` builds a backend that refuses acquisition, for
/// exercising the permission-denied path.
pub struct SyntheticBackend {
    config: SyntheticConfig,
    deny: bool,
    active: Arc<std::sync::atomic::AtomicBool>,
}

impl SyntheticBackend {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            deny: false,
            active: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    /// A backend that always fails acquisition with a device error.
    pub fn denied() -> Self {
        Self {
            config: SyntheticConfig::default(),
            deny: true,
            active: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    fn render_frame(config: &SyntheticConfig, seq: u64) -> VideoFrame {
        let (w, h) = (config.width as usize, config.height as usize);
        let mut data = vec![0u8; w * h * 3];
        let shift = (seq % 256) as u8;
        for row in 0..h {
            let luma = ((row * 255) / h.max(1)) as u8;
            for col in 0..w {
                let idx = (row * w + col) * 3;
                data[idx] = luma.wrapping_add(shift);
                data[idx + 1] = luma;
                data[idx + 2] = ((col * 255) / w.max(1)) as u8;
            }
        }
        VideoFrame {
            width: config.width,
            height: config.height,
            data,
            timestamp_ms: seq * 1000 / config.fps.max(1) as u64,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SyntheticBackend {
    async fn acquire(&mut self) -> Result<MediaStream, CaptureError> {
        if self.deny {
            return Err(CaptureError::Device(
                "camera/microphone permission denied".to_string(),
            ));
        }
        if self.active.swap(true, std::sync::atomic::Ordering::SeqCst) {
            return Err(CaptureError::AlreadyActive);
        }

        let frames = Arc::new(FrameSource::new());
        let cancel = CancellationToken::new();
        let producer_frames = Arc::clone(&frames);
        let producer_cancel = cancel.clone();
        let config = self.config.clone();
        let interval = Duration::from_millis(1000 / u64::from(config.fps.max(1)));

        // Cleared when the producer winds down, so the backend can be
        // re-acquired after release.
        struct ActiveGuard(Arc<std::sync::atomic::AtomicBool>);
        impl Drop for ActiveGuard {
            fn drop(&mut self) {
                self.0.store(false, std::sync::atomic::Ordering::SeqCst);
            }
        }
        let guard = ActiveGuard(Arc::clone(&self.active));

        let task = tokio::spawn(async move {
            let _guard = guard;
            let mut seq = 0u64;
            loop {
                tokio::select! {
                    _ = producer_cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                producer_frames.publish(Self::render_frame(&config, seq));
                seq += 1;
            }
        });

        info!(
            "synthetic capture acquired: {}x{} @ {} fps",
            self.config.width, self.config.height, self.config.fps
        );

        let tracks = vec![MediaTrack::new(TrackKind::Video), MediaTrack::new(TrackKind::Audio)];
        Ok(MediaStream::new(tracks, frames, Some(cancel), Some(task)))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
