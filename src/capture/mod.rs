//! Live capture device handling
//!
//! This module owns acquisition and teardown of the audio/video input
//! stream feeding the monitoring session:
//! - `CaptureBackend`: platform/backing-specific device acquisition
//! - `MediaStream`: exclusive owner of the live tracks, released on stop
//! - `FrameSource`: the video-frame tap consumed by the detection loop
//! - `SyntheticBackend`: test-pattern generator (for tests/headless runs)

mod backend;
mod synthetic;

pub use backend::{CaptureBackend, FrameSource, MediaStream, MediaTrack, TrackKind, VideoFrame};
pub use synthetic::{SyntheticBackend, SyntheticConfig};
