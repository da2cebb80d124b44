pub mod capture;
pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod http;
pub mod report;
pub mod session;
pub mod transcribe;

pub use capture::{
    CaptureBackend, FrameSource, MediaStream, MediaTrack, SyntheticBackend, SyntheticConfig,
    TrackKind, VideoFrame,
};
pub use classify::{
    AlertState, AlertStatus, ClassifierScheduler, GeminiClassifier, ThreatClassifier, Verdict,
};
pub use config::Config;
pub use detect::{
    draw_detections, BoundingBox, CommandSurface, Detection, DetectionLoop, DetectionModel,
    DetectionState, DetectionStatus, DrawCommand, ModelLoader, NullModel, OverlaySurface,
    RemoteModelLoader, StaticModelLoader,
};
pub use error::{
    CaptureError, ClassifyError, DetectError, ReportError, TranscribeError,
};
pub use http::{create_router, AppState};
pub use report::{
    EmailDispatcher, IdentityProvider, ReportDispatcher, ReportMetadata, ReportState,
    ReportStatus, StaticIdentity,
};
pub use session::{Collaborators, MonitorSession, SessionConfig, SessionPhase, SessionStatus};
pub use transcribe::{
    NullEngine, ScriptedEngine, SpeechEngine, SpeechEvent, TranscriptSegment, TranscriptState,
    TranscriptionStream,
};
