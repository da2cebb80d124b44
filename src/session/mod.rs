//! Monitoring session coordination
//!
//! This module provides the `MonitorSession` aggregate that owns:
//! - capture device acquisition and release
//! - the transcription stream and transcript accumulation
//! - the throttled object-detection loop
//! - debounced transcript classification and the sticky alert state
//! - the user-invoked report action
//!
//! Exactly one session is active per service instance at a time.

mod config;
mod session;
mod state;

pub use config::SessionConfig;
pub use session::{Collaborators, MonitorSession};
pub use state::{SessionPhase, SessionStatus};
