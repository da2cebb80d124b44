//! Continuous speech-to-text
//!
//! Wraps an event-driven speech engine and accumulates the session
//! transcript:
//! - finalized utterances are normalized and appended in arrival order
//! - a single live (interim) segment is replaced or cleared on every event
//! - engine errors stop listening without discarding accumulated text

mod engine;
mod stream;

pub use engine::{NullEngine, ScriptedEngine, SpeechEngine, SpeechEvent};
pub use stream::{TranscriptSegment, TranscriptState, TranscriptionStream};
