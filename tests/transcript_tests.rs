// Tests for transcript accumulation and the live (interim) segment.

use bikeguard_monitor::{ScriptedEngine, SpeechEvent, TranscriptionStream};
use std::time::Duration;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn result(finalized: &[&str], interim: &str) -> SpeechEvent {
    SpeechEvent::Result {
        finalized: finalized.iter().map(|s| s.to_string()).collect(),
        interim: interim.to_string(),
    }
}

#[tokio::test]
async fn finalized_chunks_accumulate_in_order_and_capitalized() {
    let engine = ScriptedEngine::new();
    let tx = engine.feed();
    let mut stream = TranscriptionStream::new(Box::new(engine));
    stream.start().await.unwrap();

    tx.send(result(&["hello there", "it's me"], "")).await.unwrap();
    tx.send(result(&["  bike rack  "], "half a sent")).await.unwrap();
    settle().await;

    let state = stream.snapshot().await;
    let texts: Vec<&str> = state.segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello there", "It's me", "Bike rack"]);
    // A finalized chunk arrived in the second event, so the live segment
    // is cleared even though interim text was present.
    assert_eq!(state.live, "");
    assert_eq!(state.joined(), "Hello there It's me Bike rack");
}

#[tokio::test]
async fn empty_finalized_chunks_are_dropped() {
    let engine = ScriptedEngine::new();
    let tx = engine.feed();
    let mut stream = TranscriptionStream::new(Box::new(engine));
    stream.start().await.unwrap();

    tx.send(result(&["   ", ""], "still talking")).await.unwrap();
    settle().await;

    let state = stream.snapshot().await;
    assert!(state.segments.is_empty());
    // Nothing was appended, so the interim text stands.
    assert_eq!(state.live, "Still talking");
}

#[tokio::test]
async fn interim_text_replaces_and_clears_live_segment() {
    let engine = ScriptedEngine::new();
    let tx = engine.feed();
    let mut stream = TranscriptionStream::new(Box::new(engine));
    stream.start().await.unwrap();

    tx.send(result(&[], "someone is")).await.unwrap();
    settle().await;
    assert_eq!(stream.snapshot().await.live, "Someone is");

    tx.send(result(&[], "someone is walking up")).await.unwrap();
    settle().await;
    assert_eq!(stream.snapshot().await.live, "Someone is walking up");

    tx.send(result(&[], "  ")).await.unwrap();
    settle().await;
    assert_eq!(stream.snapshot().await.live, "");
}

#[tokio::test]
async fn engine_error_stops_listening_but_keeps_transcript() {
    let engine = ScriptedEngine::new();
    let tx = engine.feed();
    let mut stream = TranscriptionStream::new(Box::new(engine));
    stream.start().await.unwrap();
    assert!(stream.snapshot().await.listening);

    tx.send(result(&["locked it up"], "")).await.unwrap();
    tx.send(SpeechEvent::Error("network".to_string())).await.unwrap();
    settle().await;

    let state = stream.snapshot().await;
    assert!(!state.listening);
    assert_eq!(state.error.as_deref(), Some("network"));
    assert_eq!(state.segments.len(), 1);
}

#[tokio::test]
async fn natural_end_stops_listening_without_clearing_content() {
    let engine = ScriptedEngine::new();
    let tx = engine.feed();
    let mut stream = TranscriptionStream::new(Box::new(engine));
    stream.start().await.unwrap();

    tx.send(result(&["all quiet"], "")).await.unwrap();
    tx.send(SpeechEvent::End).await.unwrap();
    settle().await;

    let state = stream.snapshot().await;
    assert!(!state.listening);
    assert!(state.error.is_none());
    assert_eq!(state.segments.len(), 1);
}

#[tokio::test]
async fn stop_is_idempotent_and_clears_live_segment() {
    let engine = ScriptedEngine::new();
    let tx = engine.feed();
    let mut stream = TranscriptionStream::new(Box::new(engine));

    // Safe before ever starting.
    stream.stop().await;

    stream.start().await.unwrap();
    tx.send(result(&["first"], "half spoken")).await.unwrap();
    tx.send(result(&[], "half spoken more")).await.unwrap();
    settle().await;
    assert_eq!(stream.snapshot().await.live, "Half spoken more");

    stream.stop().await;
    let state = stream.snapshot().await;
    assert_eq!(state.live, "");
    assert!(!state.listening);
    assert_eq!(state.segments.len(), 1);

    // And again.
    stream.stop().await;
    assert_eq!(stream.snapshot().await.segments.len(), 1);
}

#[tokio::test]
async fn unsupported_engine_surfaces_error_and_never_listens() {
    // No scripted run queued behaves like a runtime without an engine.
    let mut stream = TranscriptionStream::new(Box::new(ScriptedEngine::new()));
    let err = stream.start().await.unwrap_err();
    assert!(err.to_string().contains("not supported"));

    let state = stream.snapshot().await;
    assert!(!state.listening);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn restart_consumes_a_fresh_engine_run() {
    let engine = ScriptedEngine::new();
    let first = engine.feed();
    let second = engine.feed();
    let mut stream = TranscriptionStream::new(Box::new(engine));

    stream.start().await.unwrap();
    first.send(result(&["one"], "")).await.unwrap();
    settle().await;

    // Restart tears the first run down; its sender must go stale.
    stream.start().await.unwrap();
    settle().await;
    assert!(first.is_closed());

    second.send(result(&["two"], "")).await.unwrap();
    settle().await;

    let texts: Vec<String> = stream
        .snapshot()
        .await
        .segments
        .iter()
        .map(|s| s.text.clone())
        .collect();
    assert_eq!(texts, vec!["One".to_string(), "Two".to_string()]);
}
