// Tests for the HTTP control surface.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use bikeguard_monitor::{
    create_router, AppState, ClassifyError, Collaborators, CommandSurface, IdentityProvider,
    MonitorSession, NullEngine, NullModel, ReportDispatcher, ReportError, ReportMetadata,
    SessionConfig, StaticModelLoader, SyntheticBackend, SyntheticConfig, ThreatClassifier, Verdict,
};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct QuietClassifier;

#[async_trait::async_trait]
impl ThreatClassifier for QuietClassifier {
    async fn classify(
        &self,
        _transcript: &str,
        _cancel: &CancellationToken,
    ) -> Result<Verdict, ClassifyError> {
        Ok(Verdict {
            alert: false,
            reason: String::new(),
        })
    }
}

struct FixedIdentity(Option<String>);

#[async_trait::async_trait]
impl IdentityProvider for FixedIdentity {
    async fn notification_address(&self) -> Option<String> {
        self.0.clone()
    }
}

struct RecordingDispatcher;

#[async_trait::async_trait]
impl ReportDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        _recipient: &str,
        _metadata: &ReportMetadata,
    ) -> Result<(), ReportError> {
        Ok(())
    }
}

fn test_router(recipient: Option<&str>) -> axum::Router {
    let session = MonitorSession::new(
        SessionConfig::default(),
        Collaborators {
            capture: Box::new(SyntheticBackend::new(SyntheticConfig::default())),
            engine: Box::new(NullEngine),
            loader: Arc::new(StaticModelLoader::new(Arc::new(NullModel))),
            surface: Arc::new(CommandSurface::new(640.0, 480.0)),
            classifier: Arc::new(QuietClassifier),
            identity: Arc::new(FixedIdentity(recipient.map(String::from))),
            dispatcher: Arc::new(RecordingDispatcher),
        },
    );
    create_router(AppState::new(Arc::new(session)))
}

async fn request(router: axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, json)
}

#[tokio::test]
async fn health_endpoint_responds_ok() {
    let router = test_router(Some("owner@example.com"));
    let (status, body) = request(router, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn start_succeeds_then_conflicts_while_active() {
    let router = test_router(Some("owner@example.com"));

    let (status, body) = request(router.clone(), "POST", "/monitor/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert!(body["session_id"].as_str().unwrap().starts_with("monitor-"));

    let (status, body) = request(router.clone(), "POST", "/monitor/start").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already active"));

    let (status, _) = request(router, "POST", "/monitor/stop").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn stop_is_ok_even_when_not_running() {
    let router = test_router(Some("owner@example.com"));
    let (status, body) = request(router, "POST", "/monitor/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stopped");
}

#[tokio::test]
async fn status_reports_phase_and_sub_states() {
    let router = test_router(Some("owner@example.com"));

    let (status, body) = request(router.clone(), "GET", "/monitor/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "stopped");
    assert_eq!(body["listening"], false);

    request(router.clone(), "POST", "/monitor/start").await;
    let (_, body) = request(router.clone(), "GET", "/monitor/status").await;
    assert_eq!(body["phase"], "active");
    assert!(body["alert"].is_object());
    assert!(body["detection"].is_object());
    assert!(body["report"].is_object());

    request(router, "POST", "/monitor/stop").await;
}

#[tokio::test]
async fn transcript_endpoint_returns_segments_and_live_text() {
    let router = test_router(Some("owner@example.com"));
    let (status, body) = request(router, "GET", "/monitor/transcript").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["segments"].as_array().unwrap().is_empty());
    assert_eq!(body["live"], "");
}

#[tokio::test]
async fn report_succeeds_with_a_recipient() {
    let router = test_router(Some("owner@example.com"));
    let (status, body) = request(router, "POST", "/monitor/report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn report_without_recipient_is_not_found() {
    let router = test_router(None);
    let (status, body) = request(router, "POST", "/monitor/report").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("no notification address"));
}
