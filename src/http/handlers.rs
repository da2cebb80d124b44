use super::state::AppState;
use crate::error::ReportError;
use crate::session::SessionPhase;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Serialize)]
pub struct LifecycleResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// POST /monitor/start
/// Start the monitoring session
pub async fn start_monitoring(State(state): State<AppState>) -> impl IntoResponse {
    let session = &state.session;

    if session.status().await.phase != SessionPhase::Stopped {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "monitoring session already active".to_string(),
            }),
        )
            .into_response();
    }

    match session.start().await {
        Ok(()) => {
            info!("monitoring started via HTTP");
            (
                StatusCode::OK,
                Json(LifecycleResponse {
                    session_id: session.session_id().to_string(),
                    status: "active".to_string(),
                    message: "Monitoring started".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("failed to start monitoring: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to start monitoring: {:#}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /monitor/stop
/// Stop the monitoring session (no-op when already stopped)
pub async fn stop_monitoring(State(state): State<AppState>) -> impl IntoResponse {
    state.session.stop().await;
    (
        StatusCode::OK,
        Json(LifecycleResponse {
            session_id: state.session.session_id().to_string(),
            status: "stopped".to_string(),
            message: "Monitoring stopped".to_string(),
        }),
    )
}

/// GET /monitor/status
/// Snapshot of the session, alert, detection and report state
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.status().await)
}

/// GET /monitor/transcript
/// Current transcript (finalized segments plus live text)
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.transcript().await)
}

/// POST /monitor/report
/// Dispatch a suspicious-activity report to the resolved recipient
pub async fn send_report(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.report().await {
        Ok(()) => {
            let report = state.session.status().await.report;
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(ReportError::NoRecipient) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: ReportError::NoRecipient.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("report dispatch failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
