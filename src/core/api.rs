//! HTTP + WebSocket API for Vigil
//!
//! Endpoints:
//! - GET  /health        - Health check
//! - GET  /status        - Current session status
//! - POST /monitor/start - Begin monitoring
//! - POST /monitor/stop  - Stop monitoring
//! - POST /sample        - Ingest one eye-state sample
//! - POST /audio/reload  - Re-attempt the alert sound load
//! - WS   /ws            - Live status updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::core::session::{MonitorSession, StartReport, StatusUpdate};
use crate::types::{
    AlertDecision, EyeStateSample, FrameObservation, MonitorError, MonitorStatus, ResourceState,
    Verdict,
};

/// App state: one monitoring session per process
pub struct AppState {
    pub session: Arc<MonitorSession>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: String,
    pub version: String,
    pub monitoring: bool,
}

/// Ingest sample request. Both probabilities absent means the detector
/// saw no face in the frame.
#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    pub left_open_prob: Option<f64>,
    pub right_open_prob: Option<f64>,
}

/// Ingest sample response
#[derive(Debug, Serialize)]
pub struct SampleResponse {
    /// False when monitoring is idle and the sample was dropped
    pub accepted: bool,
    pub verdict: Option<Verdict>,
    pub alert: Option<AlertDecision>,
}

/// Stop response
#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub stopped: bool,
}

/// Audio reload response
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub audio: ResourceState,
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Create the API router
pub fn create_router(session: Arc<MonitorSession>) -> Router {
    let state = Arc::new(AppState { session });

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/monitor/start", post(start_monitoring))
        .route("/monitor/stop", post(stop_monitoring))
        .route("/sample", post(ingest_sample))
        .route("/audio/reload", post(reload_audio))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "vigil".to_string(),
        version: crate::VERSION.to_string(),
        monitoring: state.session.is_monitoring(),
    })
}

/// Current session status
async fn status(State(state): State<Arc<AppState>>) -> Json<MonitorStatus> {
    Json(state.session.status())
}

/// Begin monitoring
async fn start_monitoring(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StartReport>, (StatusCode, Json<ErrorBody>)> {
    match state.session.start_monitoring() {
        Ok(report) => Ok(Json(report)),
        Err(err) => {
            let code = match err {
                MonitorError::PermissionDenied => StatusCode::FORBIDDEN,
                MonitorError::DetectorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((
                code,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            ))
        }
    }
}

/// Stop monitoring
async fn stop_monitoring(State(state): State<Arc<AppState>>) -> Json<StopResponse> {
    state.session.stop_monitoring();
    Json(StopResponse { stopped: true })
}

/// Ingest one eye-state sample
async fn ingest_sample(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SampleRequest>,
) -> Result<Json<SampleResponse>, (StatusCode, Json<ErrorBody>)> {
    let obs = match (req.left_open_prob, req.right_open_prob) {
        (Some(left), Some(right)) => FrameObservation::Face(EyeStateSample::new(left, right)),
        (None, None) => FrameObservation::NoFace,
        _ => {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorBody {
                    error: "supply both probabilities, or neither for a no-face frame"
                        .to_string(),
                }),
            ))
        }
    };

    let output = state.session.on_frame(obs);
    Ok(Json(SampleResponse {
        accepted: output.is_some(),
        verdict: output.as_ref().map(|o| o.verdict),
        alert: output.as_ref().map(|o| o.alert),
    }))
}

/// Re-attempt the alert sound load
async fn reload_audio(State(state): State<Arc<AppState>>) -> Json<ReloadResponse> {
    Json(ReloadResponse {
        audio: state.session.reload_audio(),
    })
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.session.subscribe();
    ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    })
}

/// Handle WebSocket connection: push updates out, drain client
/// traffic so pings and close frames are seen
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<StatusUpdate>) {
    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            update = next_update(&mut rx) => match update {
                Some(update) => {
                    let json = serde_json::to_string(&update).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            msg = receiver.next() => {
                if !matches!(msg, Some(Ok(_))) {
                    break;
                }
            }
        }
    }
}

/// Pull the next update. A slow subscriber that lags behind the
/// channel skips the gap and keeps receiving rather than being
/// disconnected.
async fn next_update(rx: &mut broadcast::Receiver<StatusUpdate>) -> Option<StatusUpdate> {
    loop {
        match rx.recv().await {
            Ok(update) => return Some(update),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "status subscriber lagged; resuming from newest");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    session: Arc<MonitorSession>,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(session);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Vigil API running on {}", addr);
    println!("  GET  /health        - Health check");
    println!("  GET  /status        - Session status");
    println!("  POST /monitor/start - Begin monitoring");
    println!("  POST /monitor/stop  - Stop monitoring");
    println!("  POST /sample        - Ingest eye-state sample");
    println!("  POST /audio/reload  - Re-attempt sound load");
    println!("  WS   /ws            - Live updates");
    axum::serve(listener, router).await?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MonitoringState;

    fn update(alerts_fired: u64) -> StatusUpdate {
        StatusUpdate {
            monitoring: MonitoringState::Active,
            verdict: None,
            alert: None,
            audio: ResourceState::Ready,
            buffered: 0,
            cooldown_remaining_ms: 0,
            alerts_fired,
        }
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_gap_and_keeps_receiving() {
        let (tx, mut rx) = broadcast::channel(2);

        // Overrun the channel so the receiver is lagged
        for n in 0..5 {
            tx.send(update(n)).unwrap();
        }

        // The subscriber resumes from the oldest retained update
        // instead of being dropped
        let first = next_update(&mut rx).await.unwrap();
        assert_eq!(first.alerts_fired, 3);
        let second = next_update(&mut rx).await.unwrap();
        assert_eq!(second.alerts_fired, 4);
    }

    #[tokio::test]
    async fn test_closed_channel_ends_the_stream() {
        let (tx, mut rx) = broadcast::channel(2);
        drop(tx);
        assert!(next_update(&mut rx).await.is_none());
    }
}
