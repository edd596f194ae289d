use crate::{
    AppCommand,
    alarm_clock::AlarmCheck,
    config::{AlarmConfig, AlarmUpdate},
    server::ServerState,
};

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dream_recorder_core::{CoreError, DeviceEvent, Dream, SessionSnapshot};
use serde::Serialize;
use tokio::sync::oneshot;
use chrono::Local;
use tracing::{debug, warn};

/// JSON error body with a status code.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unavailable() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Recorder is shutting down")
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let status = match &error {
            CoreError::DreamNotFound { .. } | CoreError::NoDreams { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// A dream as returned by the API, with its playable URL.
#[derive(Debug, Serialize)]
pub(crate) struct DreamView {
    #[serde(flatten)]
    dream: Dream,
    video_url: String,
}

impl From<Dream> for DreamView {
    fn from(dream: Dream) -> Self {
        Self {
            video_url: dream.video_url(),
            dream,
        }
    }
}

/// Queue a command and wait for its reply.
async fn request<T>(
    state: &ServerState,
    command: impl FnOnce(oneshot::Sender<T>) -> AppCommand,
) -> Result<T, ApiError> {
    let (reply_tx, reply_rx) = oneshot::channel();

    state
        .command_tx
        .send(command(reply_tx))
        .await
        .map_err(|_| ApiError::unavailable())?;

    reply_rx.await.map_err(|_| ApiError::unavailable())
}

pub(crate) async fn session_state(
    State(state): State<ServerState>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = request(&state, |reply| AppCommand::SessionState { reply }).await?;
    Ok(Json(snapshot))
}

pub(crate) async fn list_dreams(
    State(state): State<ServerState>,
) -> Result<Json<Vec<DreamView>>, ApiError> {
    let dreams = request(&state, |reply| AppCommand::ListDreams { reply }).await??;
    Ok(Json(dreams.into_iter().map(DreamView::from).collect()))
}

pub(crate) async fn delete_dream(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<Json<DreamView>, ApiError> {
    let dream = request(&state, |reply| AppCommand::DeleteDream { id, reply }).await??;
    Ok(Json(DreamView::from(dream)))
}

/// Hardware trigger relay, e.g. `POST /api/device/double_tap`.
pub(crate) async fn device_event(
    State(state): State<ServerState>,
    Path(event): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let parsed: DeviceEvent = serde_json::from_value(serde_json::Value::String(event.clone()))
        .map_err(|_| {
            warn!(event = %event, "Unknown device event");
            ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("Unknown device event: {}", event),
            )
        })?;

    state
        .command_tx
        .send(AppCommand::Device(parsed))
        .await
        .map_err(|_| ApiError::unavailable())?;

    debug!(event = %parsed, "Device event queued");

    Ok(Json(serde_json::json!({ "status": "ok", "eventType": parsed })))
}

pub(crate) async fn toggle_alarm(
    State(state): State<ServerState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let enabled = request(&state, |reply| AppCommand::ToggleAlarm { reply })
        .await?
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to toggle alarm: {}", e),
            )
        })?;

    Ok(Json(serde_json::json!({ "enabled": enabled })))
}

pub(crate) async fn alarm_settings(
    State(state): State<ServerState>,
) -> Result<Json<AlarmConfig>, ApiError> {
    let alarm = request(&state, |reply| AppCommand::AlarmSettings { reply }).await?;
    Ok(Json(alarm))
}

/// Set the alarm time. Body: `{"hour": 7, "minute": 30, "enabled": true}`,
/// where `enabled` may be left out.
pub(crate) async fn save_alarm(
    State(state): State<ServerState>,
    body: Result<Json<AlarmUpdate>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(update) = body.map_err(|rejection| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid alarm settings: {}", rejection.body_text()),
        )
    })?;

    update.validate().map_err(|e| {
        warn!(error = ?e, "Rejected alarm settings");
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid hour or minute")
    })?;

    let alarm = request(&state, |reply| AppCommand::SetAlarm { update, reply })
        .await?
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to save alarm: {}", e),
            )
        })?;

    Ok(Json(serde_json::json!({ "status": "success", "data": alarm })))
}

/// Compare local time with the alarm now, firing it when due.
pub(crate) async fn check_alarm(
    State(state): State<ServerState>,
) -> Result<Json<AlarmCheck>, ApiError> {
    let now = Local::now().naive_local();
    let check = request(&state, |reply| AppCommand::CheckAlarm {
        now,
        reply: Some(reply),
    })
    .await?;

    Ok(Json(check))
}
