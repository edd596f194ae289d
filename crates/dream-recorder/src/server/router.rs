use crate::{AppCommand, AppError, AppResult, config::StorageConfig, server::{api, socket}};

use std::panic::Location;

use axum::{
    Router,
    routing::{delete, get, post},
};
use dream_recorder_core::SessionBroadcaster;
use error_location::ErrorLocation;
use tokio::{
    net::TcpListener,
    sync::{mpsc, watch},
};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{info, instrument};

/// Shared state for every handler.
#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) broadcaster: SessionBroadcaster,
}

/// Build the full application router.
pub(crate) fn router(state: ServerState, storage: &StorageConfig) -> Router {
    Router::new()
        .route("/ws", get(socket::upgrade))
        .route("/api/state", get(api::session_state))
        .route("/api/dreams", get(api::list_dreams))
        .route("/api/dreams/{id}", delete(api::delete_dream))
        .route("/api/device/{event}", post(api::device_event))
        .route("/api/alarm", get(api::alarm_settings).post(api::save_alarm))
        .route("/api/alarm/toggle", post(api::toggle_alarm))
        .route("/api/alarm/check", post(api::check_alarm))
        .nest_service("/media/video", ServeDir::new(&storage.videos_dir))
        .nest_service("/media/thumbs", ServeDir::new(&storage.thumbs_dir))
        .nest_service("/media/recordings", ServeDir::new(&storage.recordings_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `address` and serve until `shutdown_rx` turns true.
#[instrument(skip(router, shutdown_rx))]
pub(crate) async fn serve(
    address: &str,
    router: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> AppResult<()> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| AppError::Server {
            reason: format!("Failed to bind {}: {}", address, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(address, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if shutdown_rx.wait_for(|stop| *stop).await.is_err() {
                info!("Shutdown channel closed");
            }
        })
        .await
        .map_err(|e| AppError::Server {
            reason: format!("Server error: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("Server stopped");

    Ok(())
}
