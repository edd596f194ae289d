//! Dream Recorder: records spoken dreams, turns them into videos and plays
//! them back, driven by browser clients and hardware triggers.

mod alarm_clock;
mod app;
mod app_command;
mod config;
mod error;
mod json_dream_store;
mod logging;
mod pipeline;
mod server;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    json_dream_store::JsonDreamStore,
};

use crate::{config::Config, pipeline::HttpPipeline, server::ServerState};

use std::{panic::Location, sync::Arc};

use dream_recorder_core::{DreamRecorder, MediaLibrary, SessionBroadcaster};
use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Application entry point.
#[tokio::main]
async fn main() {
    let log_dir = match Config::log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve log directory: {:?}", e);
            std::process::exit(1);
        }
    };

    // Flushes the file writer on drop; held for the life of the process.
    let _log_guard = match logging::init(&log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run().await {
        error!(error = ?e, "Dream recorder failed");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let config_path = Config::config_path()?;
    let config = Config::load()?;

    let resolved = config.with_env_overrides(|name| std::env::var(name).ok());
    for credential in resolved.missing_credentials() {
        warn!(
            credential,
            "API key not configured, dream generation will fail until it is set"
        );
    }

    let media = MediaLibrary::new(
        config.storage.recordings_dir.clone(),
        config.storage.videos_dir.clone(),
        config.storage.thumbs_dir.clone(),
    );
    media.ensure_dirs().await?;

    let store = Arc::new(JsonDreamStore::open(&config.storage.dreams_file).await?);
    let pipeline = Arc::new(HttpPipeline::new(&resolved, media.clone())?);
    let broadcaster = SessionBroadcaster::default();

    let recorder = DreamRecorder::new(
        store,
        pipeline,
        media,
        broadcaster.clone(),
        config.recording.max_recording_bytes,
    );

    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let router = server::router(
        ServerState {
            command_tx: command_tx.clone(),
            broadcaster,
        },
        &config.storage,
    );
    let address = config.server.bind_address();

    let app = App {
        recorder,
        config,
        config_path,
        command_rx,
        shutdown_tx,
        alarm_fired_on: None,
    };

    tokio::spawn(alarm_clock::run(
        command_tx.clone(),
        alarm_clock::ALARM_CHECK_INTERVAL,
    ));

    let signal_tx = command_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                if let Err(e) = request_shutdown(&signal_tx).await {
                    warn!(error = ?e, "Application already stopped");
                }
            }
            Err(e) => error!(error = ?e, "Failed to listen for Ctrl-C"),
        }
    });

    let server = async move {
        let result = server::serve(&address, router, shutdown_rx).await;
        if result.is_err() {
            if let Err(e) = request_shutdown(&command_tx).await {
                warn!(error = ?e, "Application already stopped");
            }
        }
        result
    };

    let (app_result, server_result) = tokio::join!(app.run(), server);
    app_result?;
    server_result
}

/// Queue `Shutdown` for the application loop.
async fn request_shutdown(command_tx: &mpsc::Sender<AppCommand>) -> AppResult<()> {
    command_tx
        .send(AppCommand::Shutdown)
        .await
        .map_err(|e| AppError::ChannelSendFailed {
            message: format!("Failed to send shutdown command: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
}
