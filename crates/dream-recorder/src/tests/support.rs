//! Shared fixtures: a temp-dir backed app with an instant pipeline.

use crate::{App, AppCommand, JsonDreamStore, config::Config, server::ServerState};

use dream_recorder_core::{
    CoreResult, DreamRecorder, GenerationOutput, GenerationPipeline, GenerationRequest,
    MediaLibrary, ProgressReporter, SessionBroadcaster,
};

use std::{future::Future, path::PathBuf, sync::Arc};

use tempfile::TempDir;
use tokio::sync::{mpsc, watch};

/// Pipeline that completes immediately without network access.
pub(crate) struct InstantPipeline;

impl GenerationPipeline for InstantPipeline {
    fn generate(
        &self,
        request: GenerationRequest,
        progress: ProgressReporter,
    ) -> impl Future<Output = CoreResult<GenerationOutput>> + Send {
        async move {
            let id = request.audio.generation();
            progress.transcribed("a lighthouse in the desert").await;
            progress.prompt_ready("A lone lighthouse on golden dunes").await;
            Ok(GenerationOutput {
                transcription: "a lighthouse in the desert".to_string(),
                video_prompt: "A lone lighthouse on golden dunes".to_string(),
                audio_filename: format!("recording_{}.webm", id),
                video_filename: format!("dream_{}.mp4", id),
                thumb_filename: None,
            })
        }
    }
}

pub(crate) struct Harness {
    pub(crate) app: App<JsonDreamStore, InstantPipeline>,
    pub(crate) config: Config,
    pub(crate) config_path: PathBuf,
    pub(crate) store: Arc<JsonDreamStore>,
    pub(crate) media: MediaLibrary,
    pub(crate) broadcaster: SessionBroadcaster,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) shutdown_rx: watch::Receiver<bool>,
    pub(crate) dir: TempDir,
}

impl Harness {
    pub(crate) fn server_state(&self) -> ServerState {
        ServerState {
            command_tx: self.command_tx.clone(),
            broadcaster: self.broadcaster.clone(),
        }
    }
}

#[allow(clippy::unwrap_used)]
pub(crate) async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config").join("config.toml");
    let config = Config::load_or_create(&config_path, &dir.path().join("data")).unwrap();

    let media = MediaLibrary::new(
        config.storage.recordings_dir.clone(),
        config.storage.videos_dir.clone(),
        config.storage.thumbs_dir.clone(),
    );
    media.ensure_dirs().await.unwrap();

    let store = Arc::new(JsonDreamStore::open(&config.storage.dreams_file).await.unwrap());
    let broadcaster = SessionBroadcaster::default();
    let recorder = DreamRecorder::new(
        Arc::clone(&store),
        Arc::new(InstantPipeline),
        media.clone(),
        broadcaster.clone(),
        config.recording.max_recording_bytes,
    );

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let app = App {
        recorder,
        config: config.clone(),
        config_path: config_path.clone(),
        command_rx,
        shutdown_tx,
        alarm_fired_on: None,
    };

    Harness {
        app,
        config,
        config_path,
        store,
        media,
        broadcaster,
        command_tx,
        shutdown_rx,
        dir,
    }
}
