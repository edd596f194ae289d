use crate::{
    AppError, AppResult,
    config::Config,
    pipeline::{LumaClient, OpenAiClient, Thumbnailer},
};

use dream_recorder_core::{
    CoreResult, GenerationOutput, GenerationPipeline, GenerationRequest, MediaLibrary,
    ProgressReporter,
};

use std::{future::Future, path::Path, time::Duration};

use tracing::{info, instrument, warn};
use uuid::Uuid;

const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Names of the files one run may write, all sharing a random id.
#[derive(Debug)]
struct MediaNames {
    audio: String,
    video: String,
    thumb: String,
}

impl MediaNames {
    fn fresh() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            audio: format!("recording_{}.webm", id),
            video: format!("dream_{}.mp4", id),
            thumb: format!("thumb_dream_{}.jpg", id),
        }
    }
}

/// Transcribe, write a prompt, generate and download the video.
///
/// Audio, video and thumbnail are written into the media library under a
/// shared random id, so files from earlier runs are never overwritten. A
/// failed run removes whatever it had already written.
#[derive(Debug, Clone)]
pub struct HttpPipeline {
    openai: OpenAiClient,
    luma: LumaClient,
    thumbnailer: Thumbnailer,
    media: MediaLibrary,
}

impl HttpPipeline {
    /// Build the pipeline from the resolved configuration.
    #[track_caller]
    pub fn new(config: &Config, media: MediaLibrary) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            openai: OpenAiClient::new(http.clone(), config.openai.clone()),
            luma: LumaClient::new(http, config.luma.clone()),
            thumbnailer: Thumbnailer::new(config.thumbnail.clone()),
            media,
        })
    }
}

impl GenerationPipeline for HttpPipeline {
    fn generate(
        &self,
        request: GenerationRequest,
        progress: ProgressReporter,
    ) -> impl Future<Output = CoreResult<GenerationOutput>> + Send {
        self.run(request, progress)
    }
}

impl HttpPipeline {
    #[instrument(skip_all, fields(generation = %request.audio.generation(), client_id = %request.origin))]
    async fn run(
        &self,
        request: GenerationRequest,
        progress: ProgressReporter,
    ) -> CoreResult<GenerationOutput> {
        let names = MediaNames::fresh();

        let result = self.produce(request, progress, &names).await;

        if let Err(e) = &result {
            let failures = self
                .media
                .remove_files(&names.audio, Some(&names.video), Some(&names.thumb))
                .await;
            warn!(error = %e, failures, "Generation failed, discarded its media");
        }

        result
    }

    async fn produce(
        &self,
        request: GenerationRequest,
        progress: ProgressReporter,
        names: &MediaNames,
    ) -> CoreResult<GenerationOutput> {
        let audio = request.audio.to_bytes();
        self.media.write_recording(&names.audio, &audio).await?;

        let transcription = self.openai.transcribe(audio, &names.audio).await?;
        progress.transcribed(&transcription).await;

        let video_prompt = self.openai.video_prompt(&transcription).await?;
        progress.prompt_ready(&video_prompt).await;

        let remote_url = self.luma.generate(&video_prompt).await?;
        let video = self.luma.download(&remote_url).await?;

        let video_path = self.media.write_video(&names.video, &video).await?;
        let thumb_filename = self.thumbnail(&video_path, &names.thumb).await;

        info!(
            audio_filename = %names.audio,
            video_filename = %names.video,
            has_thumbnail = thumb_filename.is_some(),
            "Dream media stored"
        );

        Ok(GenerationOutput {
            transcription,
            video_prompt,
            audio_filename: names.audio.clone(),
            video_filename: names.video.clone(),
            thumb_filename,
        })
    }

    /// Best-effort thumbnail; a dream without one is still a dream.
    async fn thumbnail(&self, video: &Path, filename: &str) -> Option<String> {
        if !self.thumbnailer.enabled() {
            return None;
        }

        let outcome = match self.media.thumb_path(filename) {
            Ok(thumb) => self.thumbnailer.capture(video, &thumb).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => Some(filename.to_string()),
            Err(e) => {
                warn!(error = %e, "Thumbnail not created, keeping dream without one");
                None
            }
        }
    }
}
