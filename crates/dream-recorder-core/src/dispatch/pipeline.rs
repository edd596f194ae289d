use crate::{
    AudioSnapshot, ClientId, CoreResult, OutboundEvent, PipelineProgress, SessionBroadcaster,
    SessionGeneration, SharedSession,
};

use std::future::Future;

use tracing::debug;

/// Work handed to the generation pipeline.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Captured audio, tagged with its session generation.
    pub audio: AudioSnapshot,
    /// Client that stopped the recording and receives targeted updates.
    pub origin: ClientId,
}

/// Artifacts produced by a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutput {
    /// Transcribed narration.
    pub transcription: String,
    /// Prompt the video was generated from.
    pub video_prompt: String,
    /// Stored recording file name.
    pub audio_filename: String,
    /// Stored video file name.
    pub video_filename: String,
    /// Stored thumbnail file name, if any.
    pub thumb_filename: Option<String>,
}

/// External transcription and video generation.
///
/// Runs on a background task. Errors are turned into the session's
/// failure path by the dispatcher; implementations never need to touch
/// session state directly.
pub trait GenerationPipeline: Send + Sync + 'static {
    /// Turn recorded audio into a stored video.
    ///
    /// `progress` forwards intermediate results to the session while the
    /// job is still running.
    fn generate(
        &self,
        request: GenerationRequest,
        progress: ProgressReporter,
    ) -> impl Future<Output = CoreResult<GenerationOutput>> + Send;
}

/// Routes intermediate pipeline results into the session.
///
/// Reports for a superseded generation are dropped by the session.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    generation: SessionGeneration,
    origin: ClientId,
    session: SharedSession,
    broadcaster: SessionBroadcaster,
}

impl ProgressReporter {
    pub(crate) fn new(
        generation: SessionGeneration,
        origin: ClientId,
        session: SharedSession,
        broadcaster: SessionBroadcaster,
    ) -> Self {
        Self {
            generation,
            origin,
            session,
            broadcaster,
        }
    }

    /// Generation of the job this reporter belongs to.
    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    /// Report the finished transcription.
    pub async fn transcribed(&self, transcription: &str) {
        self.report(
            PipelineProgress::Transcribed {
                transcription: transcription.to_string(),
            },
            OutboundEvent::TranscriptionUpdate {
                text: transcription.to_string(),
            },
        )
        .await;
    }

    /// Report the generated video prompt; the session enters `generating`.
    pub async fn prompt_ready(&self, video_prompt: &str) {
        self.report(
            PipelineProgress::PromptReady {
                video_prompt: video_prompt.to_string(),
            },
            OutboundEvent::VideoPromptUpdate {
                text: video_prompt.to_string(),
            },
        )
        .await;
    }

    async fn report(&self, progress: PipelineProgress, notice: OutboundEvent) {
        let mut session = self.session.lock().await;
        match session.apply_progress(self.generation, progress) {
            Some(snapshot) => {
                // Published under the lock so clients see transitions in order.
                self.broadcaster.publish(OutboundEvent::StateUpdate(snapshot));
                self.broadcaster.send_to(self.origin, notice);
            }
            None => {
                debug!(generation = %self.generation, event = notice.name(), "Stale progress dropped");
            }
        }
    }
}
