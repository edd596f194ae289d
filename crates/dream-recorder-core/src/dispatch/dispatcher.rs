use crate::{
    AudioSnapshot, ClientId, DreamStore, GenerationOutput, GenerationPipeline, GenerationRequest,
    MediaLibrary, NewDream, OutboundEvent, PipelineOutcome, ProgressReporter, SessionBroadcaster,
    SessionGeneration, SharedSession,
};

use std::{sync::Arc, time::Instant};

use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Runs the generation pipeline off the event loop and feeds its outcome
/// back into the session.
///
/// One job per finalized recording. A job is never cancelled; if a newer
/// recording has started by the time it finishes, the session discards
/// the result via the generation check. The dream itself is still saved.
///
/// Media of a job whose dream cannot be saved is removed again; a job the
/// pipeline itself fails cleans up after itself.
pub struct ProcessingDispatcher<S, P> {
    pipeline: Arc<P>,
    store: Arc<S>,
    media: MediaLibrary,
    session: SharedSession,
    broadcaster: SessionBroadcaster,
}

impl<S, P> Clone for ProcessingDispatcher<S, P> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            store: Arc::clone(&self.store),
            media: self.media.clone(),
            session: Arc::clone(&self.session),
            broadcaster: self.broadcaster.clone(),
        }
    }
}

impl<S: DreamStore, P: GenerationPipeline> ProcessingDispatcher<S, P> {
    /// Create a dispatcher writing back into `session`.
    pub fn new(
        pipeline: Arc<P>,
        store: Arc<S>,
        media: MediaLibrary,
        session: SharedSession,
        broadcaster: SessionBroadcaster,
    ) -> Self {
        Self {
            pipeline,
            store,
            media,
            session,
            broadcaster,
        }
    }

    /// Start a background job for `audio`.
    ///
    /// Returns immediately. The handle resolves after the outcome has been
    /// applied to the session; callers may drop it.
    #[instrument(skip(self, audio), fields(generation = %audio.generation()))]
    pub fn dispatch(&self, audio: AudioSnapshot, origin: ClientId) -> JoinHandle<()> {
        let this = self.clone();

        tokio::spawn(async move {
            let generation = audio.generation();

            // Run the job on its own task so a panic inside the pipeline
            // still resolves to the failure path.
            let job = {
                let this = this.clone();
                tokio::spawn(async move { this.generate(audio, origin).await })
            };

            let outcome = match job.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(generation = %generation, error = ?e, "Generation task panicked");
                    PipelineOutcome::Failed {
                        reason: "Generation task aborted unexpectedly".to_string(),
                    }
                }
            };

            this.apply(generation, origin, outcome).await;
        })
    }

    async fn generate(&self, audio: AudioSnapshot, origin: ClientId) -> PipelineOutcome {
        let generation = audio.generation();
        let start = Instant::now();

        info!(
            generation = %generation,
            client_id = %origin,
            total_bytes = audio.total_bytes(),
            "Generation started"
        );

        let progress = ProgressReporter::new(
            generation,
            origin,
            Arc::clone(&self.session),
            self.broadcaster.clone(),
        );
        let request = GenerationRequest { audio, origin };

        match self.pipeline.generate(request, progress).await {
            Ok(output) => {
                info!(
                    generation = %generation,
                    duration_ms = start.elapsed().as_millis(),
                    video_filename = %output.video_filename,
                    "Generation complete"
                );
                self.persist(output).await
            }
            Err(e) => {
                error!(generation = %generation, error = ?e, "Generation failed");
                PipelineOutcome::Failed {
                    reason: e.user_message(),
                }
            }
        }
    }

    async fn persist(&self, output: GenerationOutput) -> PipelineOutcome {
        let audio_filename = output.audio_filename.clone();
        let video_filename = output.video_filename.clone();
        let thumb_filename = output.thumb_filename.clone();

        let new_dream = NewDream {
            transcription: output.transcription,
            video_prompt: output.video_prompt,
            audio_filename: output.audio_filename,
            video_filename: output.video_filename,
            thumb_filename: output.thumb_filename,
        };

        match self.store.save_dream(new_dream).await {
            Ok(dream) => {
                info!(dream_id = dream.id, "Dream saved");
                PipelineOutcome::Completed {
                    video_url: dream.video_url(),
                    transcription: dream.transcription,
                    video_prompt: dream.video_prompt,
                }
            }
            Err(e) => {
                error!(error = ?e, "Failed to save dream");

                let failures = self
                    .media
                    .remove_files(
                        &audio_filename,
                        Some(&video_filename),
                        thumb_filename.as_deref(),
                    )
                    .await;
                if failures > 0 {
                    warn!(failures, "Unsaved dream media could not be fully removed");
                }

                PipelineOutcome::Failed {
                    reason: e.user_message(),
                }
            }
        }
    }

    async fn apply(&self, generation: SessionGeneration, origin: ClientId, outcome: PipelineOutcome) {
        let notice = match &outcome {
            PipelineOutcome::Completed { video_url, .. } => OutboundEvent::VideoReady {
                url: video_url.clone(),
            },
            PipelineOutcome::Failed { reason } => OutboundEvent::Error {
                message: reason.clone(),
            },
        };

        let mut session = self.session.lock().await;
        match session.apply_result(generation, outcome) {
            Some(snapshot) => {
                info!(generation = %generation, status = %snapshot.status, "Generation result applied");
                self.broadcaster.publish(OutboundEvent::StateUpdate(snapshot));
                match notice {
                    OutboundEvent::VideoReady { .. } => {
                        self.broadcaster.send_to(origin, notice);
                    }
                    _ => {
                        self.broadcaster.publish(notice);
                    }
                }
            }
            None => {
                info!(
                    generation = %generation,
                    current_generation = %session.generation(),
                    "Generation result discarded, recording was superseded"
                );
            }
        }
    }
}
