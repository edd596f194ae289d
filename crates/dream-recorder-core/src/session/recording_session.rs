use crate::{
    CoreError, CoreResult, SessionGeneration, SessionStatus,
    session::{AudioIngestBuffer, AudioSnapshot},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, trace};

/// Session shared between the event loop and the background dispatch task.
pub type SharedSession = Arc<Mutex<RecordingSession>>;

/// Full client-visible state of the session, as sent in `state_update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current phase.
    pub status: SessionStatus,
    /// Derived from `status`, kept for clients that poll it directly.
    pub is_recording: bool,
    /// Transcribed narration, empty until the pipeline reports it.
    pub transcription: String,
    /// Generated video prompt, empty until the pipeline reports it.
    pub video_prompt: String,
    /// Playable video, set only on successful completion.
    pub video_url: Option<String>,
}

/// Intermediate report from a running pipeline job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineProgress {
    /// The narration has been transcribed; session stays `processing`.
    Transcribed {
        /// Transcribed text.
        transcription: String,
    },
    /// The video prompt is ready; session moves to `generating`.
    PromptReady {
        /// Prompt sent to video generation.
        video_prompt: String,
    },
}

/// Final report from a pipeline job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A video was generated and stored.
    Completed {
        /// Transcribed text.
        transcription: String,
        /// Prompt the video was generated from.
        video_prompt: String,
        /// URL the video is served from.
        video_url: String,
    },
    /// The job failed; the session goes back to `ready`.
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

/// The single device-wide recording state machine.
///
/// `ready → recording → processing → generating → complete → ready`.
/// All mutation goes through the methods below; each successful
/// transition returns the snapshot to publish.
#[derive(Debug)]
pub struct RecordingSession {
    status: SessionStatus,
    generation: SessionGeneration,
    transcription: String,
    video_prompt: String,
    video_url: Option<String>,
    buffer: AudioIngestBuffer,
    max_recording_bytes: usize,
}

impl RecordingSession {
    /// Create a `ready` session whose recordings are capped at `max_recording_bytes`.
    pub fn new(max_recording_bytes: usize) -> Self {
        Self {
            status: SessionStatus::Ready,
            generation: SessionGeneration::default(),
            transcription: String::new(),
            video_prompt: String::new(),
            video_url: None,
            buffer: AudioIngestBuffer::new(max_recording_bytes),
            max_recording_bytes,
        }
    }

    /// Wrap a new session for sharing with dispatch tasks.
    pub fn shared(max_recording_bytes: usize) -> SharedSession {
        Arc::new(Mutex::new(Self::new(max_recording_bytes)))
    }

    /// Current phase.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Generation of the most recent recording.
    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    /// Whether audio fragments are currently accepted.
    pub fn is_recording(&self) -> bool {
        self.status.is_recording()
    }

    /// Number of fragments in the live buffer.
    pub fn buffered_fragments(&self) -> usize {
        self.buffer.fragment_count()
    }

    /// Client-visible state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            is_recording: self.status.is_recording(),
            transcription: self.transcription.clone(),
            video_prompt: self.video_prompt.clone(),
            video_url: self.video_url.clone(),
        }
    }

    /// Begin a new recording.
    ///
    /// Clears the previous results, swaps in an empty buffer and bumps the
    /// generation so that any job still running for an older recording is
    /// detached. Rejected while already recording.
    #[track_caller]
    pub fn start(&mut self) -> CoreResult<SessionSnapshot> {
        if self.status.is_recording() {
            return Err(CoreError::InvalidTransition {
                action: "start recording",
                status: self.status,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.status.is_busy() {
            info!(
                superseded = %self.generation,
                "New recording started while a generation job is pending, its result will be discarded"
            );
        }

        self.generation = self.generation.next();
        self.transcription.clear();
        self.video_prompt.clear();
        self.video_url = None;
        self.buffer = AudioIngestBuffer::new(self.max_recording_bytes);
        self.status = SessionStatus::Recording;

        debug!(generation = %self.generation, "Session entered recording");

        Ok(self.snapshot())
    }

    /// Append a fragment to the live recording.
    ///
    /// Fragments arriving outside `recording` are expected after a racing
    /// stop and are dropped (`Ok(false)`).
    #[track_caller]
    pub fn append(&mut self, fragment: Vec<u8>) -> CoreResult<bool> {
        if !self.status.is_recording() {
            trace!(
                status = %self.status,
                bytes = fragment.len(),
                "Dropping audio fragment outside recording"
            );
            return Ok(false);
        }

        self.buffer.append(fragment)
    }

    /// Stop recording and capture the audio for the pipeline.
    ///
    /// With no captured audio the session returns to `ready` and
    /// [`CoreError::EmptyRecording`] is returned; nothing is dispatched.
    #[track_caller]
    pub fn finalize(&mut self) -> CoreResult<AudioSnapshot> {
        if !self.status.is_recording() {
            return Err(CoreError::InvalidTransition {
                action: "stop recording",
                status: self.status,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let buffer = std::mem::replace(
            &mut self.buffer,
            AudioIngestBuffer::new(self.max_recording_bytes),
        );

        if buffer.is_empty() {
            self.status = SessionStatus::Ready;
            return Err(CoreError::EmptyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.status = SessionStatus::Processing;

        Ok(buffer.into_snapshot(self.generation))
    }

    /// Apply an intermediate pipeline report.
    ///
    /// Returns `None` when the report belongs to a superseded generation or
    /// the session is no longer waiting on the pipeline.
    pub fn apply_progress(
        &mut self,
        generation: SessionGeneration,
        progress: PipelineProgress,
    ) -> Option<SessionSnapshot> {
        if !self.accepts_pipeline_report(generation) {
            return None;
        }

        match progress {
            PipelineProgress::Transcribed { transcription } => {
                self.transcription = transcription;
            }
            PipelineProgress::PromptReady { video_prompt } => {
                self.video_prompt = video_prompt;
                self.status = SessionStatus::Generating;
            }
        }

        Some(self.snapshot())
    }

    /// Apply the final pipeline report.
    ///
    /// On failure any partial results are dropped, so a failed job leaves
    /// the same empty fields a fresh recording has. Returns `None` for a
    /// superseded generation.
    pub fn apply_result(
        &mut self,
        generation: SessionGeneration,
        outcome: PipelineOutcome,
    ) -> Option<SessionSnapshot> {
        if !self.accepts_pipeline_report(generation) {
            return None;
        }

        match outcome {
            PipelineOutcome::Completed {
                transcription,
                video_prompt,
                video_url,
            } => {
                self.transcription = transcription;
                self.video_prompt = video_prompt;
                self.video_url = Some(video_url);
                self.status = SessionStatus::Complete;
            }
            PipelineOutcome::Failed { .. } => {
                self.transcription.clear();
                self.video_prompt.clear();
                self.video_url = None;
                self.status = SessionStatus::Ready;
            }
        }

        Some(self.snapshot())
    }

    fn accepts_pipeline_report(&self, generation: SessionGeneration) -> bool {
        if generation != self.generation {
            debug!(
                report_generation = %generation,
                current_generation = %self.generation,
                "Discarding pipeline report for superseded generation"
            );
            return false;
        }

        if !self.status.is_busy() {
            debug!(
                generation = %generation,
                status = %self.status,
                "Discarding pipeline report, session is not processing"
            );
            return false;
        }

        true
    }
}
