mod audio_buffer;
mod generation;
mod recording_session;
mod status;

pub use {
    audio_buffer::{AudioIngestBuffer, AudioSnapshot, DEFAULT_MAX_RECORDING_BYTES},
    generation::SessionGeneration,
    recording_session::{
        PipelineOutcome, PipelineProgress, RecordingSession, SessionSnapshot, SharedSession,
    },
    status::SessionStatus,
};
