//! Dream Recorder Core Library
//!
//! Recording-session orchestration for the dream recorder appliance:
//! a single session state machine fed by streamed audio fragments, a
//! background dispatcher that hands finished recordings to an external
//! generation pipeline, a playback cursor over stored dreams, and a
//! broadcaster that keeps every connected client in sync.
//!
//! # Example
//!
//! ```no_run
//! use dream_recorder_core::{
//!     ClientId, CoreResult, DreamRecorder, DreamStore, GenerationPipeline, MediaLibrary,
//!     SessionBroadcaster, DEFAULT_MAX_RECORDING_BYTES,
//! };
//!
//! use std::sync::Arc;
//!
//! async fn record<S: DreamStore, P: GenerationPipeline>(store: S, pipeline: P) -> CoreResult<()> {
//!     let media = MediaLibrary::new("recordings", "videos", "thumbs");
//!     let recorder = DreamRecorder::new(
//!         Arc::new(store),
//!         Arc::new(pipeline),
//!         media,
//!         SessionBroadcaster::default(),
//!         DEFAULT_MAX_RECORDING_BYTES,
//!     );
//!
//!     let client = ClientId::new();
//!     recorder.start_recording().await?;
//!     recorder.stream_recording(b"audio".to_vec()).await?;
//!     recorder.stop_recording(client).await?;
//!     Ok(())
//! }
//! ```

mod broadcast;
mod dispatch;
mod dream;
mod error;
mod playback;
mod recorder;
mod session;

pub use {
    broadcast::{
        ClientId, DEFAULT_BROADCAST_CAPACITY, DeviceEvent, InboundEvent, OutboundEvent,
        SessionBroadcaster, Subscription,
    },
    dispatch::{
        GenerationOutput, GenerationPipeline, GenerationRequest, ProcessingDispatcher,
        ProgressReporter,
    },
    dream::{
        Dream, DreamStore, MediaLibrary, NewDream, VIDEO_URL_PREFIX, sort_newest_first, video_url,
    },
    error::{CoreError, Result as CoreResult},
    playback::PlaybackCursor,
    recorder::DreamRecorder,
    session::{
        AudioIngestBuffer, AudioSnapshot, DEFAULT_MAX_RECORDING_BYTES, PipelineOutcome,
        PipelineProgress, RecordingSession, SessionGeneration, SessionSnapshot, SessionStatus,
        SharedSession,
    },
};

#[cfg(test)]
mod tests;
