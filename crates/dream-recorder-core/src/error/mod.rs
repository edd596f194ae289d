use crate::SessionStatus;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Orchestrator errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An event arrived in a session phase that does not permit it.
    #[error("Cannot {action} while {status} {location}")]
    InvalidTransition {
        /// The rejected operation.
        action: &'static str,
        /// Session phase at the time of the request.
        status: SessionStatus,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `stop_recording` arrived before any audio fragment was captured.
    #[error("Empty recording: no audio captured {location}")]
    EmptyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recording grew beyond the configured size guard.
    #[error("Recording exceeds {limit_bytes} bytes {location}")]
    RecordingLimitExceeded {
        /// Configured maximum in bytes.
        limit_bytes: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The external generation pipeline failed.
    #[error("Generation pipeline failed: {reason} {location}")]
    Pipeline {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The dream store could not complete an operation.
    #[error("Dream store error: {reason} {location}")]
    Store {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback was requested but no dreams exist.
    #[error("No dreams found {location}")]
    NoDreams {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A dream identifier did not match any stored dream.
    #[error("Dream {id} not found {location}")]
    DreamNotFound {
        /// The requested identifier.
        id: u64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from media file operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CoreError {
    /// Build a [`CoreError::Pipeline`] at the caller's location.
    #[track_caller]
    pub fn pipeline(reason: impl Into<String>) -> Self {
        CoreError::Pipeline {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Build a [`CoreError::Store`] at the caller's location.
    #[track_caller]
    pub fn store(reason: impl Into<String>) -> Self {
        CoreError::Store {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Message suitable for an outbound `error` event.
    ///
    /// Unlike `Display`, this omits the source location.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::InvalidTransition { action, status, .. } => {
                format!("Cannot {} while {}", action, status)
            }
            CoreError::EmptyRecording { .. } => "No audio was recorded".to_string(),
            CoreError::RecordingLimitExceeded { .. } => {
                "Recording is too long, further audio is being dropped".to_string()
            }
            CoreError::Pipeline { reason, .. } => format!("Error processing audio: {}", reason),
            CoreError::Store { reason, .. } => format!("Dream storage error: {}", reason),
            CoreError::NoDreams { .. } => "No dreams found".to_string(),
            CoreError::DreamNotFound { id, .. } => format!("Dream {} not found", id),
            CoreError::Io { source, .. } => format!("File error: {}", source),
        }
    }
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CoreError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
