use crate::{CoreError, CoreResult, SessionGeneration};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, warn};

/// Default upper bound for one recording (50 MiB of encoded audio).
///
/// At the typical 32 kbit/s of browser Opus this is several hours; the
/// guard exists to stop a stuck client from exhausting memory.
pub const DEFAULT_MAX_RECORDING_BYTES: usize = 50 * 1024 * 1024;

/// Ordered accumulator of raw audio fragments for one recording.
///
/// Append-only. Never cleared in place: a new recording gets a new
/// buffer, and finalizing consumes the buffer into an [`AudioSnapshot`].
#[derive(Debug)]
pub struct AudioIngestBuffer {
    fragments: Vec<Vec<u8>>,
    total_bytes: usize,
    max_bytes: usize,
    overflowed: bool,
}

impl AudioIngestBuffer {
    /// Create an empty buffer that accepts at most `max_bytes`.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            fragments: Vec::new(),
            total_bytes: 0,
            max_bytes,
            overflowed: false,
        }
    }

    /// Append one fragment in arrival order.
    ///
    /// Returns `Ok(true)` when stored and `Ok(false)` when dropped. Empty
    /// fragments are dropped. The first fragment that would exceed the
    /// size guard returns [`CoreError::RecordingLimitExceeded`]; every
    /// later one is dropped quietly so the client is told only once.
    #[track_caller]
    pub fn append(&mut self, fragment: Vec<u8>) -> CoreResult<bool> {
        if fragment.is_empty() {
            return Ok(false);
        }

        if self.overflowed {
            return Ok(false);
        }

        if self.total_bytes.saturating_add(fragment.len()) > self.max_bytes {
            self.overflowed = true;
            warn!(
                limit_bytes = self.max_bytes,
                total_bytes = self.total_bytes,
                "Recording size limit reached, dropping further audio"
            );
            return Err(CoreError::RecordingLimitExceeded {
                limit_bytes: self.max_bytes,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.total_bytes += fragment.len();
        self.fragments.push(fragment);

        Ok(true)
    }

    /// Number of fragments captured so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Number of bytes captured so far.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Freeze the captured fragments for handoff to the pipeline.
    pub fn into_snapshot(self, generation: SessionGeneration) -> AudioSnapshot {
        debug!(
            generation = %generation,
            fragment_count = self.fragments.len(),
            total_bytes = self.total_bytes,
            "Audio snapshot captured"
        );

        AudioSnapshot {
            generation,
            fragments: self.fragments.into(),
            total_bytes: self.total_bytes,
        }
    }
}

/// Immutable, ordered capture of every fragment of one recording.
///
/// Cloning is cheap; the fragments are shared.
#[derive(Debug, Clone)]
pub struct AudioSnapshot {
    generation: SessionGeneration,
    fragments: Arc<[Vec<u8>]>,
    total_bytes: usize,
}

impl AudioSnapshot {
    /// Generation this audio was recorded in.
    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    /// Fragments in arrival order.
    pub fn fragments(&self) -> &[Vec<u8>] {
        &self.fragments
    }

    /// Total number of audio bytes.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Concatenate the fragments into one contiguous byte stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.total_bytes);
        for fragment in self.fragments.iter() {
            bytes.extend_from_slice(fragment);
        }
        bytes
    }
}
