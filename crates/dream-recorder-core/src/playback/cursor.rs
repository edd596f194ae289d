use tracing::debug;

/// Cyclic position in the newest-first list of completed dreams.
///
/// The list itself is owned by the dream store; every call takes its
/// current length so the cursor never works from a stale count.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor {
    current_index: usize,
    is_playing: bool,
}

impl PlaybackCursor {
    /// An inactive cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the selected dream, 0 = most recent.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Whether playback cycling has started.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Select the next dream to play.
    ///
    /// The first call starts at the most recent dream; later calls step to
    /// older ones and wrap to 0 past the end. Returns `None` without any
    /// state change when there are no dreams.
    pub fn advance(&mut self, dream_count: usize) -> Option<usize> {
        if dream_count == 0 {
            return None;
        }

        if self.is_playing {
            self.current_index += 1;
            if self.current_index >= dream_count {
                self.current_index = 0;
            }
        } else {
            self.current_index = 0;
            self.is_playing = true;
        }

        Some(self.current_index)
    }

    /// Re-check the index after dreams were removed.
    ///
    /// An index that no longer points into the list deactivates the
    /// cursor, so the next `advance` restarts from the newest dream.
    pub fn clamp(&mut self, dream_count: usize) {
        if self.is_playing && self.current_index >= dream_count {
            debug!(
                current_index = self.current_index,
                dream_count, "Playback index invalidated, cursor reset"
            );
            self.reset();
        }
    }

    /// Return to the inactive state.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.is_playing = false;
    }
}
