mod cursor;

pub use cursor::PlaybackCursor;
