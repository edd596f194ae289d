mod audio_buffer;
mod recording_session;
