//! Inbound event handlers.
//!
//! [`DreamRecorder`] owns the session, the playback cursor and the
//! broadcaster, and is the only place that mutates them on behalf of
//! clients. It is driven by one sequential event loop; the dispatcher's
//! background jobs re-enter through the shared session lock.

use crate::{
    ClientId, CoreError, CoreResult, DeviceEvent, Dream, DreamStore, GenerationPipeline,
    InboundEvent, MediaLibrary, OutboundEvent, PlaybackCursor, ProcessingDispatcher,
    RecordingSession, SessionBroadcaster, SessionSnapshot, SharedSession,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Device-wide recorder context passed to every event handler.
pub struct DreamRecorder<S, P> {
    session: SharedSession,
    cursor: PlaybackCursor,
    broadcaster: SessionBroadcaster,
    dispatcher: ProcessingDispatcher<S, P>,
    store: Arc<S>,
    media: MediaLibrary,
}

impl<S: DreamStore, P: GenerationPipeline> DreamRecorder<S, P> {
    /// Create a recorder with a fresh `ready` session.
    pub fn new(
        store: Arc<S>,
        pipeline: Arc<P>,
        media: MediaLibrary,
        broadcaster: SessionBroadcaster,
        max_recording_bytes: usize,
    ) -> Self {
        let session = RecordingSession::shared(max_recording_bytes);
        let dispatcher = ProcessingDispatcher::new(
            pipeline,
            Arc::clone(&store),
            media.clone(),
            Arc::clone(&session),
            broadcaster.clone(),
        );

        Self {
            session,
            cursor: PlaybackCursor::new(),
            broadcaster,
            dispatcher,
            store,
            media,
        }
    }

    /// The broadcaster clients subscribe to.
    pub fn broadcaster(&self) -> &SessionBroadcaster {
        &self.broadcaster
    }

    /// Current playback cursor.
    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    /// Current client-visible session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Route one client event to its handler.
    ///
    /// Background jobs started by `stop_recording` are detached.
    pub async fn handle_inbound(&mut self, client: ClientId, event: InboundEvent) -> CoreResult<()> {
        match event {
            InboundEvent::StartRecording => self.start_recording().await,
            InboundEvent::StreamRecording { data } => self.stream_recording(data).await,
            InboundEvent::StopRecording => self.stop_recording(client).await.map(|_| ()),
            InboundEvent::ShowPreviousDream => self.show_previous_dream().await,
        }
    }

    /// Send the full session state to a newly connected client.
    #[instrument(skip(self))]
    pub async fn connect(&self, client: ClientId) {
        let session = self.session.lock().await;
        self.broadcaster
            .send_to(client, OutboundEvent::StateUpdate(session.snapshot()));
        info!(client_id = %client, status = %session.status(), "Client connected");
    }

    /// `start_recording`: begin a new recording.
    ///
    /// A duplicate start while recording is logged and ignored.
    #[instrument(skip(self))]
    pub async fn start_recording(&self) -> CoreResult<()> {
        let mut session = self.session.lock().await;

        match session.start() {
            Ok(snapshot) => {
                info!(generation = %session.generation(), "Recording started");
                self.broadcaster.publish(OutboundEvent::StateUpdate(snapshot));
                Ok(())
            }
            Err(e @ CoreError::InvalidTransition { .. }) => {
                warn!(error = %e, "Start recording event received, but already recording");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// `stream_recording`: append an audio fragment.
    ///
    /// Fragments outside a recording are dropped silently.
    pub async fn stream_recording(&self, fragment: Vec<u8>) -> CoreResult<()> {
        let mut session = self.session.lock().await;
        session.append(fragment)?;
        Ok(())
    }

    /// `stop_recording`: finalize and hand the audio to the pipeline.
    ///
    /// Returns the handle of the dispatched job, or `None` if the event was
    /// rejected because no recording was active. An empty recording returns
    /// the session to `ready` and yields [`CoreError::EmptyRecording`].
    #[instrument(skip(self))]
    pub async fn stop_recording(&self, origin: ClientId) -> CoreResult<Option<JoinHandle<()>>> {
        let mut session = self.session.lock().await;

        match session.finalize() {
            Ok(audio) => {
                info!(
                    generation = %audio.generation(),
                    fragment_count = audio.fragments().len(),
                    total_bytes = audio.total_bytes(),
                    "Recording stopped, dispatching for processing"
                );
                self.broadcaster
                    .publish(OutboundEvent::StateUpdate(session.snapshot()));
                Ok(Some(self.dispatcher.dispatch(audio, origin)))
            }
            Err(e @ CoreError::InvalidTransition { .. }) => {
                warn!(error = %e, "Stop recording event received, but not currently recording");
                Ok(None)
            }
            Err(e @ CoreError::EmptyRecording { .. }) => {
                self.broadcaster
                    .publish(OutboundEvent::StateUpdate(session.snapshot()));
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// `show_previous_dream`: cycle playback to the next older dream.
    #[instrument(skip(self))]
    pub async fn show_previous_dream(&mut self) -> CoreResult<()> {
        let dreams = self.store.list_dreams().await?;

        let Some(index) = self.cursor.advance(dreams.len()) else {
            warn!("No dreams found to cycle through");
            return Err(CoreError::NoDreams {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let dream = dreams.get(index).ok_or_else(|| CoreError::NoDreams {
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.broadcaster.publish(OutboundEvent::PlayVideo {
            video_url: dream.video_url(),
            looped: true,
        });

        info!(index, dream_id = dream.id, "Playing dream");

        Ok(())
    }

    /// Relay a hardware gesture or alarm trigger to every client.
    #[instrument(skip(self))]
    pub fn relay_device_event(&self, event: DeviceEvent) {
        let receivers = self
            .broadcaster
            .publish(OutboundEvent::Device { event_type: event });
        debug!(event = %event, receivers, "Device event relayed");
    }

    /// Tell every client the alarm was switched on or off.
    pub fn announce_alarm_toggled(&self, enabled: bool) {
        self.broadcaster
            .publish(OutboundEvent::AlarmToggled { enabled });
    }

    /// Answer a failed client request with an `error` event to that client.
    ///
    /// Pipeline failures are not routed here; the dispatcher publishes
    /// those to every client.
    pub fn report_error(&self, client: ClientId, error: &CoreError) {
        self.broadcaster.send_to(
            client,
            OutboundEvent::Error {
                message: error.user_message(),
            },
        );
    }

    /// All stored dreams, newest first.
    pub async fn list_dreams(&self) -> CoreResult<Vec<Dream>> {
        self.store.list_dreams().await
    }

    /// Delete a dream and, best-effort, its media files.
    ///
    /// File removal failures are logged only. The playback cursor is
    /// re-clamped against the shortened list.
    #[instrument(skip(self))]
    pub async fn delete_dream(&mut self, id: u64) -> CoreResult<Dream> {
        let not_found = || CoreError::DreamNotFound {
            id,
            location: ErrorLocation::from(Location::caller()),
        };

        let dream = self.store.get_dream(id).await?.ok_or_else(not_found)?;

        if !self.store.delete_dream(id).await? {
            return Err(not_found());
        }

        let failures = self.media.remove_dream_files(&dream).await;
        if failures > 0 {
            warn!(dream_id = id, failures, "Dream deleted, but some media files remain");
        }

        match self.store.list_dreams().await {
            Ok(remaining) => self.cursor.clamp(remaining.len()),
            Err(e) => {
                warn!(error = ?e, "Could not re-read dreams after delete, resetting playback");
                self.cursor.reset();
            }
        }

        info!(dream_id = id, "Dream deleted");

        Ok(dream)
    }
}
