//! Fakes for the store and pipeline collaborators.

use crate::{
    CoreError, CoreResult, Dream, DreamStore, GenerationOutput, GenerationPipeline,
    GenerationRequest, MediaLibrary, NewDream, OutboundEvent, ProgressReporter, Subscription, sort_newest_first,
};

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::sync::{Mutex, Notify};

pub(crate) const TRANSCRIPTION: &str = "I was flying over a city made of glass";
pub(crate) const VIDEO_PROMPT: &str = "A cinematic flight above a glittering glass city at dawn";

/// In-memory dream store with a deterministic clock.
#[derive(Default)]
pub(crate) struct MemoryDreamStore {
    dreams: Mutex<Vec<Dream>>,
    next_id: AtomicU64,
    clock_ms: AtomicU64,
    pub(crate) fail_saves: bool,
}

impl MemoryDreamStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Store `count` dreams; dream `count` is the newest.
    pub(crate) async fn with_dreams(count: usize) -> Self {
        let store = Self::new();
        for i in 1..=count {
            let _ = store.insert(new_dream(&format!("dream_{}.mp4", i))).await;
        }
        store
    }

    pub(crate) async fn len(&self) -> usize {
        self.dreams.lock().await.len()
    }

    async fn insert(&self, dream: NewDream) -> Dream {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created_at_ms = self.clock_ms.fetch_add(1000, Ordering::SeqCst);
        let dream = Dream {
            id,
            transcription: dream.transcription,
            video_prompt: dream.video_prompt,
            audio_filename: dream.audio_filename,
            video_filename: dream.video_filename,
            thumb_filename: dream.thumb_filename,
            created_at_ms,
        };
        self.dreams.lock().await.push(dream.clone());
        dream
    }
}

impl DreamStore for MemoryDreamStore {
    fn list_dreams(&self) -> impl Future<Output = CoreResult<Vec<Dream>>> + Send {
        async move {
            let mut dreams = self.dreams.lock().await.clone();
            sort_newest_first(&mut dreams);
            Ok(dreams)
        }
    }

    fn get_dream(&self, id: u64) -> impl Future<Output = CoreResult<Option<Dream>>> + Send {
        async move {
            let dreams = self.dreams.lock().await;
            Ok(dreams.iter().find(|d| d.id == id).cloned())
        }
    }

    fn save_dream(&self, dream: NewDream) -> impl Future<Output = CoreResult<Dream>> + Send {
        async move {
            if self.fail_saves {
                return Err(CoreError::store("disk full"));
            }
            Ok(self.insert(dream).await)
        }
    }

    fn delete_dream(&self, id: u64) -> impl Future<Output = CoreResult<bool>> + Send {
        async move {
            let mut dreams = self.dreams.lock().await;
            let before = dreams.len();
            dreams.retain(|d| d.id != id);
            Ok(dreams.len() != before)
        }
    }
}

pub(crate) fn new_dream(video_filename: &str) -> NewDream {
    NewDream {
        transcription: TRANSCRIPTION.to_string(),
        video_prompt: VIDEO_PROMPT.to_string(),
        audio_filename: video_filename.replace(".mp4", ".webm"),
        video_filename: video_filename.to_string(),
        thumb_filename: None,
    }
}

/// How a [`ScriptedPipeline`] run ends.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    Succeed,
    FailAfterTranscription(String),
    Panic,
}

/// Pipeline fake that reports progress and records the audio it received.
pub(crate) struct ScriptedPipeline {
    script: Script,
    /// When set, the run pauses after transcription until notified.
    gate: Option<Arc<Notify>>,
    /// When set, the run writes its recording and video like a real pipeline.
    media: Option<MediaLibrary>,
    received: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedPipeline {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            gate: None,
            media: None,
            received: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn gated(script: Script, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(script)
        }
    }

    pub(crate) fn writing_media(script: Script, media: MediaLibrary) -> Self {
        Self {
            media: Some(media),
            ..Self::new(script)
        }
    }

    pub(crate) async fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().await.clone()
    }
}

impl GenerationPipeline for ScriptedPipeline {
    #[allow(clippy::panic)]
    fn generate(
        &self,
        request: GenerationRequest,
        progress: ProgressReporter,
    ) -> impl Future<Output = CoreResult<GenerationOutput>> + Send {
        async move {
            self.received.lock().await.push(request.audio.to_bytes());
            let generation = request.audio.generation();
            let audio_filename = format!("recording_{}.webm", generation);
            let video_filename = format!("dream_{}.mp4", generation);

            if let Some(media) = &self.media {
                media
                    .write_recording(&audio_filename, &request.audio.to_bytes())
                    .await?;
            }

            progress.transcribed(TRANSCRIPTION).await;

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            match &self.script {
                Script::Succeed => {}
                Script::FailAfterTranscription(reason) => {
                    return Err(CoreError::pipeline(reason.clone()));
                }
                Script::Panic => panic!("pipeline exploded"),
            }

            progress.prompt_ready(VIDEO_PROMPT).await;

            if let Some(media) = &self.media {
                media.write_video(&video_filename, b"mp4").await?;
            }

            Ok(GenerationOutput {
                transcription: TRANSCRIPTION.to_string(),
                video_prompt: VIDEO_PROMPT.to_string(),
                audio_filename,
                video_filename,
                thumb_filename: None,
            })
        }
    }
}

/// Everything already delivered to a subscription.
pub(crate) fn drain(subscription: &mut Subscription) -> Vec<OutboundEvent> {
    let mut events = Vec::new();
    while let Some(event) = subscription.try_recv() {
        events.push(event);
    }
    events
}
