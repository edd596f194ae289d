//! Dream records kept in a single JSON file.

use dream_recorder_core::{CoreError, CoreResult, Dream, DreamStore, NewDream, sort_newest_first};

use std::{
    future::Future,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tokio::{io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info, instrument};

/// On-disk layout. `next_id` survives deletes so ids are never reused.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DreamIndex {
    next_id: u64,
    dreams: Vec<Dream>,
}

/// [`DreamStore`] backed by a JSON file, rewritten atomically on change.
#[derive(Debug)]
pub struct JsonDreamStore {
    path: PathBuf,
    index: Mutex<DreamIndex>,
}

impl JsonDreamStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    #[instrument]
    pub async fn open(path: &Path) -> CoreResult<Self> {
        let index = match tokio::fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str::<DreamIndex>(&contents).map_err(|e| {
                CoreError::store(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = ?path, "No dream index found, starting empty");
                DreamIndex::default()
            }
            Err(e) => return Err(e.into()),
        };

        let next_id = index
            .dreams
            .iter()
            .map(|d| d.id + 1)
            .max()
            .unwrap_or(1)
            .max(index.next_id);

        info!(path = ?path, dream_count = index.dreams.len(), "Dream index loaded");

        Ok(Self {
            path: path.to_path_buf(),
            index: Mutex::new(DreamIndex {
                next_id,
                dreams: index.dreams,
            }),
        })
    }

    async fn persist(&self, index: &DreamIndex) -> CoreResult<()> {
        let contents = serde_json::to_vec_pretty(index)
            .map_err(|e| CoreError::store(format!("Failed to serialize dreams: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut temp_file = tokio::fs::File::create(&temp_path).await?;
        temp_file.write_all(&contents).await?;
        temp_file.sync_all().await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!(path = ?self.path, dream_count = index.dreams.len(), "Dream index written");

        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

impl DreamStore for JsonDreamStore {
    fn list_dreams(&self) -> impl Future<Output = CoreResult<Vec<Dream>>> + Send {
        async move {
            let mut dreams = self.index.lock().await.dreams.clone();
            sort_newest_first(&mut dreams);
            Ok(dreams)
        }
    }

    fn get_dream(&self, id: u64) -> impl Future<Output = CoreResult<Option<Dream>>> + Send {
        async move {
            let index = self.index.lock().await;
            Ok(index.dreams.iter().find(|d| d.id == id).cloned())
        }
    }

    fn save_dream(&self, dream: NewDream) -> impl Future<Output = CoreResult<Dream>> + Send {
        async move {
            let mut index = self.index.lock().await;

            let saved = Dream {
                id: index.next_id,
                transcription: dream.transcription,
                video_prompt: dream.video_prompt,
                audio_filename: dream.audio_filename,
                video_filename: dream.video_filename,
                thumb_filename: dream.thumb_filename,
                created_at_ms: now_ms(),
            };

            index.next_id += 1;
            index.dreams.push(saved.clone());

            if let Err(e) = self.persist(&index).await {
                index.dreams.pop();
                index.next_id -= 1;
                return Err(e);
            }

            Ok(saved)
        }
    }

    fn delete_dream(&self, id: u64) -> impl Future<Output = CoreResult<bool>> + Send {
        async move {
            let mut index = self.index.lock().await;

            let Some(position) = index.dreams.iter().position(|d| d.id == id) else {
                return Ok(false);
            };

            let removed = index.dreams.remove(position);

            if let Err(e) = self.persist(&index).await {
                index.dreams.insert(position, removed);
                return Err(e);
            }

            Ok(true)
        }
    }
}
