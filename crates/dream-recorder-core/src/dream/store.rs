use crate::{CoreResult, Dream, NewDream};

use std::future::Future;

/// Persistent collection of completed dreams.
///
/// Implementations are shared between the event loop and dispatch tasks.
pub trait DreamStore: Send + Sync + 'static {
    /// All dreams, newest first.
    fn list_dreams(&self) -> impl Future<Output = CoreResult<Vec<Dream>>> + Send;

    /// One dream by identifier.
    fn get_dream(&self, id: u64) -> impl Future<Output = CoreResult<Option<Dream>>> + Send;

    /// Persist a new dream and return it with its assigned identifier.
    fn save_dream(&self, dream: NewDream) -> impl Future<Output = CoreResult<Dream>> + Send;

    /// Remove a dream. Returns `false` if it did not exist.
    fn delete_dream(&self, id: u64) -> impl Future<Output = CoreResult<bool>> + Send;
}
