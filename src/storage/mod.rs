//! Completed-session persistence
//!
//! The sink stores one row per finished cooking session plus an optional
//! final photo. Persistence is never on the critical path: completion goes
//! ahead even when the sink fails, and the aesthetics score is the sink's
//! responsibility, not the scheduler's.

mod client;
mod records;

pub use client::{NullStore, SupabaseStore};
pub use records::{CompletionRecord, SavedCompletion};

use crate::capture::Frame;
use anyhow::Result;

#[async_trait::async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Store a completed session, uploading the final photo when present
    async fn save_completion(
        &self,
        record: CompletionRecord,
        image: Option<Frame>,
    ) -> Result<SavedCompletion>;

    /// All stored completions, newest first
    async fn list_completions(&self) -> Result<Vec<SavedCompletion>>;
}
