use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::capture::Frame;
use crate::checklist::Checklist;
use crate::storage::{CompletionRecord, PersistenceSink, SavedCompletion};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Turns a finished session into a completion record and hands it to the
/// persistence sink. Persistence failures are logged, never propagated:
/// the session has already completed by the time this runs.
pub struct SessionRecorder {
    store: Arc<dyn PersistenceSink>,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn PersistenceSink>) -> Self {
        Self { store }
    }

    /// Compute the final statistics and the record to store
    pub fn finalize(
        &self,
        config: &SessionConfig,
        steps: &Checklist,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> (SessionStats, CompletionRecord) {
        let stats = SessionStats::compute(
            steps.completed_count(),
            steps.len(),
            start_time,
            end_time,
        );

        let record = CompletionRecord {
            total_time: stats.total_time_minutes,
            steps_completed: stats.steps_completed,
            start_time,
            end_time,
            ingredients: config.ingredients.clone(),
            steps: config.steps.clone(),
            completion_rate: stats.completion_rate,
            aesthetics_score: 0,
            final_image_url: None,
        };

        (stats, record)
    }

    /// Best-effort store of the completion plus the final photo
    pub async fn persist(
        &self,
        record: CompletionRecord,
        final_image: Option<Frame>,
    ) -> Option<SavedCompletion> {
        match self.store.save_completion(record, final_image).await {
            Ok(saved) => {
                info!(
                    "Session completion stored (rate={}%)",
                    saved.record.completion_rate
                );
                Some(saved)
            }
            Err(e) => {
                warn!("Failed to store session completion: {}", e);
                None
            }
        }
    }
}
