use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row written to the `recipe_completions` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRecord {
    /// Total session time in minutes
    pub total_time: i64,
    pub steps_completed: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    /// Percentage of steps completed, 0-100
    pub completion_rate: u8,
    /// Final-photo rating 1-5 (0 when no photo was stored)
    pub aesthetics_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_image_url: Option<String>,
}

/// A stored completion as returned by the sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub record: CompletionRecord,
}
