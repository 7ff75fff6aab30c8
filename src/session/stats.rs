use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics for a finished cooking session, computed once at completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Total session time in minutes, rounded
    pub total_time_minutes: i64,

    /// Number of recipe steps completed
    pub steps_completed: usize,

    /// When the session started
    pub start_time: DateTime<Utc>,

    /// When the session completed
    pub end_time: DateTime<Utc>,

    /// Percentage of steps completed, 0-100
    pub completion_rate: u8,

    /// Final-photo rating assigned later by the persistence sink
    pub aesthetics_score: u8,
}

impl SessionStats {
    pub fn compute(
        steps_completed: usize,
        total_steps: usize,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        let elapsed_ms = (end_time - start_time).num_milliseconds();
        Self {
            total_time_minutes: ((elapsed_ms as f64) / 60_000.0).round() as i64,
            steps_completed,
            start_time,
            end_time,
            completion_rate: calculate_completion_rate(steps_completed, total_steps),
            aesthetics_score: 0,
        }
    }
}

/// Percentage of completed steps, rounded; 0 when there are no steps
pub fn calculate_completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}
