//! Cooking session management
//!
//! This module provides the session abstraction that drives one cooking
//! session end to end:
//! - The analysis scheduler (single-flight capture -> vision -> track -> speak loop)
//! - Phase progression (preparation -> cooking -> completed)
//! - Session statistics and the completion record handoff

mod config;
mod recorder;
mod scheduler;
mod stats;

pub use config::SessionConfig;
pub use recorder::SessionRecorder;
pub use scheduler::{AnalysisScheduler, SessionCommand, SessionHandle, SessionView};
pub use stats::{calculate_completion_rate, SessionStats};
