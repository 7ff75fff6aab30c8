//! Vision analysis provider
//!
//! The provider receives one frame plus a textual prompt and returns the
//! free-text "I saw / I see / I say" transcript parsed by `transcript`.
//! It is injected as a trait object so tests can substitute a double and a
//! future structured-output upgrade only touches this module.

mod aesthetics;
mod client;
pub mod prompt;

pub use aesthetics::{parse_aesthetics_score, rate_aesthetics};
pub use client::GeminiVision;

use crate::capture::Frame;
use anyhow::Result;

/// Per-call generation settings
#[derive(Debug, Clone, Copy)]
pub struct GenerationProfile {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationProfile {
    /// Ingredient detection wants precise, list-shaped answers
    pub const INGREDIENTS: Self = Self {
        temperature: 0.2,
        max_output_tokens: 400,
    };

    /// Step detection reads more naturally at a slightly higher temperature
    pub const STEPS: Self = Self {
        temperature: 0.4,
        max_output_tokens: 200,
    };

    /// Aesthetics rating returns a tiny JSON object
    pub const AESTHETICS: Self = Self {
        temperature: 0.2,
        max_output_tokens: 20,
    };
}

/// Hosted vision-language model
#[async_trait::async_trait]
pub trait VisionProvider: Send + Sync {
    /// Analyze one frame under the given prompt and return the raw transcript
    async fn analyze(&self, frame: &Frame, prompt: &str, profile: GenerationProfile)
        -> Result<String>;
}
