use crate::config::{CaptureConfig, RecipeConfig, TtsConfig};
use crate::speech::VoiceLocale;
use anyhow::Result;
use std::time::Duration;
use uuid::Uuid;

/// Everything one cooking session needs to run
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_id: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    /// Delay between analysis cycles
    pub analysis_interval: Duration,
    /// Voice locale at startup
    pub locale: VoiceLocale,
}

impl SessionConfig {
    pub fn from_config(
        recipe: &RecipeConfig,
        capture: &CaptureConfig,
        tts: &TtsConfig,
    ) -> Result<Self> {
        Ok(Self {
            session_id: Uuid::new_v4().to_string(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
            analysis_interval: Duration::from_millis(capture.analysis_interval_ms),
            locale: tts.locale.parse()?,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            ingredients: vec![
                "3 fresh eggs".to_string(),
                "1 cup butter".to_string(),
                "1 cup milk".to_string(),
            ],
            steps: vec![
                "Crack 3 eggs into a large mixing bowl".to_string(),
                "Bake the mixture in the oven for 10 minutes".to_string(),
            ],
            analysis_interval: Duration::from_millis(2000),
            locale: VoiceLocale::Grandma,
        }
    }
}
