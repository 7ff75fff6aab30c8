//! Aesthetics rating of the finished dish
//!
//! Off the critical path: any failure falls back to the minimum score so
//! session completion is never blocked on it.

use super::{prompt, GenerationProfile, VisionProvider};
use crate::capture::Frame;
use serde::Deserialize;
use tracing::warn;

const FALLBACK_SCORE: u8 = 1;

#[derive(Debug, Deserialize)]
struct ScoreReply {
    score: i64,
}

/// Rate the final photo 1..=5, defaulting to 1 on any failure
pub async fn rate_aesthetics(vision: &dyn VisionProvider, frame: &Frame) -> u8 {
    match vision
        .analyze(frame, &prompt::aesthetics_prompt(), GenerationProfile::AESTHETICS)
        .await
    {
        Ok(reply) => parse_aesthetics_score(&reply),
        Err(e) => {
            warn!("Aesthetics analysis failed: {}", e);
            FALLBACK_SCORE
        }
    }
}

/// Extract the `{"score": X}` object from the reply, clamped to 1..=5
pub fn parse_aesthetics_score(reply: &str) -> u8 {
    let Some(start) = reply.find('{') else {
        warn!("No JSON object in aesthetics reply");
        return FALLBACK_SCORE;
    };
    let Some(end) = reply[start..].find('}') else {
        warn!("Unterminated JSON object in aesthetics reply");
        return FALLBACK_SCORE;
    };

    match serde_json::from_str::<ScoreReply>(&reply[start..=start + end]) {
        Ok(parsed) => parsed.score.clamp(1, 5) as u8,
        Err(e) => {
            warn!("Failed to parse aesthetics score: {}", e);
            FALLBACK_SCORE
        }
    }
}
