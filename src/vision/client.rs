//! Gemini REST client
//!
//! Calls `models/{model}:generateContent` with the frame inlined as base64
//! and a per-call generation profile. The base URL is configurable so tests
//! can point at a local mock server.

use super::{GenerationProfile, VisionProvider};
use crate::capture::Frame;
use anyhow::{anyhow, Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub struct GeminiVision {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiVision {
    pub fn new(api_base: String, model: String, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build vision HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl VisionProvider for GeminiVision {
    async fn analyze(
        &self,
        frame: &Frame,
        prompt: &str,
        profile: GenerationProfile,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: frame.mime_type.clone(),
                            data: base64::engine::general_purpose::STANDARD.encode(&frame.bytes),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: profile.temperature,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: profile.max_output_tokens,
            },
        };

        debug!(
            "Sending frame to {} ({} bytes, {})",
            self.model,
            frame.bytes.len(),
            frame.mime_type
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Vision request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(anyhow!("Vision API error ({}): {}", status, message));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse vision response")?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .context("Vision response contained no text")?;

        info!("Vision transcript received ({} chars)", text.len());

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
