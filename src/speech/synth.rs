//! Text-to-speech synthesis client

use super::voice::VoiceConfig;
use anyhow::{anyhow, Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Hosted speech synthesis provider
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize text into playable audio bytes (MP3)
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>>;
}

/// Google Cloud Text-to-Speech REST client
pub struct GoogleTts {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GoogleTts {
    pub fn new(api_base: String, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build TTS HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        let url = format!("{}/v1/text:synthesize?key={}", self.api_base, self.api_key);

        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: voice.language_code,
                name: voice.name,
                ssml_gender: voice.ssml_gender,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                pitch: voice.pitch,
                speaking_rate: voice.speaking_rate,
                volume_gain_db: 3.0,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("TTS request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("TTS API error ({}): {}", status, body));
        }

        let reply: SynthesizeResponse = response
            .json()
            .await
            .context("Failed to parse TTS response")?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(reply.audio_content)
            .context("TTS audio payload is not valid base64")?;

        info!("Synthesized {} chars into {} audio bytes", text.len(), audio.len());

        Ok(audio)
    }
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct VoiceSelection {
    #[serde(rename = "languageCode")]
    language_code: &'static str,
    name: &'static str,
    #[serde(rename = "ssmlGender")]
    ssml_gender: &'static str,
}

#[derive(Debug, Serialize)]
struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    audio_encoding: &'static str,
    pitch: f32,
    #[serde(rename = "speakingRate")]
    speaking_rate: f32,
    #[serde(rename = "volumeGainDb")]
    volume_gain_db: f32,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}
