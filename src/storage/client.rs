//! Supabase-backed persistence
//!
//! Two endpoints: the Storage API for the final photo and the REST API for
//! the `recipe_completions` row. The aesthetics score is computed here,
//! after the upload, so the scheduler never waits on it.

use super::records::{CompletionRecord, SavedCompletion};
use super::PersistenceSink;
use crate::capture::Frame;
use crate::vision::{rate_aesthetics, VisionProvider};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const IMAGE_BUCKET: &str = "recipe-images";

pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    vision: Arc<dyn VisionProvider>,
}

impl SupabaseStore {
    pub fn new(base_url: String, anon_key: String, vision: Arc<dyn VisionProvider>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build storage HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            vision,
        })
    }

    /// Upload the final photo and return its public URL
    async fn upload_image(&self, image: &Frame) -> Result<String> {
        let file_name = format!("{}-final.jpg", chrono::Utc::now().timestamp_millis());
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, IMAGE_BUCKET, file_name
        );

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header(reqwest::header::CONTENT_TYPE, image.mime_type.clone())
            .body(image.bytes.clone())
            .send()
            .await
            .context("Image upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Image upload failed ({}): {}", status, body));
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, IMAGE_BUCKET, file_name
        ))
    }
}

#[async_trait::async_trait]
impl PersistenceSink for SupabaseStore {
    async fn save_completion(
        &self,
        mut record: CompletionRecord,
        image: Option<Frame>,
    ) -> Result<SavedCompletion> {
        if let Some(image) = image {
            match self.upload_image(&image).await {
                Ok(url) => {
                    record.final_image_url = Some(url);
                    record.aesthetics_score = rate_aesthetics(self.vision.as_ref(), &image).await;
                }
                // The row is still worth keeping without its photo
                Err(e) => warn!("Final image upload failed: {}", e),
            }
        }

        let url = format!("{}/rest/v1/recipe_completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Prefer", "return=representation")
            .json(&[&record])
            .send()
            .await
            .context("Completion insert request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Completion insert failed ({}): {}", status, body));
        }

        let mut rows: Vec<SavedCompletion> = response
            .json()
            .await
            .context("Failed to parse completion insert response")?;

        let saved = rows
            .pop()
            .context("Completion insert returned no representation")?;

        info!(
            "Stored completion {} (rate={}%, aesthetics={})",
            saved.id.as_deref().unwrap_or("<no id>"),
            saved.record.completion_rate,
            saved.record.aesthetics_score
        );

        Ok(saved)
    }

    async fn list_completions(&self) -> Result<Vec<SavedCompletion>> {
        let url = format!(
            "{}/rest/v1/recipe_completions?select=*&order=created_at.desc",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .send()
            .await
            .context("Completion list request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Completion list failed ({}): {}", status, body));
        }

        Ok(response
            .json()
            .await
            .context("Failed to parse completion list response")?)
    }
}

/// Sink used when persistence is disabled: completions are logged only
pub struct NullStore;

#[async_trait::async_trait]
impl PersistenceSink for NullStore {
    async fn save_completion(
        &self,
        record: CompletionRecord,
        _image: Option<Frame>,
    ) -> Result<SavedCompletion> {
        info!(
            "Persistence disabled; completion not stored (rate={}%, {} steps)",
            record.completion_rate, record.steps_completed
        );
        Ok(SavedCompletion {
            id: None,
            created_at: None,
            record,
        })
    }

    async fn list_completions(&self) -> Result<Vec<SavedCompletion>> {
        Ok(Vec::new())
    }
}
