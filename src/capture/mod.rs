//! Frame capture sources
//!
//! The assistant only ever needs one still image at a time, so the capture
//! abstraction is a single on-demand call. Two sources are supported:
//! - HTTP: a webcam snapshot endpoint (IP cameras, mjpeg-streamer `/snapshot`)
//! - Dir: the newest image file in a watched directory
//!
//! "No frame available" is a recoverable condition (`Ok(None)`), not an
//! error: the analysis cycle skips the provider call and tries again later.

use crate::config::CaptureConfig;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// A single captured still image
#[derive(Debug, Clone)]
pub struct Frame {
    /// Encoded image bytes (JPEG or PNG)
    pub bytes: Vec<u8>,
    /// MIME type of the encoded image
    pub mime_type: String,
}

/// On-demand frame source
#[async_trait::async_trait]
pub trait FrameSource: Send + Sync {
    /// Capture one frame. `Ok(None)` means no frame is currently available.
    async fn capture(&self) -> Result<Option<Frame>>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Frame source factory
pub struct FrameSourceFactory;

impl FrameSourceFactory {
    /// Create a frame source from capture configuration
    pub fn create(config: &CaptureConfig) -> Result<Box<dyn FrameSource>> {
        match config.source.as_str() {
            "http" => {
                let url = config
                    .snapshot_url
                    .clone()
                    .context("capture.source = \"http\" requires capture.snapshot_url")?;
                Ok(Box::new(HttpSnapshotSource::new(url)?))
            }
            "dir" => {
                let dir = config
                    .snapshot_dir
                    .clone()
                    .context("capture.source = \"dir\" requires capture.snapshot_dir")?;
                Ok(Box::new(DirSnapshotSource::new(PathBuf::from(dir))))
            }
            other => bail!("Unknown capture source: {}", other),
        }
    }
}

/// Fetches stills from a webcam snapshot URL
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build snapshot HTTP client")?;

        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl FrameSource for HttpSnapshotSource {
    async fn capture(&self) -> Result<Option<Frame>> {
        let response = match self.client.get(&self.url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Snapshot request failed: {}", e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            warn!("Snapshot endpoint returned {}", response.status());
            return Ok(None);
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .context("Failed to read snapshot body")?;

        if bytes.is_empty() {
            warn!("Snapshot endpoint returned an empty body");
            return Ok(None);
        }

        Ok(Some(Frame {
            bytes: bytes.to_vec(),
            mime_type,
        }))
    }

    fn name(&self) -> &str {
        "http-snapshot"
    }
}

/// Reads the newest image file from a watched directory
pub struct DirSnapshotSource {
    dir: PathBuf,
}

impl DirSnapshotSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn mime_for(path: &std::path::Path) -> Option<&'static str> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jpg") | Some("jpeg") => Some("image/jpeg"),
            Some("png") => Some("image/png"),
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl FrameSource for DirSnapshotSource {
    async fn capture(&self) -> Result<Option<Frame>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(e) => e,
            Err(e) => {
                warn!("Cannot read snapshot directory {:?}: {}", self.dir, e);
                return Ok(None);
            }
        };

        let mut newest: Option<(std::time::SystemTime, PathBuf, &'static str)> = None;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(mime) = Self::mime_for(&path) else {
                continue;
            };
            let modified = entry.metadata().await?.modified()?;
            if newest.as_ref().map_or(true, |(t, _, _)| modified > *t) {
                newest = Some((modified, path, mime));
            }
        }

        let Some((_, path, mime)) = newest else {
            return Ok(None);
        };

        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read snapshot {:?}", path))?;

        Ok(Some(Frame {
            bytes,
            mime_type: mime.to_string(),
        }))
    }

    fn name(&self) -> &str {
        "dir-snapshot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dir_source_returns_none_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSnapshotSource::new(dir.path().to_path_buf());

        let frame = source.capture().await.unwrap();
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn dir_source_picks_newest_image() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.jpg");
        let new = dir.path().join("new.jpg");

        std::fs::write(&old, b"old-frame").unwrap();
        // Ensure a distinct mtime for the newer file
        let later = std::time::SystemTime::now() + Duration::from_secs(5);
        std::fs::write(&new, b"new-frame").unwrap();
        let file = std::fs::File::options().write(true).open(&new).unwrap();
        file.set_modified(later).unwrap();

        let source = DirSnapshotSource::new(dir.path().to_path_buf());
        let frame = source.capture().await.unwrap().unwrap();

        assert_eq!(frame.bytes, b"new-frame");
        assert_eq!(frame.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn dir_source_ignores_non_image_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let source = DirSnapshotSource::new(dir.path().to_path_buf());
        assert!(source.capture().await.unwrap().is_none());
    }

    #[test]
    fn factory_rejects_unknown_source() {
        let config = CaptureConfig {
            source: "carrier-pigeon".to_string(),
            snapshot_url: None,
            snapshot_dir: None,
            analysis_interval_ms: 2000,
        };

        assert!(FrameSourceFactory::create(&config).is_err());
    }

    #[test]
    fn factory_requires_url_for_http_source() {
        let config = CaptureConfig {
            source: "http".to_string(),
            snapshot_url: None,
            snapshot_dir: None,
            analysis_interval_ms: 2000,
        };

        assert!(FrameSourceFactory::create(&config).is_err());
    }
}
