//! Audio playback sinks
//!
//! `play` resolves when playback has finished (or was stopped). The rodio
//! sink is feature-gated because it pulls in cpal and ALSA; headless
//! deployments and tests use `SilentSink`, which logs the utterance and
//! simulates playback time.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::info;

/// Plays decoded audio to completion
#[async_trait::async_trait]
pub trait AudioSink: Send + Sync {
    /// Play the audio and wait until it ends or `stop` is called
    async fn play(&self, audio: Vec<u8>) -> Result<()>;

    /// Halt playback immediately
    fn stop(&self);
}

/// Headless sink: no device output, playback time simulated from payload size
pub struct SilentSink {
    cancel: Arc<Notify>,
}

impl SilentSink {
    pub fn new() -> Self {
        Self {
            cancel: Arc::new(Notify::new()),
        }
    }

    fn playback_duration(audio_len: usize) -> Duration {
        // Rough MP3 estimate at 32 kbit/s, bounded so tests stay fast
        Duration::from_millis(((audio_len as u64) / 4).clamp(50, 10_000))
    }
}

impl Default for SilentSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AudioSink for SilentSink {
    async fn play(&self, audio: Vec<u8>) -> Result<()> {
        info!("Silent sink: simulating playback of {} bytes", audio.len());
        tokio::select! {
            _ = tokio::time::sleep(Self::playback_duration(audio.len())) => {}
            _ = self.cancel.notified() => {}
        }
        Ok(())
    }

    fn stop(&self) {
        self.cancel.notify_waiters();
    }
}

#[cfg(feature = "audio")]
pub use rodio_sink::RodioSink;

#[cfg(feature = "audio")]
mod rodio_sink {
    use super::AudioSink;
    use anyhow::{Context, Result};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use tracing::{error, warn};

    struct PlayRequest {
        audio: Vec<u8>,
        done: tokio::sync::oneshot::Sender<Result<()>>,
    }

    /// Speaker output via rodio. Owns the output stream on a dedicated
    /// thread because cpal streams are not `Send`.
    pub struct RodioSink {
        tx: std::sync::mpsc::Sender<PlayRequest>,
        current: Arc<Mutex<Option<Arc<rodio::Sink>>>>,
    }

    impl RodioSink {
        pub fn new() -> Result<Self> {
            let (tx, rx) = std::sync::mpsc::channel::<PlayRequest>();
            let current: Arc<Mutex<Option<Arc<rodio::Sink>>>> = Arc::new(Mutex::new(None));
            let slot = Arc::clone(&current);

            std::thread::Builder::new()
                .name("audio-playback".to_string())
                .spawn(move || {
                    let stream = match rodio::OutputStreamBuilder::open_default_stream() {
                        Ok(s) => s,
                        Err(e) => {
                            error!("Failed to open audio output: {}", e);
                            return;
                        }
                    };

                    while let Ok(request) = rx.recv() {
                        let result = (|| -> Result<()> {
                            let sink = Arc::new(rodio::Sink::connect_new(stream.mixer()));
                            let source = rodio::Decoder::new(Cursor::new(request.audio))
                                .context("Failed to decode audio payload")?;
                            sink.append(source);

                            if let Ok(mut guard) = slot.lock() {
                                *guard = Some(Arc::clone(&sink));
                            }
                            sink.sleep_until_end();
                            if let Ok(mut guard) = slot.lock() {
                                *guard = None;
                            }
                            Ok(())
                        })();

                        if request.done.send(result).is_err() {
                            warn!("Playback finished but the caller went away");
                        }
                    }
                })
                .context("Failed to spawn audio playback thread")?;

            Ok(Self { tx, current })
        }
    }

    #[async_trait::async_trait]
    impl AudioSink for RodioSink {
        async fn play(&self, audio: Vec<u8>) -> Result<()> {
            let (done, rx) = tokio::sync::oneshot::channel();
            self.tx
                .send(PlayRequest { audio, done })
                .context("Audio playback thread is gone")?;
            rx.await.context("Audio playback thread dropped the request")?
        }

        fn stop(&self) {
            if let Ok(guard) = self.current.lock() {
                if let Some(sink) = guard.as_ref() {
                    sink.stop();
                }
            }
        }
    }
}
