//! Utterance serialization
//!
//! One utterance plays at a time. `speak` called while playing enqueues the
//! text; the playing call drains the queue in FIFO order before returning.
//! `stop` halts playback and discards the queue. A stop generation counter
//! makes sure audio synthesized before a stop is never played after it.

use super::sink::AudioSink;
use super::synth::SpeechSynthesizer;
use super::voice::{VoiceConfig, VoiceLocale};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Settle time between stopping audio and applying a new voice
const VOICE_CHANGE_SETTLE: Duration = Duration::from_millis(100);

pub struct SpeechCoordinator {
    synth: Arc<dyn SpeechSynthesizer>,
    sink: Arc<dyn AudioSink>,
    voice: Mutex<VoiceConfig>,
    queue: Mutex<VecDeque<String>>,
    speaking: AtomicBool,
    stop_generation: AtomicU64,
}

impl SpeechCoordinator {
    pub fn new(
        synth: Arc<dyn SpeechSynthesizer>,
        sink: Arc<dyn AudioSink>,
        locale: VoiceLocale,
    ) -> Self {
        Self {
            synth,
            sink,
            voice: Mutex::new(locale.voice_config()),
            queue: Mutex::new(VecDeque::new()),
            speaking: AtomicBool::new(false),
            stop_generation: AtomicU64::new(0),
        }
    }

    /// True while an utterance is playing or queued texts are draining
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Speak the text, or enqueue it if an utterance is already playing.
    ///
    /// When this call takes ownership of playback it resolves only once the
    /// text and everything queued behind it have finished (or were stopped).
    pub async fn speak(&self, text: String) -> Result<()> {
        if self.speaking.swap(true, Ordering::SeqCst) {
            self.enqueue(text);
            return Ok(());
        }

        let result = self.drain_from(text).await;
        self.speaking.store(false, Ordering::SeqCst);
        result
    }

    async fn drain_from(&self, first: String) -> Result<()> {
        let mut next = Some(first);

        while let Some(text) = next.take() {
            let generation = self.stop_generation.load(Ordering::SeqCst);
            let voice = self.current_voice();

            match self.synth.synthesize(&text, &voice).await {
                Ok(audio) => {
                    // A stop while synthesizing invalidates this utterance
                    if self.stop_generation.load(Ordering::SeqCst) != generation {
                        info!("Discarding utterance synthesized before stop");
                        break;
                    }
                    if let Err(e) = self.sink.play(audio).await {
                        warn!("Audio playback failed: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    warn!("Speech synthesis failed: {}", e);
                    break;
                }
            }

            next = self.pop();
        }

        Ok(())
    }

    /// Halt playback immediately and discard all queued utterances
    pub fn stop(&self) {
        self.stop_generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queue) = self.queue.lock() {
            queue.clear();
        }
        self.sink.stop();
        self.speaking.store(false, Ordering::SeqCst);
    }

    /// Switch voices: stop everything, let the hardware settle, apply the
    /// new configuration. The caller is expected to speak a greeting next.
    pub async fn set_voice(&self, locale: VoiceLocale) {
        info!("Switching voice to {}", locale);
        self.stop();
        tokio::time::sleep(VOICE_CHANGE_SETTLE).await;
        if let Ok(mut voice) = self.voice.lock() {
            *voice = locale.voice_config();
        }
    }

    fn current_voice(&self) -> VoiceConfig {
        self.voice
            .lock()
            .map(|v| v.clone())
            .unwrap_or_else(|p| p.into_inner().clone())
    }

    fn enqueue(&self, text: String) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(text);
        }
    }

    fn pop(&self) -> Option<String> {
        self.queue.lock().ok().and_then(|mut q| q.pop_front())
    }
}
