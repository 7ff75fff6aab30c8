// Integration tests for the analysis scheduler
//
// These drive a full session through fake vision, capture, and speech
// backends and assert on the published view, the spoken feedback, and the
// stored completion.

use anyhow::Result;
use souschef::capture::{Frame, FrameSource};
use souschef::phase::Phase;
use souschef::session::{AnalysisScheduler, SessionConfig, SessionHandle, SessionRecorder, SessionView};
use souschef::speech::{AudioSink, SpeechCoordinator, SpeechSynthesizer, VoiceConfig, VoiceLocale};
use souschef::storage::{CompletionRecord, PersistenceSink, SavedCompletion};
use souschef::vision::{GenerationProfile, VisionProvider};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

// ============================================================================
// Test doubles
// ============================================================================

struct StaticFrames;

#[async_trait::async_trait]
impl FrameSource for StaticFrames {
    async fn capture(&self) -> Result<Option<Frame>> {
        Ok(Some(Frame {
            bytes: vec![0xFF, 0xD8, 0xFF],
            mime_type: "image/jpeg".to_string(),
        }))
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Replays a fixed script of replies, then keeps answering with a reply
/// that carries no observation section. Records every prompt it was given.
struct ScriptedVision {
    script: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl ScriptedVision {
    fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl VisionProvider for ScriptedVision {
    async fn analyze(
        &self,
        _frame: &Frame,
        prompt: &str,
        _profile: GenerationProfile,
    ) -> Result<String> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.prompts.lock().unwrap().push(prompt.to_string());

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => anyhow::bail!("{}", message),
            None => Ok("Nothing new to report.".to_string()),
        }
    }
}

/// Synthesizer double that records each utterance with the voice it used
struct RecordingSynth {
    spoken: Mutex<Vec<(String, String)>>,
}

impl RecordingSynth {
    fn new() -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
        }
    }

    fn utterances(&self) -> Vec<String> {
        self.spoken.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    fn voices(&self) -> Vec<String> {
        self.spoken.lock().unwrap().iter().map(|(_, v)| v.clone()).collect()
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for RecordingSynth {
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), voice.name.to_string()));
        Ok(text.as_bytes().to_vec())
    }
}

struct InstantSink;

#[async_trait::async_trait]
impl AudioSink for InstantSink {
    async fn play(&self, _audio: Vec<u8>) -> Result<()> {
        Ok(())
    }

    fn stop(&self) {}
}

struct MemoryStore {
    saved: Mutex<Vec<CompletionRecord>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl PersistenceSink for MemoryStore {
    async fn save_completion(
        &self,
        record: CompletionRecord,
        _image: Option<Frame>,
    ) -> Result<SavedCompletion> {
        self.saved.lock().unwrap().push(record.clone());
        Ok(SavedCompletion {
            id: Some("test-row".to_string()),
            created_at: None,
            record,
        })
    }

    async fn list_completions(&self) -> Result<Vec<SavedCompletion>> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Session {
    handle: SessionHandle,
    task: JoinHandle<()>,
    synth: Arc<RecordingSynth>,
    store: Arc<MemoryStore>,
    vision: Arc<ScriptedVision>,
}

fn start_session(
    ingredients: &[&str],
    steps: &[&str],
    vision: ScriptedVision,
) -> Session {
    let config = SessionConfig {
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        steps: steps.iter().map(|s| s.to_string()).collect(),
        analysis_interval: Duration::from_millis(20),
        locale: VoiceLocale::EnUs,
        ..SessionConfig::default()
    };

    let synth = Arc::new(RecordingSynth::new());
    let store = Arc::new(MemoryStore::new());
    let vision = Arc::new(vision);

    let speech = Arc::new(SpeechCoordinator::new(
        Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>,
        Arc::new(InstantSink),
        config.locale,
    ));
    let recorder = SessionRecorder::new(Arc::clone(&store) as Arc<dyn PersistenceSink>);

    let (scheduler, handle) = AnalysisScheduler::new(
        config,
        Arc::new(StaticFrames),
        Arc::clone(&vision) as Arc<dyn VisionProvider>,
        speech,
        recorder,
    );

    let task = tokio::spawn(scheduler.run());

    Session {
        handle,
        task,
        synth,
        store,
        vision,
    }
}

async fn wait_for(handle: &SessionHandle, check: impl Fn(&SessionView) -> bool) -> SessionView {
    timeout(Duration::from_secs(5), async {
        loop {
            let view = handle.snapshot().await;
            if check(&view) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time")
}

fn reply(seen: &[&str], say: &str) -> Result<String, String> {
    let seen_block = seen
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(format!("I saw: earlier items\nI see:\n{}\nI say: {}", seen_block, say))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_session_runs_to_completion() {
    let vision = ScriptedVision::new(vec![
        reply(&["3 fresh eggs"], "Found the eggs"),
        reply(&["Bake the mixture"], "Nice baking"),
    ]);
    let session = start_session(&["3 fresh eggs"], &["Bake the mixture"], vision);

    let view = session.handle.snapshot().await;
    assert_eq!(view.phase, Phase::Preparation);

    let view = wait_for(&session.handle, |v| v.phase == Phase::Completed).await;

    let stats = view.stats.expect("completed session publishes stats");
    assert_eq!(stats.steps_completed, 1);
    assert_eq!(stats.completion_rate, 100);
    assert!(stats.end_time > stats.start_time);
    assert!(view.ingredients.iter().all(|i| i.completed));
    assert!(view.steps.iter().all(|s| s.completed));

    session.task.await.unwrap();

    let saved = session.store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].completion_rate, 100);
    assert_eq!(saved[0].steps, vec!["Bake the mixture"]);

    let utterances = session.synth.utterances();
    assert_eq!(utterances[0], "Hello! I'm ready to help you cook!");
    assert!(utterances.contains(&"Great! I see the 3 fresh eggs.".to_string()));
    assert!(utterances.iter().any(|u| u.starts_with(
        "Great! You have all the ingredients ready. Let's start cooking!"
    )));
    assert!(utterances.contains(&"Nice baking".to_string()));

    // The cooking phase starts with an empty step history
    let prompts = session.vision.prompts();
    assert!(prompts[1].contains("Starting the recipe phase."));
}

#[tokio::test]
async fn test_preparation_feedback_names_next_ingredient() {
    let vision = ScriptedVision::new(vec![reply(&["3 fresh eggs"], "One down")]);
    let session = start_session(&["3 fresh eggs", "1 cup milk"], &["bake"], vision);

    let view = wait_for(&session.handle, |v| {
        v.ingredients.iter().any(|i| i.completed)
    })
    .await;
    assert_eq!(view.phase, Phase::Preparation);
    assert!(!view.ingredients[1].completed);

    let utterances = session.synth.utterances();
    assert!(utterances.contains(
        &"Great! I see the 3 fresh eggs. Next, please show me the 1 cup milk.".to_string()
    ));

    // The next prompt carries the item in its seen-history block
    let _ = wait_for(&session.handle, |_| session.vision.prompts().len() >= 2).await;
    let prompts = session.vision.prompts();
    assert!(prompts[0].contains("This is my first observation."));
    assert!(prompts[1].contains("Previously seen ingredients:\n- 3 fresh eggs"));

    drop(session.handle);
    session.task.await.unwrap();
}

#[tokio::test]
async fn test_reply_without_observation_changes_nothing() {
    let vision = ScriptedVision::new(vec![
        Ok("The kitchen looks busy today.".to_string()),
        Ok("Still watching.".to_string()),
    ]);
    let session = start_session(&["3 fresh eggs"], &["bake"], vision);

    let _ = wait_for(&session.handle, |_| session.vision.prompts().len() >= 2).await;

    let view = session.handle.snapshot().await;
    assert_eq!(view.phase, Phase::Preparation);
    assert!(view.ingredients.iter().all(|i| !i.completed));

    // No feedback beyond the greeting
    assert_eq!(session.synth.utterances().len(), 1);

    drop(session.handle);
    session.task.await.unwrap();
}

#[tokio::test]
async fn test_provider_failure_reports_trouble_and_recovers() {
    let vision = ScriptedVision::new(vec![
        Err("model overloaded".to_string()),
        Err("model overloaded".to_string()),
        Err("model overloaded".to_string()),
        reply(&["3 fresh eggs"], "Back online"),
    ]);
    let session = start_session(&["3 fresh eggs"], &["bake"], vision);

    let view = wait_for(&session.handle, |v| !v.analysis.is_empty()).await;
    assert_eq!(
        view.analysis,
        "I had trouble seeing what you're doing. Please make sure everything is visible."
    );
    assert_eq!(view.phase, Phase::Preparation);

    // The next cycle proceeds normally
    let view = wait_for(&session.handle, |v| v.ingredients[0].completed).await;
    assert_ne!(view.phase, Phase::Preparation);

    drop(session.handle);
    session.task.await.unwrap();
}

#[tokio::test]
async fn test_locale_switch_greets_in_new_voice() {
    let vision = ScriptedVision::new(vec![]);
    let session = start_session(&["3 fresh eggs"], &["bake"], vision);

    let _ = wait_for(&session.handle, |_| {
        !session.synth.utterances().is_empty()
    })
    .await;

    session.handle.set_locale(VoiceLocale::ItIt).await.unwrap();

    let view = wait_for(&session.handle, |v| v.locale == VoiceLocale::ItIt).await;
    assert!(view.analysis.is_empty());

    let _ = wait_for(&session.handle, |_| {
        session
            .synth
            .utterances()
            .contains(&"Hello! I'm your new cooking assistant!".to_string())
    })
    .await;

    let spoken = session.synth.spoken.lock().unwrap().clone();
    let (_, voice) = spoken.last().unwrap();
    assert_eq!(voice, "it-IT-Standard-A");

    drop(session.handle);
    session.task.await.unwrap();
}

#[tokio::test]
async fn test_analyses_never_overlap() {
    let vision =
        ScriptedVision::new(vec![]).with_delay(Duration::from_millis(60));
    let session = start_session(&["3 fresh eggs"], &["bake"], vision);

    let _ = wait_for(&session.handle, |_| session.vision.prompts().len() >= 4).await;

    assert_eq!(session.vision.max_in_flight.load(Ordering::SeqCst), 1);

    drop(session.handle);
    session.task.await.unwrap();
}
