//! The analysis loop
//!
//! One scheduler task owns all mutable session state. Every interval it
//! captures a frame, asks the vision provider what it sees, applies the
//! observation to the active checklist, and speaks feedback. At most one
//! analysis is in flight at a time, and ticks that land while audio is
//! playing are dropped, not queued. External callers interact through a
//! `SessionHandle`: commands go in over a channel, state comes out as
//! snapshots of a shared view.

use super::config::SessionConfig;
use super::recorder::SessionRecorder;
use super::stats::SessionStats;
use crate::capture::{Frame, FrameSource};
use crate::checklist::{Checklist, ChecklistItem, HistoryPolicy, MatchMode};
use crate::phase::{Phase, PhaseMachine, PhaseTransition};
use crate::speech::{SpeechCoordinator, VoiceLocale};
use crate::transcript;
use crate::vision::{prompt, GenerationProfile, VisionProvider};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

const GREETING: &str = "Hello! I'm ready to help you cook!";
const NEW_VOICE_GREETING: &str = "Hello! I'm your new cooking assistant!";
const TROUBLE_SEEING: &str =
    "I had trouble seeing what you're doing. Please make sure everything is visible.";
const NO_FRAME: &str = "Hello! I'm your cooking assistant. Let me see what you're cooking!";

/// Commands accepted by a running session
#[derive(Debug, Clone)]
pub enum SessionCommand {
    SetLocale(VoiceLocale),
}

/// Read-only snapshot of session state, published after every change
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: Phase,
    pub locale: VoiceLocale,
    pub ingredients: Vec<ChecklistItem>,
    pub steps: Vec<ChecklistItem>,
    /// Latest raw provider reply, or a status message
    pub analysis: String,
    pub speaking: bool,
    /// Present once the session has completed
    pub stats: Option<SessionStats>,
}

/// Caller-side handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    view: Arc<RwLock<SessionView>>,
}

impl SessionHandle {
    pub async fn snapshot(&self) -> SessionView {
        self.view.read().await.clone()
    }

    pub async fn set_locale(&self, locale: VoiceLocale) -> Result<()> {
        self.commands
            .send(SessionCommand::SetLocale(locale))
            .await
            .context("Session is no longer running")
    }
}

pub struct AnalysisScheduler {
    config: SessionConfig,
    frames: Arc<dyn FrameSource>,
    vision: Arc<dyn VisionProvider>,
    speech: Arc<SpeechCoordinator>,
    recorder: SessionRecorder,

    ingredients: Checklist,
    steps: Checklist,
    phases: PhaseMachine,
    locale: VoiceLocale,
    analysis: String,
    last_spoken_ingredient: Option<String>,
    analysis_in_progress: bool,
    start_time: DateTime<Utc>,
    stats: Option<SessionStats>,

    commands: mpsc::Receiver<SessionCommand>,
    view: Arc<RwLock<SessionView>>,
}

impl AnalysisScheduler {
    pub fn new(
        config: SessionConfig,
        frames: Arc<dyn FrameSource>,
        vision: Arc<dyn VisionProvider>,
        speech: Arc<SpeechCoordinator>,
        recorder: SessionRecorder,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::channel(8);

        let ingredients = Checklist::new(&config.ingredients);
        let steps = Checklist::new(&config.steps);
        let locale = config.locale;

        let view = Arc::new(RwLock::new(SessionView {
            session_id: config.session_id.clone(),
            phase: Phase::Preparation,
            locale,
            ingredients: ingredients.items().to_vec(),
            steps: steps.items().to_vec(),
            analysis: String::new(),
            speaking: false,
            stats: None,
        }));

        let handle = SessionHandle {
            commands: tx,
            view: Arc::clone(&view),
        };

        let scheduler = Self {
            config,
            frames,
            vision,
            speech,
            recorder,
            ingredients,
            steps,
            phases: PhaseMachine::new(),
            locale,
            analysis: String::new(),
            last_spoken_ingredient: None,
            analysis_in_progress: false,
            start_time: Utc::now(),
            stats: None,
            commands: rx,
            view,
        };

        (scheduler, handle)
    }

    /// Drive the session to completion. Returns when every step is done or
    /// when all handles to the session have been dropped.
    pub async fn run(mut self) {
        info!(
            "Session {} started ({} ingredients, {} steps)",
            self.config.session_id,
            self.ingredients.len(),
            self.steps.len()
        );

        self.start_time = Utc::now();
        self.publish().await;
        self.say(GREETING.to_string()).await;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::SetLocale(locale)) => self.switch_locale(locale).await,
                    None => {
                        info!("Session {} abandoned; stopping", self.config.session_id);
                        break;
                    }
                },
                _ = tokio::time::sleep(self.config.analysis_interval) => {
                    // Ticks during playback or an in-flight analysis are
                    // dropped so cycles never pile up behind each other
                    if self.speech.is_speaking() || self.analysis_in_progress {
                        continue;
                    }
                    if self.run_cycle().await {
                        break;
                    }
                }
            }
        }

        info!("Session {} loop ended", self.config.session_id);
    }

    /// One capture-analyze-track-speak cycle. Returns true once the
    /// session has completed.
    async fn run_cycle(&mut self) -> bool {
        self.analysis_in_progress = true;
        let result = self.cycle().await;
        self.analysis_in_progress = false;

        let done = match result {
            Ok(done) => done,
            Err(e) => {
                warn!("Analysis cycle failed: {}", e);
                self.analysis = TROUBLE_SEEING.to_string();
                false
            }
        };

        self.publish().await;
        done
    }

    async fn cycle(&mut self) -> Result<bool> {
        let frame = match self.frames.capture().await? {
            Some(frame) => frame,
            None => {
                warn!("No frame available from source '{}'", self.frames.name());
                self.analysis = NO_FRAME.to_string();
                return Ok(false);
            }
        };

        match self.phases.phase() {
            Phase::Preparation => self.analyze_preparation(&frame).await?,
            Phase::Cooking => self.analyze_cooking(&frame).await?,
            Phase::Completed => return Ok(true),
        }

        self.handle_transition().await
    }

    async fn analyze_preparation(&mut self, frame: &Frame) -> Result<()> {
        let prompt = prompt::ingredient_prompt(&self.ingredients);
        let reply = self
            .vision
            .analyze(frame, &prompt, GenerationProfile::INGREDIENTS)
            .await?;

        let sections = match transcript::parse(&reply) {
            Some(sections) => sections,
            None => {
                info!("Reply had no observation section; keeping checklist state");
                return Ok(());
            }
        };
        self.analysis = reply.trim().to_string();

        // Fresh means never observed before in this phase, which is
        // stricter than newly-completed: an item re-shown after being
        // checked off must not be announced again
        let fresh: Vec<String> = sections
            .seen_items
            .iter()
            .filter(|item| !self.ingredients.seen().contains(item))
            .cloned()
            .collect();

        self.ingredients.apply_observation(
            &sections.seen_items,
            MatchMode::Exact,
            HistoryPolicy::RecordObserved,
        );

        if let Some(first) = fresh.first() {
            if self.last_spoken_ingredient.as_deref() != Some(first.as_str()) {
                self.last_spoken_ingredient = Some(first.clone());

                let mut message = format!("Great! I see the {}.", first);
                if let Some(next) = self.ingredients.next_incomplete() {
                    message.push_str(&format!(" Next, please show me the {}.", next.text));
                } else if !self.ingredients.all_ready() {
                    message.push_str(" Please show me the remaining ingredients.");
                }

                self.say(message).await;
            }
        }

        Ok(())
    }

    async fn analyze_cooking(&mut self, frame: &Frame) -> Result<()> {
        let current = match self.steps.next_incomplete() {
            Some(step) => step.text.clone(),
            None => return Ok(()),
        };
        let following = self.steps.following_incomplete().map(|s| s.text.clone());

        let prompt = prompt::step_prompt(Some(&current), following.as_deref(), &self.steps);
        let reply = self
            .vision
            .analyze(frame, &prompt, GenerationProfile::STEPS)
            .await?;

        let sections = match transcript::parse(&reply) {
            Some(sections) => sections,
            None => {
                info!("Reply had no observation section; keeping checklist state");
                return Ok(());
            }
        };
        self.analysis = reply.trim().to_string();

        let newly_completed = self.steps.apply_observation(
            &sections.seen_items,
            MatchMode::Exact,
            HistoryPolicy::RecordCompleted,
        );

        // Feedback is spoken only when a step actually completed; a cycle
        // that observes nothing new stays silent
        if !newly_completed.is_empty() {
            for step in &newly_completed {
                info!("Step completed: {}", step.text);
            }
            if let Some(text) = sections.spoken_text {
                self.say(text).await;
            }
        }

        Ok(())
    }

    async fn handle_transition(&mut self) -> Result<bool> {
        match self.phases.evaluate(&self.ingredients, &self.steps) {
            Some(PhaseTransition::BeginCooking { announcement }) => {
                info!("All ingredients ready; starting the cooking phase");

                self.speech.stop();
                self.steps.reset_history();
                self.last_spoken_ingredient = None;
                self.analysis = announcement.clone();
                self.publish().await;

                self.say(announcement).await;
                self.phases.finish_transition();
                Ok(false)
            }
            Some(PhaseTransition::Complete) => {
                info!("All steps completed; finalizing session");

                let end_time = Utc::now();
                self.speech.stop();

                let final_frame = match self.frames.capture().await {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Could not capture final photo: {}", e);
                        None
                    }
                };

                let (stats, record) = self.recorder.finalize(
                    &self.config,
                    &self.steps,
                    self.start_time,
                    end_time,
                );
                self.stats = Some(stats);
                self.publish().await;

                self.recorder.persist(record, final_frame).await;
                self.phases.finish_transition();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn switch_locale(&mut self, locale: VoiceLocale) {
        self.speech.set_voice(locale).await;
        self.locale = locale;
        self.analysis.clear();
        self.publish().await;
        self.say(NEW_VOICE_GREETING.to_string()).await;
    }

    async fn say(&self, text: String) {
        if let Err(e) = self.speech.speak(text).await {
            warn!("Speech failed: {}", e);
        }
    }

    async fn publish(&self) {
        let mut view = self.view.write().await;
        view.phase = self.phases.phase();
        view.locale = self.locale;
        view.ingredients = self.ingredients.items().to_vec();
        view.steps = self.steps.items().to_vec();
        view.analysis = self.analysis.clone();
        view.speaking = self.speech.is_speaking();
        view.stats = self.stats.clone();
    }
}
