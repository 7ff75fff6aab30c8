pub mod capture;
pub mod checklist;
pub mod config;
pub mod http;
pub mod phase;
pub mod session;
pub mod speech;
pub mod storage;
pub mod transcript;
pub mod vision;

pub use capture::{Frame, FrameSource, FrameSourceFactory};
pub use checklist::{Checklist, ChecklistItem, HistoryPolicy, MatchMode, SeenHistory};
pub use config::Config;
pub use http::{create_router, AppState};
pub use phase::{Phase, PhaseMachine, PhaseTransition};
pub use session::{
    AnalysisScheduler, SessionConfig, SessionHandle, SessionRecorder, SessionStats, SessionView,
};
pub use speech::{SpeechCoordinator, VoiceLocale};
pub use storage::{CompletionRecord, PersistenceSink, SavedCompletion};
pub use vision::{GenerationProfile, VisionProvider};
