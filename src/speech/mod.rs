//! Speech synthesis and playback
//!
//! The coordinator serializes utterances: one plays at a time, later ones
//! queue in FIFO order, and `stop` discards everything immediately. The
//! scheduler awaits `speak` so a new frame is never captured while the
//! assistant is mid-utterance.

mod coordinator;
mod sink;
mod synth;
mod voice;

pub use coordinator::SpeechCoordinator;
pub use sink::{AudioSink, SilentSink};
pub use synth::{GoogleTts, SpeechSynthesizer};
pub use voice::{VoiceConfig, VoiceLocale};

#[cfg(feature = "audio")]
pub use sink::RodioSink;
