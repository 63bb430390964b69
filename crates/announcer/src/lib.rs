//! Announcement System
//!
//! Provides the speech synthesizer seam and a single-flight throttle that
//! keeps spoken guidance from overlapping.

mod synthesizer;
mod throttle;

pub use synthesizer::{LogSynthesizer, QueueMode, RecordingSynthesizer, SpeechError, Synthesizer, Utterance};
pub use throttle::{AnnouncementThrottle, ThrottleStats, TriggerOutcome};
