//! Speech synthesizer seam

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

/// Speech synthesis errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech engine unavailable")]
    Unavailable,

    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

/// How a phrase is queued relative to speech already in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueMode {
    /// Drop anything pending and speak now
    Flush,
    /// Speak after pending utterances
    Enqueue,
}

/// Text-to-speech engine.
///
/// Implementations are expected to serialize overlapping requests internally.
pub trait Synthesizer: Send + Sync {
    fn speak(&self, phrase: &str, mode: QueueMode) -> Result<(), SpeechError>;
}

/// Synthesizer that only logs what would be spoken
#[derive(Debug, Default)]
pub struct LogSynthesizer;

impl Synthesizer for LogSynthesizer {
    fn speak(&self, phrase: &str, mode: QueueMode) -> Result<(), SpeechError> {
        info!(target: "speech", "speak({:?}): {}", mode, phrase);
        Ok(())
    }
}

/// One captured `speak` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub phrase: String,
    pub mode: QueueMode,
}

/// In-memory synthesizer that records every call, optionally failing them
#[derive(Debug, Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<Utterance>>,
    fail_with: Option<SpeechError>,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesizer whose every call fails with `error` (calls are still recorded)
    pub fn failing(error: SpeechError) -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            fail_with: Some(error),
        }
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.spoken
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn phrases(&self) -> Vec<String> {
        self.utterances().into_iter().map(|u| u.phrase).collect()
    }

    pub fn clear(&self) {
        self.spoken
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Synthesizer for RecordingSynthesizer {
    fn speak(&self, phrase: &str, mode: QueueMode) -> Result<(), SpeechError> {
        self.spoken
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Utterance {
                phrase: phrase.to_string(),
                mode,
            });
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
