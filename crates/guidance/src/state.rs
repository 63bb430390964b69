//! Guidance state machine: flags to throttled announcements

use announcer::{AnnouncementThrottle, QueueMode, Synthesizer, TriggerOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::config::{GuidanceConfig, GuidanceMode};
use crate::phrase::{select_phrases, Phrase};
use crate::zone::GuidanceFlags;

/// Announcement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidanceState {
    Idle,
    /// A cooldown window is open; new requests are dropped
    Announcing,
}

/// What happened to an announcement request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "phrases", rename_all = "lowercase")]
pub enum AnnouncementOutcome {
    /// Flags warranted no phrase
    Silent,
    /// Phrases were handed to the synthesizer
    Announced(Vec<Phrase>),
    /// A cooldown was active
    Dropped,
}

/// Decides what to say and gates it through the throttle
pub struct GuidanceStateMachine {
    throttle: AnnouncementThrottle,
    synthesizer: Arc<dyn Synthesizer>,
    direction_cooldown: Duration,
    threat_cooldown: Duration,
}

impl GuidanceStateMachine {
    pub fn new(config: &GuidanceConfig, synthesizer: Arc<dyn Synthesizer>, runtime: Handle) -> Self {
        Self {
            throttle: AnnouncementThrottle::new(runtime),
            synthesizer,
            direction_cooldown: config.cooldown(GuidanceMode::Direction),
            threat_cooldown: config.cooldown(GuidanceMode::Threat),
        }
    }

    pub fn cooldown(&self, mode: GuidanceMode) -> Duration {
        match mode {
            GuidanceMode::Direction => self.direction_cooldown,
            GuidanceMode::Threat => self.threat_cooldown,
        }
    }

    /// Request an announcement for `flags`
    pub fn request(&self, flags: &GuidanceFlags) -> AnnouncementOutcome {
        let phrases = select_phrases(flags);
        if phrases.is_empty() {
            return AnnouncementOutcome::Silent;
        }

        let cooldown = self.cooldown(flags.mode());
        match self.throttle.trigger(cooldown, || self.speak_all(&phrases)) {
            TriggerOutcome::Accepted => {
                info!("Announced: {:?}", phrases);
                AnnouncementOutcome::Announced(phrases)
            }
            TriggerOutcome::Dropped => {
                debug!("Announcement {:?} dropped", phrases);
                AnnouncementOutcome::Dropped
            }
        }
    }

    fn speak_all(&self, phrases: &[Phrase]) {
        for phrase in phrases {
            if let Err(e) = self.synthesizer.speak(phrase.text(), QueueMode::Flush) {
                warn!("Speech failed for '{}': {}", phrase, e);
            }
        }
    }

    pub fn state(&self) -> GuidanceState {
        if self.throttle.is_busy() {
            GuidanceState::Announcing
        } else {
            GuidanceState::Idle
        }
    }

    /// Resolve once no cooldown window is open
    pub async fn wait_idle(&self) {
        self.throttle.wait_idle().await
    }

    /// End any open cooldown window
    pub fn cancel(&self) -> bool {
        self.throttle.cancel()
    }
}
