//! Spoken guidance phrases

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::zone::GuidanceFlags;

/// A phrase the synthesizer can speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phrase {
    SlightlyRight,
    SlightlyLeft,
    InFront,
    ThreatInFront,
    GoRight,
    GoLeft,
}

impl Phrase {
    pub fn text(&self) -> &'static str {
        match self {
            Phrase::SlightlyRight => "it is little bit to right",
            Phrase::SlightlyLeft => "it is little bit to left",
            Phrase::InFront => "it is in front of you",
            Phrase::ThreatInFront => "threat in front of you",
            Phrase::GoRight => "go right",
            Phrase::GoLeft => "go left",
        }
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Phrases warranted by `flags`, in speaking order
pub fn select_phrases(flags: &GuidanceFlags) -> Vec<Phrase> {
    match flags {
        GuidanceFlags::Direction(d) => {
            let phrase = if d.object_is_right {
                Phrase::SlightlyRight
            } else if d.object_is_left {
                Phrase::SlightlyLeft
            } else {
                Phrase::InFront
            };
            vec![phrase]
        }
        GuidanceFlags::Threat(t) => {
            let mut phrases = Vec::new();
            if !t.threat_present {
                return phrases;
            }
            if t.front_threat {
                phrases.push(Phrase::ThreatInFront);
            }
            // Step away from the side the obstacle is on
            if t.left_zone_occupied && t.left_threat {
                phrases.push(Phrase::GoRight);
            }
            if t.right_zone_occupied && t.right_threat {
                phrases.push(Phrase::GoLeft);
            }
            phrases
        }
    }
}
