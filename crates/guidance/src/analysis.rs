//! Per-frame guidance results

use serde::{Deserialize, Serialize};

use crate::overlay::OverlayItem;
use crate::phrase::Phrase;
use crate::state::AnnouncementOutcome;
use crate::zone::GuidanceFlags;

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Detector timestamp (nanoseconds)
    pub timestamp_ns: u64,

    /// Boxes to render, in detector order
    pub overlay: Vec<OverlayItem>,

    /// Index into `overlay` of the object that drove guidance
    pub guide: Option<usize>,

    /// Zone flags of the guiding object
    pub flags: Option<GuidanceFlags>,

    /// Announcement result
    pub outcome: AnnouncementOutcome,
}

impl FrameReport {
    pub fn announced(&self) -> bool {
        matches!(self.outcome, AnnouncementOutcome::Announced(_))
    }

    /// Phrases spoken for this frame, empty unless announced
    pub fn phrases(&self) -> &[Phrase] {
        match &self.outcome {
            AnnouncementOutcome::Announced(phrases) => phrases,
            _ => &[],
        }
    }

    pub fn guide_item(&self) -> Option<&OverlayItem> {
        self.guide.and_then(|i| self.overlay.get(i))
    }
}
