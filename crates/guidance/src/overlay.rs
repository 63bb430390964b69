//! Overlay items for rendering tracked objects

use frame_geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::object::TrackedObject;

/// One box to draw on the display surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayItem {
    pub screen_rect: Rect,
    pub label: String,
    /// Confidence scaled to [0, 100]
    pub confidence_percent: f32,
    pub color_index: usize,
    /// ARGB colour from the palette
    pub color: u32,
    /// Rounded-corner radius: an eighth of the shorter side
    pub corner_radius: f32,
}

impl OverlayItem {
    pub fn from_tracked(object: &TrackedObject) -> Self {
        let rect = object.screen_rect;
        Self {
            screen_rect: rect,
            label: object.label.clone(),
            confidence_percent: object.confidence * 100.0,
            color_index: object.color_index,
            color: object.color(),
            corner_radius: rect.width().min(rect.height()) / 8.0,
        }
    }

    /// Text drawn next to the box, e.g. `person 87.50%`
    pub fn caption(&self) -> String {
        if self.label.is_empty() {
            format!("{:.2}%", self.confidence_percent)
        } else {
            format!("{} {:.2}%", self.label, self.confidence_percent)
        }
    }
}
