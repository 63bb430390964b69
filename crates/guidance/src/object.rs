//! Frame classification: detections to tracked objects

use frame_geometry::{Mapping, Rect};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of overlay colours; class ids wrap around this
pub const PALETTE_SIZE: usize = 15;

/// Overlay colours (ARGB), indexed by `class_id mod PALETTE_SIZE`
pub const PALETTE: [u32; PALETTE_SIZE] = [
    0xFF0000FF, // blue
    0xFFFF0000, // red
    0xFF00FF00, // green
    0xFFFFFF00, // yellow
    0xFF00FFFF, // cyan
    0xFFFF00FF, // magenta
    0xFFFFFFFF, // white
    0xFF55FF55,
    0xFFFFA500,
    0xFFFF8888,
    0xFFAAAAFF,
    0xFFFFFFAA,
    0xFF55AAAA,
    0xFFAA33AA,
    0xFF0D0068,
];

/// Single detector output for a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in frame space
    pub rect: Option<Rect>,

    /// Detection confidence [0, 1]
    pub confidence: f32,

    /// Detector class id
    pub class_id: i32,

    /// Class label
    #[serde(default)]
    pub label: String,
}

impl Detection {
    pub fn new(rect: Rect, confidence: f32, class_id: i32, label: impl Into<String>) -> Self {
        Self {
            rect: Some(rect),
            confidence,
            class_id,
            label: label.into(),
        }
    }
}

/// Detection kept for the current frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Bounding box in frame space
    pub frame_rect: Rect,

    /// Bounding box in display space
    pub screen_rect: Rect,

    pub confidence: f32,

    pub label: String,

    pub class_id: i32,

    /// Palette slot, stable per class across frames
    pub color_index: usize,
}

impl TrackedObject {
    pub fn color(&self) -> u32 {
        PALETTE[self.color_index]
    }

    /// Re-project onto a new display mapping
    pub fn remap(&mut self, mapping: &Mapping) {
        self.screen_rect = mapping.map_rect(&self.frame_rect);
    }

    /// Whether this object carries `target` as its label (trimmed, case-insensitive)
    pub fn matches_label(&self, target: &str) -> bool {
        self.label.trim().eq_ignore_ascii_case(target.trim())
    }
}

/// Raw confidence/rectangle pair for the diagnostics overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebugRect {
    pub confidence: f32,
    pub screen_rect: Rect,
}

/// Output of classifying one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Objects passing the size filter, in detector order
    pub tracked: Vec<TrackedObject>,

    /// Every detection with a rectangle, degenerate ones included
    pub debug: Vec<DebugRect>,
}

/// Palette slot for a class id
pub fn color_index(class_id: i32) -> usize {
    class_id.rem_euclid(PALETTE_SIZE as i32) as usize
}

/// Map detections to display space and drop degenerate rectangles
pub fn classify(detections: &[Detection], mapping: &Mapping, min_size: f32) -> Classification {
    if detections.is_empty() {
        debug!("Nothing to track");
        return Classification::default();
    }

    let mut result = Classification {
        tracked: Vec::with_capacity(detections.len()),
        debug: Vec::with_capacity(detections.len()),
    };

    for detection in detections {
        let Some(frame_rect) = detection.rect else {
            debug!("Detection '{}' has no rectangle, skipping", detection.label);
            continue;
        };

        let screen_rect = mapping.map_rect(&frame_rect);
        debug!("Frame {:?} mapped to screen {:?}", frame_rect, screen_rect);

        result.debug.push(DebugRect {
            confidence: detection.confidence,
            screen_rect,
        });

        if frame_rect.width() < min_size || frame_rect.height() < min_size {
            warn!("Degenerate rectangle: {:?}", frame_rect);
            metrics::counter!("guidance.degenerate_rects").increment(1);
            continue;
        }

        result.tracked.push(TrackedObject {
            frame_rect,
            screen_rect,
            confidence: detection.confidence,
            label: detection.label.clone(),
            class_id: detection.class_id,
            color_index: color_index(detection.class_id),
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn det(x: f32, y: f32, w: f32, h: f32, class_id: i32) -> Detection {
        Detection::new(Rect::from_xywh(x, y, w, h), 0.75, class_id, "person")
    }

    #[test]
    fn test_empty_input() {
        let result = classify(&[], &Mapping::identity(), 16.0);
        assert!(result.tracked.is_empty());
        assert!(result.debug.is_empty());
    }

    #[test]
    fn test_missing_rect_skipped() {
        let detections = vec![
            Detection {
                rect: None,
                confidence: 0.9,
                class_id: 1,
                label: "ghost".to_string(),
            },
            det(0.0, 0.0, 50.0, 50.0, 1),
        ];
        let result = classify(&detections, &Mapping::identity(), 16.0);
        assert_eq!(result.tracked.len(), 1);
        assert_eq!(result.debug.len(), 1);
    }

    #[test]
    fn test_degenerate_dropped_but_debugged() {
        let detections = vec![det(0.0, 0.0, 15.9, 100.0, 0), det(0.0, 0.0, 100.0, 16.0, 0)];
        let result = classify(&detections, &Mapping::identity(), 16.0);
        assert_eq!(result.tracked.len(), 1);
        assert_eq!(result.tracked[0].frame_rect.height(), 16.0);
        assert_eq!(result.debug.len(), 2);
    }

    #[test]
    fn test_size_filter_uses_frame_space() {
        // Scaled up 10x on screen, but still degenerate in frame space
        let mapping = Mapping::scaling(10.0, 10.0);
        let result = classify(&[det(0.0, 0.0, 10.0, 10.0, 0)], &mapping, 16.0);
        assert!(result.tracked.is_empty());
        assert_eq!(result.debug[0].screen_rect.width(), 100.0);
    }

    #[test]
    fn test_color_index_wraps() {
        assert_eq!(color_index(0), 0);
        assert_eq!(color_index(16), 1);
        assert_eq!(color_index(-1), 14);

        let result = classify(&[det(0.0, 0.0, 40.0, 40.0, 17)], &Mapping::identity(), 16.0);
        assert_eq!(result.tracked[0].color_index, 2);
        assert_eq!(result.tracked[0].color(), 0xFF00FF00);
    }

    #[test]
    fn test_matches_label() {
        let result = classify(&[det(0.0, 0.0, 40.0, 40.0, 0)], &Mapping::identity(), 16.0);
        assert!(result.tracked[0].matches_label(" Person "));
        assert!(!result.tracked[0].matches_label("bottle"));
    }

    #[test]
    fn test_idempotent_and_ordered() {
        let detections = vec![
            det(10.0, 10.0, 40.0, 40.0, 3),
            det(100.0, 10.0, 60.0, 40.0, 5),
            det(200.0, 10.0, 20.0, 80.0, 7),
        ];
        let mapping = Mapping::translation(5.0, 5.0).then(&Mapping::scaling(2.0, 2.0));
        let first = classify(&detections, &mapping, 16.0);
        let second = classify(&detections, &mapping, 16.0);
        assert_eq!(first, second);
        let ids: Vec<i32> = first.tracked.iter().map(|o| o.class_id).collect();
        assert_eq!(ids, vec![3, 5, 7]);
    }

    proptest! {
        #[test]
        fn prop_small_rects_excluded(w in 0.0f32..40.0, h in 0.0f32..40.0) {
            let result = classify(&[det(0.0, 0.0, w, h, 0)], &Mapping::identity(), 16.0);
            let kept = !result.tracked.is_empty();
            prop_assert_eq!(kept, w >= 16.0 && h >= 16.0);
        }
    }
}
