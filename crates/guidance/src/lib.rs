//! Spatial Audio Guidance
//!
//! Turns per-frame object detections into spoken guidance:
//! - Frame classification (display mapping, degenerate-rectangle filtering)
//! - Zone evaluation (left/front/right, near/far)
//! - Phrase selection for Direction and Threat modes
//! - Throttled announcements so speech never overlaps

pub mod analysis;
pub mod config;
pub mod object;
pub mod overlay;
pub mod phrase;
pub mod policy;
pub mod state;
pub mod tracker;
pub mod zone;

pub use analysis::FrameReport;
pub use config::{GuidanceConfig, GuidanceMode};
pub use object::{classify, Classification, DebugRect, Detection, TrackedObject, PALETTE, PALETTE_SIZE};
pub use overlay::OverlayItem;
pub use phrase::{select_phrases, Phrase};
pub use policy::AggregationPolicy;
pub use state::{AnnouncementOutcome, GuidanceState, GuidanceStateMachine};
pub use tracker::GuidanceTracker;
pub use zone::{evaluate, DirectionFlags, GuidanceFlags, ThreatFlags, ZoneLayout};

use frame_geometry::GeometryError;
use thiserror::Error;

/// Guidance error types
#[derive(Error, Debug)]
pub enum GuidanceError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Configuration error: {0}")]
    Config(String),
}
