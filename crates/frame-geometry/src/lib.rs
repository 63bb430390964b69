//! Frame Geometry
//!
//! Maps detector-frame coordinates onto a display surface:
//! - Axis-aligned rectangles in frame or display space
//! - Affine mappings (rotation + uniform scale + translation)
//! - Sensor-orientation aware scale-to-fit transform

pub mod mapping;
pub mod rect;
pub mod transform;

pub use mapping::Mapping;
pub use rect::Rect;
pub use transform::{CoordinateTransform, TransformState};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geometry error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Transform not configured: frame geometry must be set before mapping")]
    NotConfigured,

    #[error("Invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error("Unsupported sensor orientation {0} (must be a multiple of 90 degrees)")]
    UnsupportedOrientation(i32),

    #[error("Display surface {width}x{height} has no area")]
    EmptySurface { width: u32, height: u32 },
}

/// Rendering surface dimensions, sampled at draw time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySurface {
    /// Surface width (pixels)
    pub width: u32,
    /// Surface height (pixels)
    pub height: u32,
}

impl DisplaySurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Full surface as a rectangle anchored at the origin
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}
