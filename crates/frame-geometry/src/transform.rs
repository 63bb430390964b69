//! Sensor-orientation aware scale-to-fit transform

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::mapping::Mapping;
use crate::{DisplaySurface, GeometryError};

/// Frame geometry of the current camera session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformState {
    /// Detector frame width
    pub frame_width: u32,
    /// Detector frame height
    pub frame_height: u32,
    /// Sensor orientation, normalized into [0, 360)
    pub sensor_orientation_degrees: i32,
}

impl TransformState {
    /// Whether the sensor is mounted a quarter turn off the display
    pub fn is_rotated(&self) -> bool {
        self.sensor_orientation_degrees % 180 == 90
    }

    /// Frame size after rotation (width, height)
    pub fn effective_size(&self) -> (f32, f32) {
        let (w, h) = (self.frame_width as f32, self.frame_height as f32);
        if self.is_rotated() {
            (h, w)
        } else {
            (w, h)
        }
    }
}

/// Coordinate transform from detector frame space to display space
#[derive(Debug, Clone, Default)]
pub struct CoordinateTransform {
    state: Option<TransformState>,
}

impl CoordinateTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store frame geometry (on camera configuration)
    pub fn configure(
        &mut self,
        frame_width: u32,
        frame_height: u32,
        sensor_orientation_degrees: i32,
    ) -> Result<(), GeometryError> {
        if frame_width == 0 || frame_height == 0 {
            return Err(GeometryError::InvalidFrameSize {
                width: frame_width,
                height: frame_height,
            });
        }
        if sensor_orientation_degrees % 90 != 0 {
            return Err(GeometryError::UnsupportedOrientation(sensor_orientation_degrees));
        }

        let state = TransformState {
            frame_width,
            frame_height,
            sensor_orientation_degrees: sensor_orientation_degrees.rem_euclid(360),
        };
        info!(
            "Frame configured: {}x{} @ {} deg",
            state.frame_width, state.frame_height, state.sensor_orientation_degrees
        );
        self.state = Some(state);
        Ok(())
    }

    pub fn state(&self) -> Option<&TransformState> {
        self.state.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    /// Build the frame-to-display mapping for the given surface.
    ///
    /// The frame is rotated about its centre, scaled uniformly to fit, and
    /// centred on the surface so letterbox slack splits evenly on both axes.
    pub fn compute_mapping(&self, surface: DisplaySurface) -> Result<Mapping, GeometryError> {
        let state = self.state.ok_or(GeometryError::NotConfigured)?;
        if surface.is_empty() {
            return Err(GeometryError::EmptySurface {
                width: surface.width,
                height: surface.height,
            });
        }

        let (in_w, in_h) = state.effective_size();
        let (sw, sh) = (surface.width as f32, surface.height as f32);
        let scale = (sh / in_h).min(sw / in_w);

        let dst_w = in_w * scale;
        let dst_h = in_h * scale;
        let offset_x = (sw - dst_w) * 0.5;
        let offset_y = (sh - dst_h) * 0.5;

        let mapping = Mapping::translation(
            -(state.frame_width as f32) * 0.5,
            -(state.frame_height as f32) * 0.5,
        )
        .then(&Mapping::rotation(state.sensor_orientation_degrees))
        .then(&Mapping::scaling(scale, scale))
        .then(&Mapping::translation(offset_x + dst_w * 0.5, offset_y + dst_h * 0.5));

        debug!(
            "Mapping for {}x{}: scale={:.4}, offset=({:.1}, {:.1})",
            surface.width, surface.height, scale, offset_x, offset_y
        );
        Ok(mapping)
    }
}
