//! Zone evaluation: rectangle position to directional/proximity flags

use frame_geometry::{DisplaySurface, Rect};
use serde::{Deserialize, Serialize};

use crate::config::GuidanceMode;
use crate::GuidanceError;

/// Zone boundary constants, relative to the display surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneLayout {
    /// Horizontal centre line, percent of width
    pub center_percent: f32,
    /// Half-width of the front band is `width / band_divisor`
    pub band_divisor: f32,
    /// Proximity line, percent of height from the top
    pub near_percent: f32,
}

impl Default for ZoneLayout {
    fn default() -> Self {
        Self {
            center_percent: 45.0,
            band_divisor: 7.0,
            near_percent: 60.0,
        }
    }
}

impl ZoneLayout {
    /// Resolve boundary lines for a surface
    pub fn boundaries(&self, surface: DisplaySurface) -> ZoneBoundaries {
        let width = surface.width as f32;
        let height = surface.height as f32;
        let center = width * self.center_percent / 100.0;
        let band = width / self.band_divisor;
        ZoneBoundaries {
            center,
            left: center - band,
            right: center + band,
            near_line: height * self.near_percent / 100.0,
        }
    }

    pub fn validate(&self) -> Result<(), GuidanceError> {
        let in_range = |v: f32| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.center_percent) || !in_range(self.near_percent) {
            return Err(GuidanceError::Config(format!(
                "zone percentages must lie in [0, 100], got center={} near={}",
                self.center_percent, self.near_percent
            )));
        }
        if !self.band_divisor.is_finite() || self.band_divisor <= 0.0 {
            return Err(GuidanceError::Config(format!(
                "band_divisor must be positive, got {}",
                self.band_divisor
            )));
        }
        Ok(())
    }
}

/// Boundary lines in display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBoundaries {
    pub center: f32,
    pub left: f32,
    pub right: f32,
    pub near_line: f32,
}

/// Direction mode flags; both false means the object is in front
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionFlags {
    pub object_is_left: bool,
    pub object_is_right: bool,
}

/// Threat mode flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatFlags {
    pub threat_present: bool,
    pub front_threat: bool,
    pub left_zone_occupied: bool,
    pub right_zone_occupied: bool,
    pub left_threat: bool,
    pub right_threat: bool,
}

/// Flags produced by evaluating one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum GuidanceFlags {
    Direction(DirectionFlags),
    Threat(ThreatFlags),
}

impl GuidanceFlags {
    pub fn mode(&self) -> GuidanceMode {
        match self {
            GuidanceFlags::Direction(_) => GuidanceMode::Direction,
            GuidanceFlags::Threat(_) => GuidanceMode::Threat,
        }
    }
}

/// Classify a display-space rectangle against the zones of `surface`
pub fn evaluate(
    screen_rect: &Rect,
    surface: DisplaySurface,
    mode: GuidanceMode,
    layout: &ZoneLayout,
) -> GuidanceFlags {
    let zones = layout.boundaries(surface);
    let center_x = screen_rect.center_x();

    match mode {
        GuidanceMode::Direction => GuidanceFlags::Direction(DirectionFlags {
            object_is_right: center_x > zones.right,
            object_is_left: center_x < zones.left,
        }),
        GuidanceMode::Threat => {
            let mut flags = ThreatFlags::default();
            if screen_rect.top < zones.near_line {
                flags.threat_present = true;
                if center_x < zones.center {
                    flags.left_zone_occupied = true;
                    flags.left_threat = screen_rect.right > zones.left;
                } else if center_x > zones.center {
                    flags.right_zone_occupied = true;
                    flags.right_threat = screen_rect.left < zones.right;
                }
                flags.front_threat =
                    screen_rect.right > zones.left && screen_rect.left < zones.right;
            }
            GuidanceFlags::Threat(flags)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SURFACE: DisplaySurface = DisplaySurface {
        width: 1000,
        height: 1000,
    };

    fn centered_at(x: f32) -> Rect {
        Rect::new(x - 50.0, 700.0, x + 50.0, 900.0)
    }

    fn direction(rect: Rect) -> DirectionFlags {
        match evaluate(&rect, SURFACE, GuidanceMode::Direction, &ZoneLayout::default()) {
            GuidanceFlags::Direction(flags) => flags,
            other => panic!("unexpected flags {:?}", other),
        }
    }

    fn threat(rect: Rect) -> ThreatFlags {
        match evaluate(&rect, SURFACE, GuidanceMode::Threat, &ZoneLayout::default()) {
            GuidanceFlags::Threat(flags) => flags,
            other => panic!("unexpected flags {:?}", other),
        }
    }

    #[test]
    fn test_boundaries() {
        let zones = ZoneLayout::default().boundaries(SURFACE);
        assert_eq!(zones.center, 450.0);
        assert!((zones.right - 592.857).abs() < 1e-3);
        assert!((zones.left - 307.143).abs() < 1e-3);
        assert_eq!(zones.near_line, 600.0);
    }

    #[test]
    fn test_direction_right() {
        let flags = direction(centered_at(600.0));
        assert!(flags.object_is_right);
        assert!(!flags.object_is_left);
    }

    #[test]
    fn test_direction_left() {
        let flags = direction(centered_at(300.0));
        assert!(flags.object_is_left);
        assert!(!flags.object_is_right);
    }

    #[test]
    fn test_direction_front() {
        assert_eq!(direction(centered_at(450.0)), DirectionFlags::default());
    }

    #[test]
    fn test_threat_left_zone() {
        let flags = threat(Rect::new(200.0, 100.0, 500.0, 400.0));
        assert!(flags.threat_present);
        assert!(flags.left_zone_occupied);
        assert!(!flags.right_zone_occupied);
        assert!(flags.left_threat);
        assert!(flags.front_threat);
    }

    #[test]
    fn test_threat_right_zone_outside_band() {
        let flags = threat(Rect::new(700.0, 100.0, 900.0, 400.0));
        assert!(flags.right_zone_occupied);
        assert!(!flags.right_threat);
        assert!(!flags.front_threat);
    }

    #[test]
    fn test_threat_far_clears_flags() {
        assert_eq!(threat(Rect::new(200.0, 650.0, 500.0, 900.0)), ThreatFlags::default());
    }

    #[test]
    fn test_threat_exact_center_no_zone() {
        let flags = threat(Rect::new(400.0, 100.0, 500.0, 400.0));
        assert!(flags.threat_present);
        assert!(!flags.left_zone_occupied && !flags.right_zone_occupied);
        assert!(flags.front_threat);
    }

    #[test]
    fn test_layout_validation() {
        let bad = ZoneLayout {
            band_divisor: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        assert!(ZoneLayout::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_direction_exclusive(x in 0.0f32..1000.0, w in 1.0f32..300.0) {
            let flags = direction(Rect::new(x, 0.0, x + w, 50.0));
            prop_assert!(!(flags.object_is_left && flags.object_is_right));
        }

        #[test]
        fn prop_zones_exclusive(x in 0.0f32..1000.0, y in 0.0f32..1000.0, w in 1.0f32..300.0) {
            let flags = threat(Rect::new(x, y, x + w, y + 10.0));
            prop_assert!(!(flags.left_zone_occupied && flags.right_zone_occupied));
            if !flags.threat_present {
                prop_assert_eq!(flags, ThreatFlags::default());
            }
        }
    }
}
