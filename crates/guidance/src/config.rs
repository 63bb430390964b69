//! Guidance configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::policy::AggregationPolicy;
use crate::zone::ZoneLayout;
use crate::GuidanceError;

/// Guidance mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceMode {
    /// Steer the user towards a single target object
    #[default]
    Direction,
    /// Warn about nearby obstacles and which way to step
    Threat,
}

/// Guidance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Active guidance mode
    pub mode: GuidanceMode,

    /// Object label to guide towards (Direction mode); `None` guides towards any object
    pub target_label: Option<String>,

    /// Minimum frame-space side length for a detection to be tracked
    pub min_size: f32,

    /// Which tracked object drives guidance when several are present
    pub aggregation: AggregationPolicy,

    /// Zone boundaries on the display surface
    pub zones: ZoneLayout,

    /// Cooldown between Direction announcements (milliseconds)
    pub direction_cooldown_ms: u64,

    /// Cooldown between Threat announcements (milliseconds)
    pub threat_cooldown_ms: u64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            mode: GuidanceMode::Direction,
            target_label: None,
            min_size: 16.0,
            aggregation: AggregationPolicy::MostConfident,
            zones: ZoneLayout::default(),
            direction_cooldown_ms: 2200,
            threat_cooldown_ms: 1500,
        }
    }
}

impl GuidanceConfig {
    /// Direction mode towards an optional target label
    pub fn direction(target_label: Option<String>) -> Self {
        Self {
            mode: GuidanceMode::Direction,
            target_label,
            ..Default::default()
        }
    }

    /// Threat mode, driven by the nearest object
    pub fn threat() -> Self {
        Self {
            mode: GuidanceMode::Threat,
            aggregation: AggregationPolicy::Closest,
            ..Default::default()
        }
    }

    /// Cooldown window for a mode
    pub fn cooldown(&self, mode: GuidanceMode) -> Duration {
        match mode {
            GuidanceMode::Direction => Duration::from_millis(self.direction_cooldown_ms),
            GuidanceMode::Threat => Duration::from_millis(self.threat_cooldown_ms),
        }
    }

    pub fn validate(&self) -> Result<(), GuidanceError> {
        if !self.min_size.is_finite() || self.min_size < 0.0 {
            return Err(GuidanceError::Config(format!(
                "min_size must be a non-negative number, got {}",
                self.min_size
            )));
        }
        self.zones.validate()
    }
}
