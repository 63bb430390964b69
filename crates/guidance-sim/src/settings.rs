//! Simulator settings: optional TOML file layered under `SIM__*` environment variables

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use guidance::GuidanceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detector frame geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub width: u32,
    pub height: u32,
    /// Sensor orientation (degrees, multiple of 90)
    pub sensor_orientation: i32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            sensor_orientation: 90,
        }
    }
}

/// Complete simulator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub guidance: GuidanceConfig,
    pub frame: FrameSettings,
    /// tracing max level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            guidance: GuidanceConfig::default(),
            frame: FrameSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl SimSettings {
    /// Load from an optional file, then environment overrides
    /// (e.g. `SIM__GUIDANCE__MODE=threat`)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("SIM")
                .separator("__")
                .try_parsing(true),
        );
        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use guidance::{AggregationPolicy, GuidanceMode};

    #[test]
    fn test_defaults_without_sources() {
        let settings = SimSettings::from_builder(Config::builder()).unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.frame, FrameSettings::default());
        assert_eq!(settings.guidance.mode, GuidanceMode::Direction);
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            log_level = "debug"

            [frame]
            width = 1280
            height = 720
            sensor_orientation = 0

            [guidance]
            mode = "threat"
            aggregation = "closest"
            threat_cooldown_ms = 1000

            [guidance.zones]
            near_percent = 55.0
        "#;
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        let settings = SimSettings::from_builder(builder).unwrap();

        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.frame.width, 1280);
        assert_eq!(settings.frame.sensor_orientation, 0);
        assert_eq!(settings.guidance.mode, GuidanceMode::Threat);
        assert_eq!(settings.guidance.aggregation, AggregationPolicy::Closest);
        assert_eq!(settings.guidance.threat_cooldown_ms, 1000);
        assert_eq!(settings.guidance.zones.near_percent, 55.0);
        assert_eq!(settings.guidance.zones.center_percent, 45.0);
        assert_eq!(settings.guidance.min_size, 16.0);
    }
}
