//! # Indicator Configuration
//!
//! [`IndicatorConfig`] collects every tunable of a voxel indicator: grid
//! size, animation rate, durations, and how big the voxels are in world
//! space. It loads from JSON, where every field is optional:
//!
//! ```json
//! {
//!   "size": { "width": 8, "height": 8, "depth": 3 },
//!   "update_rate": 30,
//!   "settle_delay_ms": 400
//! }
//! ```
//!
//! Named presets cover the common shapes (see [`IndicatorConfig::preset`]).
//! Configs are validated on load; a config built in code can be checked
//! with [`IndicatorConfig::validate`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::voxel::{APPEAR_DURATION_MS, DISAPPEAR_DURATION_MS, GridSize, SETTLE_DELAY_MS};

/// Errors from loading or validating an [`IndicatorConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON was malformed or had fields of the wrong type.
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    /// A grid dimension was zero.
    #[error("grid size {width}x{height}x{depth} has a zero dimension")]
    EmptyGrid { width: u32, height: u32, depth: u32 },

    /// The update rate was zero, negative or not a number.
    #[error("update rate must be positive, got {0}")]
    InvalidUpdateRate(f32),

    /// A duration was negative or not a number.
    #[error("{field} must be a non-negative number of milliseconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },

    /// [`IndicatorConfig::preset`] was given a name it doesn't know.
    #[error("unknown preset '{0}' (expected compact, standard or cube)")]
    UnknownPreset(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables of a voxel indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub size: GridSize,
    /// Maximum animation ticks per second.
    pub update_rate: f32,
    pub appear_duration_ms: f64,
    pub disappear_duration_ms: f64,
    /// Time between a state request and its commit.
    pub settle_delay_ms: f64,
    /// Pulse speed in radians per second.
    pub pulse_speed: f32,
    /// Edge length of one voxel in world units.
    pub voxel_size: f32,
    /// Space between neighboring voxels in world units.
    pub gap: f32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            size: GridSize::default(),
            update_rate: 60.0,
            appear_duration_ms: APPEAR_DURATION_MS,
            disappear_duration_ms: DISAPPEAR_DURATION_MS,
            settle_delay_ms: SETTLE_DELAY_MS,
            pulse_speed: 1.0,
            voxel_size: 0.1,
            gap: 0.02,
        }
    }
}

impl IndicatorConfig {
    /// A named preset.
    ///
    /// - `compact`: 5×5×1, smaller voxels, 30 Hz
    /// - `standard`: the default 8×8×1
    /// - `cube`: 8×8×8 with a slower pulse
    pub fn preset(name: &str) -> ConfigResult<Self> {
        let base = Self::default();
        match name.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self {
                size: GridSize::new(5, 5, 1),
                update_rate: 30.0,
                voxel_size: 0.06,
                gap: 0.01,
                ..base
            }),
            "standard" => Ok(base),
            "cube" => Ok(Self {
                size: GridSize::new(8, 8, 8),
                pulse_speed: 0.5,
                ..base
            }),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::debug!("loaded indicator config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let GridSize {
            width,
            height,
            depth,
        } = self.size;
        if width == 0 || height == 0 || depth == 0 {
            return Err(ConfigError::EmptyGrid {
                width,
                height,
                depth,
            });
        }
        if self.update_rate.is_nan() || self.update_rate <= 0.0 {
            return Err(ConfigError::InvalidUpdateRate(self.update_rate));
        }
        for (field, value) in [
            ("appear_duration_ms", self.appear_duration_ms),
            ("disappear_duration_ms", self.disappear_duration_ms),
            ("settle_delay_ms", self.settle_delay_ms),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }
        Ok(())
    }

    /// Distance between neighboring voxel centers.
    pub fn spacing(&self) -> f32 {
        self.voxel_size + self.gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config = IndicatorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, IndicatorConfig::default());
        assert_eq!(config.size, GridSize::new(8, 8, 1));
        assert_eq!(config.settle_delay_ms, 500.0);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = IndicatorConfig::from_json_str(
            r#"{ "size": { "width": 4, "height": 6, "depth": 2 }, "update_rate": 30 }"#,
        )
        .unwrap();
        assert_eq!(config.size, GridSize::new(4, 6, 2));
        assert_eq!(config.update_rate, 30.0);
        assert_eq!(config.appear_duration_ms, 300.0);
    }

    #[test]
    fn rejects_bad_values() {
        let err = IndicatorConfig::from_json_str(r#"{ "size": { "width": 0, "height": 8, "depth": 1 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGrid { width: 0, .. }));

        let err = IndicatorConfig::from_json_str(r#"{ "update_rate": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUpdateRate(_)));

        let err = IndicatorConfig::from_json_str(r#"{ "settle_delay_ms": -1 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDuration { field: "settle_delay_ms", .. }
        ));

        let err = IndicatorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid config json"));
    }

    #[test]
    fn presets() {
        assert_eq!(IndicatorConfig::preset("compact").unwrap().size, GridSize::new(5, 5, 1));
        assert_eq!(IndicatorConfig::preset("Standard").unwrap(), IndicatorConfig::default());
        assert_eq!(IndicatorConfig::preset("cube").unwrap().size.voxel_count(), 512);
        for name in ["compact", "standard", "cube"] {
            IndicatorConfig::preset(name).unwrap().validate().unwrap();
        }
        assert!(matches!(
            IndicatorConfig::preset("huge"),
            Err(ConfigError::UnknownPreset(name)) if name == "huge"
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = IndicatorConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("voxie-config-{}.json", std::process::id()));
        let config = IndicatorConfig::preset("cube").unwrap();
        std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();
        let loaded = IndicatorConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn spacing_adds_gap() {
        let config = IndicatorConfig {
            voxel_size: 1.0,
            gap: 0.25,
            ..Default::default()
        };
        assert_eq!(config.spacing(), 1.25);
    }
}
