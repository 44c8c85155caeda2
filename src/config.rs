//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the face-config.toml file.
//! It provides a centralized way to tune display size, animation cadence, expression
//! timing and hand geometry without recompiling.
//!
//! All expression constants are expressed in animation ticks, so their real-time
//! duration scales with the active interval (normal or low-power).

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "face-config.toml";

/// Errors raised while reading, writing or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Application configuration loaded from face-config.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Display surface dimensions
    pub display: DisplayConfig,
    /// Animation tick cadence and battery throttling
    pub animation: AnimationConfig,
    /// Blink and smile timing
    pub expression: ExpressionConfig,
    /// Step-count driven smile tuning
    pub activity: ActivityConfig,
    /// Clock hand geometry
    pub hands: HandsConfig,
}

/// Display surface configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Display width in pixels
    pub width: u32,
    /// Display height in pixels
    pub height: u32,
}

/// Animation scheduler configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnimationConfig {
    /// Tick interval in milliseconds while the battery is healthy
    pub interval_ms: u64,
    /// Tick interval in milliseconds when the battery is low and not charging
    pub low_power_interval_ms: u64,
    /// Battery percent at or below which the low-power interval applies
    pub low_battery_threshold: u8,
}

/// Which input drives the smile phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmilePolicy {
    /// Periodic rise, hold and fall on a tick counter
    Timer,
    /// Step count above the daily average
    Activity,
}

/// Expression timing in animation ticks
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExpressionConfig {
    /// Ticks between blinks
    pub blink_interval_ticks: u32,
    /// Ticks the eyes stay closed
    pub blink_duration_ticks: u32,
    /// Ticks between smiles (timer policy)
    pub smile_interval_ticks: u32,
    /// Phase change per tick while rising or falling
    pub smile_step: f32,
    /// Ticks the full smile is held before falling
    pub smile_hold_ticks: u32,
    /// Smile driver selection
    pub smile_policy: SmilePolicy,
    /// Constant sadness in [0, 1]; narrows the mouth and adds dark circles
    pub sad_phase: f32,
}

/// Activity policy tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ActivityConfig {
    /// Phase gained per full bucket of steps above the average
    pub phase_per_bucket: f32,
    /// Number of surplus steps per bucket
    pub steps_per_bucket: u32,
}

/// Clock hand geometry in pixels
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HandsConfig {
    pub minute_length: u32,
    pub hour_length: u32,
    /// Distance from center where hands begin
    pub inner_radius: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            display: DisplayConfig {
                width: 144,  // Rectangular watch display
                height: 168, // Rectangular watch display
            },
            animation: AnimationConfig {
                interval_ms: 50,
                low_power_interval_ms: 100,
                low_battery_threshold: 20,
            },
            expression: ExpressionConfig {
                blink_interval_ticks: 300, // ~15 s at 50 ms
                blink_duration_ticks: 3,
                smile_interval_ticks: 7200, // ~6 min at 50 ms
                smile_step: 0.05,
                smile_hold_ticks: 100,
                smile_policy: SmilePolicy::Timer,
                sad_phase: 0.0,
            },
            activity: ActivityConfig {
                phase_per_bucket: 0.1,
                steps_per_bucket: 10,
            },
            hands: HandsConfig {
                minute_length: 55,
                hour_length: 45,
                inner_radius: 20,
            },
        }
    }
}

impl AnimationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn low_power_interval(&self) -> Duration {
        Duration::from_millis(self.low_power_interval_ms)
    }
}

impl Config {
    /// Load configuration from face-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.as_ref().display());
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config file found, using default configuration");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring config file {}: {}", path.as_ref().display(), e);
                log::warn!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Load and validate configuration, surfacing every failure
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str::<Config>(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject values the animation engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        }

        if self.display.width == 0 || self.display.height == 0 {
            return invalid("display", "width and height must be non-zero");
        }
        if self.animation.interval_ms == 0 || self.animation.low_power_interval_ms == 0 {
            return invalid("animation", "intervals must be non-zero");
        }
        if self.animation.low_battery_threshold > 100 {
            return invalid("animation.low_battery_threshold", "must be a percentage");
        }
        let expression = &self.expression;
        if !(expression.smile_step > 0.0 && expression.smile_step <= 1.0) {
            return invalid("expression.smile_step", "must be in (0, 1]");
        }
        if expression.blink_duration_ticks >= expression.blink_interval_ticks {
            return invalid(
                "expression.blink_duration_ticks",
                "must be shorter than the blink interval",
            );
        }
        if !(0.0..=1.0).contains(&expression.sad_phase) {
            return invalid("expression.sad_phase", "must be in [0, 1]");
        }
        if self.activity.steps_per_bucket == 0 {
            return invalid("activity.steps_per_bucket", "must be non-zero");
        }
        if !(self.activity.phase_per_bucket >= 0.0) {
            return invalid("activity.phase_per_bucket", "must not be negative");
        }
        Ok(())
    }
}
