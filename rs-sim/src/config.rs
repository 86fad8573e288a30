use std::path::Path;

use bevy_ecs::prelude::Resource;
use serde::Deserialize;

use crate::error::ConfigError;

/// Tunables of the motion resolver.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Resource)]
#[serde(default)]
pub struct MotionConfig {
    /// Overlap tolerance for the two axes a clamp does not move along.
    pub overlap_epsilon: f64,
    /// Largest displacement accepted on one axis in one move.
    pub max_displacement: f64,
    /// Factor applied to `y_size` at the start of every standard move.
    pub y_size_decay: f64,
    /// Step-up is only attempted while `y_size` is below this.
    pub step_retry_threshold: f64,
    /// Added to `y_size` after a successful step-up. Approximates the height
    /// of the block stepped onto.
    pub step_climb_increment: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            overlap_epsilon: 1e-7,
            max_displacement: 20.0,
            y_size_decay: 0.4,
            step_retry_threshold: 0.05,
            step_climb_increment: 0.5,
        }
    }
}

impl MotionConfig {
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&raw, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.overlap_epsilon >= 0.0 && self.overlap_epsilon < 0.01) {
            return Err(ConfigError::Invalid(format!(
                "overlap_epsilon must be in [0, 0.01), got {}",
                self.overlap_epsilon
            )));
        }
        if !(self.max_displacement > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_displacement must be positive, got {}",
                self.max_displacement
            )));
        }
        if !(0.0..=1.0).contains(&self.y_size_decay) {
            return Err(ConfigError::Invalid(format!(
                "y_size_decay must be in [0, 1], got {}",
                self.y_size_decay
            )));
        }
        if self.step_retry_threshold < 0.0 || self.step_climb_increment < 0.0 {
            return Err(ConfigError::Invalid("step tunables must not be negative".into()));
        }
        Ok(())
    }
}
