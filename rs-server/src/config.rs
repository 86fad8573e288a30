use std::path::Path;

use rs_sim::{ConfigError, MotionConfig};
use rs_utils::{BlockUpdate, WORLD_HEIGHT};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub motion: MotionConfig,
    pub world: WorldConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Ticks simulated per collision update; above 1 the resolver queries
    /// only the destination box.
    pub tick_rate: u32,
    /// Y of the topmost floor layer.
    pub ground_level: i32,
    /// Loaded chunks around the origin, in chunks.
    pub radius: i32,
    pub ticks: u32,
    /// Extra blocks written after the floor is laid.
    pub blocks: Vec<BlockUpdate>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tick_rate: 1,
            ground_level: 3,
            radius: 1,
            ticks: 100,
            blocks: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&raw, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        let world = &self.world;
        if world.tick_rate == 0 {
            return Err(ConfigError::Invalid("world.tick_rate must be at least 1".into()));
        }
        if !(0..WORLD_HEIGHT - 16).contains(&world.ground_level) {
            return Err(ConfigError::Invalid(format!(
                "world.ground_level must be in [0, {}), got {}",
                WORLD_HEIGHT - 16,
                world.ground_level
            )));
        }
        if !(0..=8).contains(&world.radius) {
            return Err(ConfigError::Invalid(format!(
                "world.radius must be in [0, 8], got {}",
                world.radius
            )));
        }
        Ok(())
    }
}
