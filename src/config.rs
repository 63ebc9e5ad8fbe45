//! Game configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `blockworld.ron` file (if exists)
//! 3. Environment variables prefixed with `BLOCKWORLD_`
//!
//! Example environment variable: `BLOCKWORLD_PLAYER__MOVE_SPEED=250`

use crate::simulation::LightingConfig;
use crate::world::{WorldGenConfig, WorldSettings};
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main game configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub world: WorldConfig,

    #[serde(default)]
    pub generation: WorldGenConfig,

    #[serde(default)]
    pub lighting: LightingConfig,

    #[serde(default)]
    pub player: PlayerConfig,
}

/// World layout and content settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Pixels per block edge
    pub block_size: u32,
    pub chunk_width: usize,
    pub chunk_height: usize,
    pub chunk_count: usize,
    /// Fixed world seed; a random one is drawn when absent
    pub seed: Option<u64>,
    /// Directory of extra `*.ron` block definitions
    pub blocks_dir: Option<String>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let settings = WorldSettings::default();
        Self {
            block_size: settings.block_size,
            chunk_width: settings.chunk_width,
            chunk_height: settings.chunk_height,
            chunk_count: settings.chunk_count,
            seed: None,
            blocks_dir: None,
        }
    }
}

impl WorldConfig {
    pub fn settings(&self) -> WorldSettings {
        WorldSettings {
            block_size: self.block_size,
            chunk_width: self.chunk_width,
            chunk_height: self.chunk_height,
            chunk_count: self.chunk_count,
        }
    }
}

/// Player physics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Body width in pixels
    pub width: f32,
    /// Body height in pixels
    pub height: f32,
    /// Horizontal movement speed in pixels/sec
    pub move_speed: f32,
    /// Gravity acceleration in pixels/sec^2
    pub gravity: f32,
    /// Jump velocity in pixels/sec
    pub jump_velocity: f32,
    /// Terminal velocity in pixels/sec
    pub max_fall_speed: f32,
    /// Vertical speed in fly mode
    pub fly_speed: f32,
    /// Ground friction in pixels/sec^2 when no direction is held
    pub deceleration: f32,
    /// Seconds after leaving the ground that a jump still works
    pub coyote_time: f32,
    /// Seconds a jump press is remembered before landing
    pub jump_buffer: f32,
    /// World column the player spawns above
    pub spawn_column: i32,
    /// Divisor in the swept ray length `v * dt * (w + h) / divisor`
    pub sweep_length_divisor: f32,
    /// Editing reach in pixels
    pub reach: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 24.0,
            move_speed: 200.0,
            gravity: 800.0,
            jump_velocity: 300.0,
            max_fall_speed: 500.0,
            fly_speed: 300.0,
            deceleration: 800.0,
            coyote_time: 0.1,
            jump_buffer: 0.1,
            spawn_column: 64,
            sweep_length_divisor: 8.0,
            reach: 160.0,
        }
    }
}

impl PlayerConfig {
    pub fn body_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width, self.height)
    }
}

impl GameConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `blockworld.ron` file (if exists)
    /// 3. Environment variables prefixed with `BLOCKWORLD_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Same as [`GameConfig::load`], but an explicit file replaces the optional
    /// `blockworld.ron` and must exist.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("blockworld")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("world.block_size", 16_i64)?
            .set_default("world.chunk_width", 32_i64)?
            .set_default("world.chunk_height", 512_i64)?
            .set_default("world.chunk_count", 50_i64)?
            .set_default("player.move_speed", 200.0)?
            .set_default("player.gravity", 800.0)?
            .set_default("player.jump_velocity", 300.0)?
            .set_default("player.max_fall_speed", 500.0)?
            .set_default("lighting.side_exposure", true)?
            .set_default("lighting.exact_relaxation", false)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (BLOCKWORLD_PLAYER__GRAVITY, etc.)
            .add_source(Environment::with_prefix("BLOCKWORLD").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.player.move_speed, 200.0);
        assert_eq!(config.player.sweep_length_divisor, 8.0);
        assert_eq!(config.world.settings(), WorldSettings::default());
        assert!(config.world.seed.is_none());
        assert!(config.lighting.side_exposure);
    }

    #[test]
    fn test_load_config_with_defaults() {
        // Should load defaults when no config file exists
        let config = GameConfig::load().expect("Failed to load config");
        assert_eq!(config.player.move_speed, 200.0);
        assert_eq!(config.world.chunk_height, 512);
        assert_eq!(config.generation, WorldGenConfig::default());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.ron");
        std::fs::write(
            &path,
            "(world: (chunk_count: 4, seed: 99), player: (move_speed: 120.0))",
        )
        .unwrap();

        let config = GameConfig::load_from(Some(&path)).expect("Failed to load config");
        assert_eq!(config.world.chunk_count, 4);
        assert_eq!(config.world.seed, Some(99));
        assert_eq!(config.world.chunk_width, 32);
        assert_eq!(config.player.move_speed, 120.0);
        assert_eq!(config.player.gravity, 800.0);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GameConfig::load_from(Some(&dir.path().join("absent.ron"))).is_err());
    }
}
