//! World generation configuration - serializable parameters for terrain and caves
//!
//! The seed is NOT part of the config: same config + different seed = different world.
//! Configs serialize to RON so presets can live next to the game config.

use serde::{Deserialize, Serialize};

/// Complete world generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGenConfig {
    /// Display name for this configuration
    #[serde(default = "default_name")]
    pub name: String,

    /// Surface heightmap and material bands
    #[serde(default)]
    pub terrain: TerrainParams,

    /// Cave carving
    #[serde(default)]
    pub caves: CaveParams,
}

fn default_name() -> String {
    "Default".to_string()
}

/// Terrain height generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Noise sampled once per column for the surface height
    pub height_noise: NoiseLayerConfig,
    /// Vertical range of the ridge curve in blocks (default: 20)
    pub amplitude: f32,
    /// Sample scale applied before the ridge power (default: 1.35)
    pub ridge_scale: f32,
    /// Even exponent that sharpens peaks (default: 4)
    pub ridge_power: i32,
    /// Rows of subsurface material below the surface block (default: 4)
    pub subsurface_depth: usize,
}

/// Cave carving parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaveParams {
    /// Fine cellular noise blended with the terrain noise
    pub cave_noise: NoiseLayerConfig,
    /// Blend weight toward the cave noise (0 = terrain only, 1 = cave only)
    pub cave_weight: f32,
    /// Cells whose blended density falls below this become air (default: 0.1)
    pub threshold: f32,
    /// Concentrate caves around mid-depth with a gaussian falloff
    pub vertical_falloff: bool,
    /// Set false to skip carving entirely
    pub enabled: bool,
}

/// Reusable noise layer configuration
///
/// Abstracts FastNoiseLite settings for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayerConfig {
    /// Offset added to world seed for this layer
    pub seed_offset: i32,
    /// Noise algorithm type
    pub noise_type: NoiseTypeConfig,
    /// Base frequency (lower = larger features)
    pub frequency: f32,
    /// Fractal combination type
    pub fractal_type: FractalTypeConfig,
    /// Number of fractal octaves
    pub octaves: u8,
    /// Frequency multiplier per octave (default: 2.0)
    pub lacunarity: f32,
    /// Amplitude multiplier per octave / persistence (default: 0.5)
    pub gain: f32,
}

/// Noise algorithm types (maps to FastNoiseLite::NoiseType)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseTypeConfig {
    OpenSimplex2,
    OpenSimplex2S,
    Cellular,
    Perlin,
    ValueCubic,
    Value,
}

/// Fractal combination types (maps to FastNoiseLite::FractalType)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractalTypeConfig {
    None,
    FBm,
    Ridged,
    PingPong,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            terrain: TerrainParams::default(),
            caves: CaveParams::default(),
        }
    }
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            height_noise: NoiseLayerConfig {
                seed_offset: 0,
                noise_type: NoiseTypeConfig::Cellular,
                frequency: 0.02,
                fractal_type: FractalTypeConfig::FBm,
                octaves: 15,
                lacunarity: 2.0,
                gain: 0.5,
            },
            amplitude: 20.0,
            ridge_scale: 1.35,
            ridge_power: 4,
            subsurface_depth: 4,
        }
    }
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            cave_noise: NoiseLayerConfig {
                seed_offset: 1,
                noise_type: NoiseTypeConfig::Cellular,
                frequency: 0.05,
                fractal_type: FractalTypeConfig::FBm,
                octaves: 5,
                lacunarity: 2.0,
                gain: 0.5,
            },
            cave_weight: 0.75,
            threshold: 0.1,
            vertical_falloff: true,
            enabled: true,
        }
    }
}

impl Default for NoiseLayerConfig {
    fn default() -> Self {
        Self {
            seed_offset: 0,
            noise_type: NoiseTypeConfig::OpenSimplex2,
            frequency: 0.01,
            fractal_type: FractalTypeConfig::FBm,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

impl NoiseTypeConfig {
    /// Convert to fastnoise_lite::NoiseType
    pub fn to_fastnoise(&self) -> fastnoise_lite::NoiseType {
        match self {
            NoiseTypeConfig::OpenSimplex2 => fastnoise_lite::NoiseType::OpenSimplex2,
            NoiseTypeConfig::OpenSimplex2S => fastnoise_lite::NoiseType::OpenSimplex2S,
            NoiseTypeConfig::Cellular => fastnoise_lite::NoiseType::Cellular,
            NoiseTypeConfig::Perlin => fastnoise_lite::NoiseType::Perlin,
            NoiseTypeConfig::ValueCubic => fastnoise_lite::NoiseType::ValueCubic,
            NoiseTypeConfig::Value => fastnoise_lite::NoiseType::Value,
        }
    }
}

impl FractalTypeConfig {
    /// Convert to fastnoise_lite::FractalType
    pub fn to_fastnoise(&self) -> fastnoise_lite::FractalType {
        match self {
            FractalTypeConfig::None => fastnoise_lite::FractalType::None,
            FractalTypeConfig::FBm => fastnoise_lite::FractalType::FBm,
            FractalTypeConfig::Ridged => fastnoise_lite::FractalType::Ridged,
            FractalTypeConfig::PingPong => fastnoise_lite::FractalType::PingPong,
        }
    }
}

impl NoiseLayerConfig {
    /// Create a FastNoiseLite instance from this config
    pub fn to_fastnoise(&self, base_seed: u64) -> fastnoise_lite::FastNoiseLite {
        // Only the low 32 bits of the world seed reach the noise library
        let seed = (base_seed as i32).wrapping_add(self.seed_offset);
        let mut noise = fastnoise_lite::FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(self.noise_type.to_fastnoise()));
        noise.set_frequency(Some(self.frequency));
        noise.set_fractal_type(Some(self.fractal_type.to_fastnoise()));
        noise.set_fractal_octaves(Some(self.octaves as i32));
        noise.set_fractal_lacunarity(Some(self.lacunarity));
        noise.set_fractal_gain(Some(self.gain));
        noise
    }
}

// ============================================================================
// Preset helpers
// ============================================================================

impl WorldGenConfig {
    /// Low rolling hills, good for building
    pub fn preset_flat() -> Self {
        Self {
            name: "Flat World".to_string(),
            terrain: TerrainParams {
                amplitude: 4.0,
                ..TerrainParams::default()
            },
            ..Self::default()
        }
    }

    /// Swiss cheese underground
    pub fn preset_cave_heavy() -> Self {
        Self {
            name: "Cave Heavy".to_string(),
            caves: CaveParams {
                threshold: 0.3,
                vertical_falloff: false,
                ..CaveParams::default()
            },
            ..Self::default()
        }
    }

    /// Load a preset from a RON file
    pub fn from_ron_str(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(contents)
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorldGenConfig::default();
        assert_eq!(config.name, "Default");
        assert_eq!(config.terrain.amplitude, 20.0);
        assert_eq!(config.terrain.height_noise.octaves, 15);
        assert_eq!(config.terrain.height_noise.frequency, 0.02);
        assert_eq!(config.caves.threshold, 0.1);
        assert_eq!(config.caves.cave_noise.noise_type, NoiseTypeConfig::Cellular);
        assert_ne!(
            config.terrain.height_noise.seed_offset,
            config.caves.cave_noise.seed_offset
        );
    }

    #[test]
    fn test_noise_config_to_fastnoise() {
        let config = NoiseLayerConfig::default();
        let noise = config.to_fastnoise(42);
        let value = noise.get_noise_2d(10.0, 20.0);
        assert!(value.is_finite());
    }

    #[test]
    fn test_seed_offset_does_not_overflow() {
        let config = NoiseLayerConfig {
            seed_offset: 1,
            ..NoiseLayerConfig::default()
        };
        let noise = config.to_fastnoise(i32::MAX as u64);
        assert!(noise.get_noise_2d(0.5, 0.5).is_finite());
    }

    #[test]
    fn test_ron_serialization() {
        let config = WorldGenConfig::preset_cave_heavy();
        let serialized = config.to_ron_string().expect("Failed to serialize");
        let deserialized = WorldGenConfig::from_ron_str(&serialized).expect("Failed to deserialize");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = WorldGenConfig::from_ron_str(r#"(name: "Sparse")"#).unwrap();
        assert_eq!(config.name, "Sparse");
        assert_eq!(config.terrain, TerrainParams::default());
    }

    #[test]
    fn test_presets() {
        let flat = WorldGenConfig::preset_flat();
        assert!(flat.terrain.amplitude < TerrainParams::default().amplitude);

        let caves = WorldGenConfig::preset_cave_heavy();
        assert!(caves.caves.threshold > CaveParams::default().threshold);
    }
}
