use crate::simulation::{BlockId, BlockRegistry};
use crate::world::caves::CaveCarver;
use crate::world::noise_field::NoiseField;
use crate::world::worldgen_config::WorldGenConfig;
use crate::world::{Chunk, WorldSettings};

/// Block ids used for the terrain bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainPalette {
    pub surface: u16,
    pub subsurface: u16,
    pub deep: u16,
    pub wall: u16,
}

impl TerrainPalette {
    /// Resolve the standard terrain blocks by name; missing names fall back to air
    pub fn from_registry(registry: &BlockRegistry) -> Self {
        Self {
            surface: registry.get_by_name("grass").id,
            subsurface: registry.get_by_name("dirt").id,
            deep: registry.get_by_name("stone").id,
            wall: registry.get_by_name("dirt_wall").id,
        }
    }
}

impl Default for TerrainPalette {
    fn default() -> Self {
        Self {
            surface: BlockId::GRASS,
            subsurface: BlockId::DIRT,
            deep: BlockId::STONE,
            wall: BlockId::DIRT_WALL,
        }
    }
}

/// World generator: ridge heightmap, material bands, background walls and caves
///
/// Can be created with default parameters via `new(seed)` or with a full
/// configuration via `from_config(seed, config, palette)`.
pub struct WorldGenerator {
    pub seed: u64,
    config: WorldGenConfig,
    noise: NoiseField,
    palette: TerrainPalette,
}

impl WorldGenerator {
    pub fn new(seed: u64) -> Self {
        Self::from_config(seed, WorldGenConfig::default(), TerrainPalette::default())
    }

    pub fn from_config(seed: u64, config: WorldGenConfig, palette: TerrainPalette) -> Self {
        let noise = NoiseField::new(seed, &config);
        Self {
            seed,
            config,
            noise,
            palette,
        }
    }

    pub fn config(&self) -> &WorldGenConfig {
        &self.config
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn palette(&self) -> TerrainPalette {
        self.palette
    }

    /// Surface row of a world column, clamped into `[0, chunk_height)`
    pub fn height_at(&self, world_x: i64, chunk_height: usize) -> usize {
        let terrain = &self.config.terrain;
        let sample = self.noise.terrain(world_x as f32, 0.0);
        let ridge = (sample * terrain.ridge_scale).powi(terrain.ridge_power);
        let normalized = (ridge + 1.0) / 2.0;

        let center = chunk_height as i64 / 2 - (terrain.amplitude / 2.0) as i64;
        let height = (normalized * terrain.amplitude) as i64 + center;

        height.clamp(0, chunk_height.saturating_sub(1) as i64) as usize
    }

    /// Build chunk `index` with terrain bands, walls and caves. Lighting and
    /// meshing are left to `Chunk::rebuild`.
    pub fn generate_chunk(&self, index: usize, settings: &WorldSettings) -> Chunk {
        let mut chunk = self.generate_terrain(index, settings);
        let carved =
            CaveCarver::new(&self.noise, &self.config.caves, self.config.terrain.amplitude).carve(&mut chunk);
        log::debug!(
            "[GEN] Chunk {} - {} non-air blocks, {} carved",
            index,
            chunk.count_non_air(),
            carved
        );
        chunk
    }

    /// Heightmap bands and walls only
    pub fn generate_terrain(&self, index: usize, settings: &WorldSettings) -> Chunk {
        let mut chunk = Chunk::new(index, settings.chunk_width, settings.chunk_height, settings.block_size);
        let subsurface_end = 1 + self.config.terrain.subsurface_depth;

        for x in 0..settings.chunk_width {
            let world_x = settings.world_column(index, x);
            let surface = self.height_at(world_x, settings.chunk_height);

            for y in surface..settings.chunk_height {
                let id = match y - surface {
                    0 => self.palette.surface,
                    d if d < subsurface_end => self.palette.subsurface,
                    _ => self.palette.deep,
                };
                chunk.fill_block(x, y, id);
            }
        }

        self.generate_walls(&mut chunk, settings);
        chunk
    }

    /// Background walls fill everything at or below the surface
    pub fn generate_walls(&self, chunk: &mut Chunk, settings: &WorldSettings) {
        for x in 0..chunk.width() {
            let world_x = settings.world_column(chunk.id(), x);
            let surface = self.height_at(world_x, chunk.height());
            for y in 0..chunk.height() {
                let wall = if y >= surface { self.palette.wall } else { BlockId::AIR };
                chunk.set_wall(x, y, wall);
            }
        }
    }
}
