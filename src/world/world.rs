//! World - owns the chunk strip and exposes queries and edits

use crate::error::WorldResult;
use crate::physics::Collider;
use crate::simulation::light::LightingConfig;
use crate::simulation::{BlockId, BlockRegistry};
use crate::world::events::{EventSink, WorldEvent};
use crate::world::persistence::{self, ChunkRecord, WorldRecord, FORMAT_VERSION};
use crate::world::raycasting::{RayTarget, Raycasting};
use crate::world::{Block, Chunk, TerrainPalette, WorldGenConfig, WorldGenerator, WorldSettings};
use glam::{IVec2, Vec2};
use std::path::Path;
use std::sync::Arc;

/// The game world: a left-to-right strip of equally sized chunks
pub struct World {
    settings: WorldSettings,
    generator: WorldGenerator,
    registry: Arc<BlockRegistry>,
    lighting: LightingConfig,
    /// Chunk `i` covers pixels `[i * chunk_width * block_size, (i + 1) * ...)`
    chunks: Vec<Chunk>,
    events: EventSink,
}

impl World {
    /// Generate every chunk, light and mesh it, then announce the world
    pub fn generate(
        seed: u64,
        settings: WorldSettings,
        generation: WorldGenConfig,
        lighting: LightingConfig,
        registry: Arc<BlockRegistry>,
        events: EventSink,
    ) -> Self {
        log::info!(
            "Generating world: seed {}, {} chunks of {}x{}",
            seed,
            settings.chunk_count,
            settings.chunk_width,
            settings.chunk_height
        );

        let palette = TerrainPalette::from_registry(&registry);
        let generator = WorldGenerator::from_config(seed, generation, palette);
        let chunks = (0..settings.chunk_count)
            .map(|index| generator.generate_chunk(index, &settings))
            .collect();

        let mut world = Self {
            settings,
            generator,
            registry,
            lighting,
            chunks,
            events,
        };
        world.rebuild_all();

        let total: usize = world.chunks.iter().map(Chunk::count_non_air).sum();
        log::info!("World generated: {} non-air blocks", total);

        world.announce();
        world
    }

    /// All-air world, mostly for tests and editors
    pub fn empty(settings: WorldSettings, registry: Arc<BlockRegistry>, events: EventSink) -> Self {
        let chunks = (0..settings.chunk_count)
            .map(|index| Chunk::new(index, settings.chunk_width, settings.chunk_height, settings.block_size))
            .collect();

        let mut world = Self {
            settings,
            generator: WorldGenerator::new(0),
            registry,
            lighting: LightingConfig::default(),
            chunks,
            events,
        };
        world.rebuild_all();
        world
    }

    /// Rebuild a world from a saved record. Walls come from the heightmap, light
    /// meshes and colliders are recomputed.
    pub fn from_record(
        record: WorldRecord,
        generation: WorldGenConfig,
        lighting: LightingConfig,
        registry: Arc<BlockRegistry>,
        events: EventSink,
    ) -> WorldResult<Self> {
        record.validate()?;
        let settings = record.settings();

        let palette = TerrainPalette::from_registry(&registry);
        let generator = WorldGenerator::from_config(record.seed, generation, palette);

        let mut chunks = Vec::with_capacity(record.chunks.len());
        // Chunk order is position order, whatever the stored ids say
        for (index, stored) in record.chunks.iter().enumerate() {
            if stored.id != index {
                log::warn!("[LOAD] Chunk record {} stored at position {}", stored.id, index);
            }
            let mut chunk = Chunk::new(index, settings.chunk_width, settings.chunk_height, settings.block_size);
            for (i, &id) in stored.blocks.iter().enumerate() {
                chunk.fill_block(i / settings.chunk_height, i % settings.chunk_height, id);
            }
            generator.generate_walls(&mut chunk, &settings);
            chunks.push(chunk);
        }

        let mut world = Self {
            settings,
            generator,
            registry,
            lighting,
            chunks,
            events,
        };
        world.rebuild_all();
        world.events.emit(WorldEvent::WorldLoaded(Arc::new(record)));
        Ok(world)
    }

    pub fn load(
        path: &Path,
        generation: WorldGenConfig,
        lighting: LightingConfig,
        registry: Arc<BlockRegistry>,
        events: EventSink,
    ) -> WorldResult<Self> {
        let record = persistence::load_record(path)?;
        Self::from_record(record, generation, lighting, registry, events)
    }

    pub fn save(&self, path: &Path) -> WorldResult<()> {
        persistence::save_record(&self.to_record(), path)
    }

    pub fn to_record(&self) -> WorldRecord {
        WorldRecord {
            version: FORMAT_VERSION,
            seed: self.generator.seed,
            block_size: self.settings.block_size,
            chunk_width: self.settings.chunk_width,
            chunk_height: self.settings.chunk_height,
            chunks: self.chunks.iter().map(ChunkRecord::from_chunk).collect(),
        }
    }

    fn announce(&self) {
        self.events
            .emit(WorldEvent::WorldLoaded(Arc::new(self.to_record())));
    }

    fn rebuild_all(&mut self) {
        let block_size = self.settings.block_size;
        for chunk in &mut self.chunks {
            chunk.rebuild(&self.registry, &self.lighting, block_size);
        }
    }

    pub fn seed(&self) -> u64 {
        self.generator.seed
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    pub fn generator(&self) -> &WorldGenerator {
        &self.generator
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// Index of the chunk containing a world pixel x, if inside the world
    pub fn chunk_index_at(&self, position: Vec2) -> Option<usize> {
        let index = self.settings.chunk_index_at(position.x);
        (0..self.chunks.len() as i64).contains(&index).then_some(index as usize)
    }

    pub fn chunk_from_position(&self, position: Vec2) -> Option<&Chunk> {
        self.chunk_index_at(position).map(|i| &self.chunks[i])
    }

    /// Chunk-local cell of a position inside `chunk`; may be out of the chunk's range
    fn local_cell(&self, chunk: &Chunk, position: Vec2) -> IVec2 {
        ((position - chunk.bounds().position.as_vec2()) / self.settings.block_size as f32)
            .floor()
            .as_ivec2()
    }

    pub fn get_block(&self, position: Vec2) -> Option<Block> {
        let chunk = self.chunk_from_position(position)?;
        let local = self.local_cell(chunk, position);
        chunk.try_get(local.x, local.y)
    }

    /// Put a block into an air cell. Returns false and changes nothing when the
    /// position is outside the world or the cell is occupied.
    pub fn place_block(&mut self, position: Vec2, id: u16) -> bool {
        if id == BlockId::AIR {
            return false;
        }
        self.edit_cell(position, |block| block.is_air().then_some(id))
    }

    /// Clear a non-air cell. Returns false when nothing was removed.
    pub fn remove_block(&mut self, position: Vec2) -> bool {
        self.edit_cell(position, |block| (!block.is_air()).then_some(BlockId::AIR))
    }

    fn edit_cell<F>(&mut self, position: Vec2, edit: F) -> bool
    where
        F: FnOnce(Block) -> Option<u16>,
    {
        let Some(index) = self.chunk_index_at(position) else {
            return false;
        };
        let local = self.local_cell(&self.chunks[index], position);
        let chunk = &mut self.chunks[index];
        let Some(block) = chunk.try_get(local.x, local.y) else {
            return false;
        };
        let Some(id) = edit(block) else {
            return false;
        };
        chunk.set_block(local.x as usize, local.y as usize, id);
        log::debug!("Chunk {}: cell ({}, {}) set to {}", index, local.x, local.y, id);
        true
    }

    /// Split a global cell into chunk index and local cell
    fn resolve_cell(&self, cell: IVec2) -> Option<(usize, usize, usize)> {
        if cell.x < 0 || cell.y < 0 || cell.y as usize >= self.settings.chunk_height {
            return None;
        }
        let width = self.settings.chunk_width as i32;
        let index = (cell.x / width) as usize;
        (index < self.chunks.len()).then(|| (index, (cell.x % width) as usize, cell.y as usize))
    }

    /// Block at a global cell coordinate
    pub fn block_at_cell(&self, cell: IVec2) -> Option<Block> {
        let (index, x, y) = self.resolve_cell(cell)?;
        Some(self.chunks[index].get(x, y))
    }

    /// Background wall id at a global cell coordinate
    pub fn wall_at_cell(&self, cell: IVec2) -> Option<u16> {
        let (index, x, y) = self.resolve_cell(cell)?;
        Some(self.chunks[index].wall(x, y))
    }

    pub fn raycast(&self, from: Vec2, to: Vec2, max_steps: usize) -> Option<IVec2> {
        Raycasting::raycast(self, from, to, max_steps, RayTarget::Foreground)
    }

    pub fn raycast_with(&self, from: Vec2, to: Vec2, max_steps: usize, target: RayTarget) -> Option<IVec2> {
        Raycasting::raycast(self, from, to, max_steps, target)
    }

    /// Rebuild every dirty chunk and notify subscribers. Returns how many were rebuilt.
    pub fn update(&mut self) -> usize {
        let block_size = self.settings.block_size;
        let mut rebuilt = 0;

        for chunk in self.chunks.iter_mut().filter(|c| c.is_dirty()) {
            chunk.rebuild(&self.registry, &self.lighting, block_size);
            self.events.emit(WorldEvent::TerrainUpdated { chunk_id: chunk.id() });
            rebuilt += 1;
        }

        rebuilt
    }

    /// Surface row of a world column
    pub fn height_at(&self, world_column: i64) -> usize {
        self.generator.height_at(world_column, self.settings.chunk_height)
    }

    /// Colliders of every chunk overlapping the pixel span `[min_x, max_x]`
    pub fn colliders_in_span(&self, min_x: f32, max_x: f32) -> impl Iterator<Item = &Collider> + '_ {
        let first = self.settings.chunk_index_at(min_x).max(0);
        let last = self
            .settings
            .chunk_index_at(max_x)
            .min(self.chunks.len() as i64 - 1);
        let range = if first > last {
            0..0
        } else {
            first as usize..last as usize + 1
        };
        self.chunks[range].iter().flat_map(|c| c.colliders().iter())
    }

    /// Top-left position for a body standing on the first non-air cell of `column`
    pub fn spawn_point(&self, column: i32, body_size: Vec2) -> Vec2 {
        let bs = self.settings.block_size as f32;
        let ground = (0..self.settings.chunk_height as i32)
            .find(|&y| {
                self.block_at_cell(IVec2::new(column, y))
                    .is_some_and(|b| !b.is_air())
            })
            .unwrap_or(self.settings.chunk_height as i32);

        Vec2::new(
            column as f32 * bs + (bs - body_size.x) / 2.0,
            ground as f32 * bs - body_size.y,
        )
    }
}
