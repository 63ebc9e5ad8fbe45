//! Chunk - fixed-width vertical slice of the world

use crate::physics::{Collider, ColliderMerger, IRect};
use crate::render::{ChunkMesh, ChunkMesher};
use crate::simulation::light::{LightPropagator, LightingConfig};
use crate::simulation::{BlockId, BlockRegistry};
use glam::IVec2;

/// A single cell in the world
#[derive(Clone, Copy, Debug)]
pub struct Block {
    /// Block type (0 = air)
    pub id: u16,
    /// Light level, recomputed on every relight and never persisted
    pub light: u8,
}

impl Block {
    pub const AIR: Block = Block { id: BlockId::AIR, light: 1 };

    pub fn new(id: u16) -> Self {
        Self { id, light: 1 }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == BlockId::AIR
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::AIR
    }
}

// Grid logic only cares about the block type
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Block {}

/// A `width x height` column of blocks plus its derived mesh and colliders
pub struct Chunk {
    id: usize,
    /// World pixel bounds
    bounds: IRect,
    width: usize,
    height: usize,

    /// Foreground cells, column-major: index = x * height + y
    blocks: Vec<Block>,

    /// Background wall type per cell (0 = no wall), same layout as `blocks`
    walls: Vec<u16>,

    /// Set by block edits, cleared by `rebuild`
    dirty: bool,

    mesh: ChunkMesh,
    colliders: Vec<Collider>,
}

impl Chunk {
    pub fn new(id: usize, width: usize, height: usize, block_size: u32) -> Self {
        let bs = block_size as i32;
        let bounds = IRect::new(
            IVec2::new(id as i32 * width as i32 * bs, 0),
            IVec2::new(width as i32 * bs, height as i32 * bs),
        );
        Self {
            id,
            bounds,
            width,
            height,
            blocks: vec![Block::AIR; width * height],
            walls: vec![BlockId::AIR; width * height],
            dirty: false,
            mesh: ChunkMesh::default(),
            colliders: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn bounds(&self) -> IRect {
        self.bounds
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        x * self.height + y
    }

    /// Whether signed local coordinates fall inside the grid
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Block {
        self.blocks[self.index(x, y)]
    }

    /// Bounds-checked lookup with signed local coordinates
    pub fn try_get(&self, x: i32, y: i32) -> Option<Block> {
        self.in_bounds(x, y).then(|| self.get(x as usize, y as usize))
    }

    /// Set a block and mark the chunk for rebuild
    pub fn set_block(&mut self, x: usize, y: usize, id: u16) {
        self.fill_block(x, y, id);
        self.dirty = true;
    }

    /// Set a block without touching the dirty flag (generation and loading)
    #[inline]
    pub fn fill_block(&mut self, x: usize, y: usize, id: u16) {
        let idx = self.index(x, y);
        self.blocks[idx] = Block::new(id);
    }

    #[inline]
    pub fn wall(&self, x: usize, y: usize) -> u16 {
        self.walls[self.index(x, y)]
    }

    #[inline]
    pub fn set_wall(&mut self, x: usize, y: usize, id: u16) {
        let idx = self.index(x, y);
        self.walls[idx] = id;
    }

    #[inline]
    pub fn light(&self, x: usize, y: usize) -> u8 {
        self.get(x, y).light
    }

    /// All cells in storage order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// One column, top to bottom
    pub fn column(&self, x: usize) -> &[Block] {
        let start = x * self.height;
        &self.blocks[start..start + self.height]
    }

    /// Block ids in storage order, for persistence
    pub fn block_ids(&self) -> Vec<u16> {
        self.blocks.iter().map(|b| b.id).collect()
    }

    pub fn count_non_air(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    /// Relight, remesh and re-merge colliders, then clear the dirty flag
    pub fn rebuild(&mut self, registry: &BlockRegistry, lighting: &LightingConfig, block_size: u32) {
        LightPropagator::new(lighting.clone()).propagate(self, registry);
        self.mesh = ChunkMesher::build(self, registry, block_size);
        self.colliders = ColliderMerger::merge_chunk(self, registry, block_size as f32);
        self.dirty = false;
        log::debug!(
            "Chunk {} rebuilt: {} quads, {} colliders",
            self.id,
            self.mesh.quad_count(),
            self.colliders.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_access() {
        let mut chunk = Chunk::new(0, 32, 64, 16);

        chunk.fill_block(10, 20, 5);
        assert_eq!(chunk.get(10, 20).id, 5);

        chunk.fill_block(0, 0, 1);
        chunk.fill_block(31, 63, 2);
        assert_eq!(chunk.get(0, 0).id, 1);
        assert_eq!(chunk.get(31, 63).id, 2);
        assert_eq!(chunk.column(31)[63].id, 2);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_set_block_marks_dirty() {
        let mut chunk = Chunk::new(0, 4, 4, 16);
        chunk.set_block(1, 1, BlockId::STONE);
        assert!(chunk.is_dirty());
    }

    #[test]
    fn test_block_equality_ignores_light() {
        let lit = Block { id: 3, light: 10 };
        let dark = Block { id: 3, light: 1 };
        assert_eq!(lit, dark);
        assert_ne!(lit, Block::AIR);
    }

    #[test]
    fn test_bounds_follow_chunk_index() {
        let chunk = Chunk::new(3, 32, 512, 16);
        assert_eq!(chunk.bounds().position, IVec2::new(3 * 32 * 16, 0));
        assert_eq!(chunk.bounds().size, IVec2::new(512, 8192));
    }

    #[test]
    fn test_try_get_out_of_range() {
        let chunk = Chunk::new(0, 4, 4, 16);
        assert!(chunk.try_get(-1, 0).is_none());
        assert!(chunk.try_get(0, 4).is_none());
        assert_eq!(chunk.try_get(3, 3), Some(Block::AIR));
    }

    #[test]
    fn test_rebuild_clears_dirty() {
        let registry = BlockRegistry::with_defaults();
        let mut chunk = Chunk::new(0, 4, 4, 16);
        chunk.set_block(2, 2, BlockId::STONE);
        chunk.rebuild(&registry, &LightingConfig::default(), 16);
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.mesh().foreground.quad_count(), 1);
        assert_eq!(chunk.colliders().len(), 1);
    }
}
