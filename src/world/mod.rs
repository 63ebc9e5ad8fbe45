//! World management - chunks, generation, queries, saving

mod chunk;
#[allow(clippy::module_inception)]
mod world;
pub mod caves;
pub mod events;
pub mod generation;
pub mod greedy;
pub mod noise_field;
pub mod persistence;
pub mod raycasting;
pub mod worldgen_config;

pub use chunk::{Block, Chunk};
pub use events::WorldEvent;
pub use generation::{TerrainPalette, WorldGenerator};
pub use persistence::{ChunkRecord, WorldRecord};
pub use raycasting::{RayTarget, Raycasting};
pub use world::World;
pub use worldgen_config::WorldGenConfig;

use crate::error::{WorldError, WorldResult};
use serde::{Deserialize, Serialize};

/// Upper bound on cells in one chunk
pub const MAX_CHUNK_CELLS: usize = 1 << 24;

/// Fixed world layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSettings {
    /// Pixels per block edge
    pub block_size: u32,
    /// Blocks per chunk horizontally
    pub chunk_width: usize,
    /// Blocks per chunk vertically (the whole world height)
    pub chunk_height: usize,
    /// Chunks in the world, left to right
    pub chunk_count: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            block_size: 16,
            chunk_width: 32,
            chunk_height: 512,
            chunk_count: 50,
        }
    }
}

impl WorldSettings {
    /// Width of one chunk in pixels
    pub fn chunk_pixel_width(&self) -> f32 {
        (self.chunk_width as u32 * self.block_size) as f32
    }

    pub fn world_pixel_size(&self) -> glam::Vec2 {
        glam::Vec2::new(
            self.chunk_pixel_width() * self.chunk_count as f32,
            (self.chunk_height as u32 * self.block_size) as f32,
        )
    }

    /// World column of a chunk-local column
    pub fn world_column(&self, chunk_index: usize, local_x: usize) -> i64 {
        chunk_index as i64 * self.chunk_width as i64 + local_x as i64
    }

    /// Chunk index for a world x in pixels; may be outside `[0, chunk_count)`
    pub fn chunk_index_at(&self, x: f32) -> i64 {
        (x / self.block_size as f32 / self.chunk_width as f32).floor() as i64
    }

    /// Global grid cell containing a pixel position
    pub fn cell_at(&self, position: glam::Vec2) -> glam::IVec2 {
        (position / self.block_size as f32).floor().as_ivec2()
    }

    /// Check that a world with this layout can be built. Returns the cell count
    /// of one chunk.
    ///
    /// Every dimension must be non-zero, a chunk may hold at most
    /// [`MAX_CHUNK_CELLS`], and the world's pixel extent must fit in `i32`.
    pub fn validate(&self) -> WorldResult<usize> {
        let invalid = || WorldError::InvalidDimensions {
            chunk_width: self.chunk_width,
            chunk_height: self.chunk_height,
            chunk_count: self.chunk_count,
            block_size: self.block_size,
        };

        if self.block_size == 0 || self.chunk_width == 0 || self.chunk_height == 0 || self.chunk_count == 0 {
            return Err(invalid());
        }

        let cells = self
            .chunk_width
            .checked_mul(self.chunk_height)
            .filter(|&cells| cells <= MAX_CHUNK_CELLS)
            .ok_or_else(invalid)?;

        let fits_pixels = |blocks: Option<usize>| {
            blocks
                .and_then(|b| b.checked_mul(self.block_size as usize))
                .is_some_and(|px| px <= i32::MAX as usize)
        };
        if !fits_pixels(self.chunk_width.checked_mul(self.chunk_count)) || !fits_pixels(Some(self.chunk_height)) {
            return Err(invalid());
        }

        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{IVec2, Vec2};

    #[test]
    fn test_chunk_index_at() {
        let settings = WorldSettings::default();
        assert_eq!(settings.chunk_index_at(0.0), 0);
        assert_eq!(settings.chunk_index_at(511.9), 0);
        assert_eq!(settings.chunk_index_at(512.0), 1);
        assert_eq!(settings.chunk_index_at(-0.1), -1);
    }

    #[test]
    fn test_cell_at_floors_negative() {
        let settings = WorldSettings::default();
        assert_eq!(settings.cell_at(Vec2::new(40.0, 40.0)), IVec2::new(2, 2));
        assert_eq!(settings.cell_at(Vec2::new(-1.0, 15.9)), IVec2::new(-1, 0));
    }

    #[test]
    fn test_validate_layout() {
        let settings = WorldSettings::default();
        assert_eq!(settings.validate().unwrap(), 32 * 512);

        for broken in [
            WorldSettings { chunk_width: 0, ..settings },
            WorldSettings { chunk_height: 0, ..settings },
            WorldSettings { chunk_count: 0, ..settings },
            WorldSettings { block_size: 0, ..settings },
            WorldSettings { chunk_width: 1 << 13, chunk_height: 1 << 12, ..settings },
            WorldSettings { chunk_count: 1 << 24, ..settings },
        ] {
            assert!(
                matches!(broken.validate(), Err(WorldError::InvalidDimensions { .. })),
                "{:?}",
                broken
            );
        }
    }
}
