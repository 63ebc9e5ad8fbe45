//! Light propagation system
//!
//! Implements flood-fill light propagation over one chunk.
//! Light levels range from 1 (dark) to MAX_LIGHT_LEVEL (open sky).

use crate::simulation::BlockRegistry;
use crate::world::{Block, Chunk};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const MAX_LIGHT_LEVEL: u8 = 10;
pub const MIN_LIGHT_LEVEL: u8 = 1;

/// Lighting behaviour switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingConfig {
    /// Seed cliff faces that border open sky in a neighbouring column
    pub side_exposure: bool,
    /// Requeue a cell every time it receives a brighter offer.
    /// Off by default: each cell is relaxed at most once per run.
    pub exact_relaxation: bool,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            side_exposure: true,
            exact_relaxation: false,
        }
    }
}

/// Light propagation manager
pub struct LightPropagator {
    config: LightingConfig,
    /// Queue for flood-fill algorithm (local_x, local_y)
    queue: VecDeque<(usize, usize)>,
}

impl LightPropagator {
    pub fn new(config: LightingConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
        }
    }

    /// Recompute every light level in the chunk
    pub fn propagate(&mut self, chunk: &mut Chunk, registry: &BlockRegistry) {
        let width = chunk.width();
        let height = chunk.height();
        if width == 0 || height == 0 {
            return;
        }

        let surfaces = Self::find_surfaces(chunk, registry);
        let seeds = self.seed(chunk, registry, &surfaces);

        self.queue.clear();
        self.queue.extend(seeds);
        let seeded = self.queue.len();

        self.flood_fill(chunk.blocks_mut(), width, height);

        log::trace!("Chunk {}: light flood from {} seeds", chunk.id(), seeded);
    }

    /// First non-transparent row of every column, `None` for open columns
    fn find_surfaces(chunk: &Chunk, registry: &BlockRegistry) -> Vec<Option<usize>> {
        let surface_of = |x: usize| {
            chunk
                .column(x)
                .iter()
                .position(|b| !registry.get(b.id).transparent)
        };

        #[cfg(feature = "parallel")]
        let surfaces = (0..chunk.width()).into_par_iter().map(surface_of).collect();

        #[cfg(not(feature = "parallel"))]
        let surfaces = (0..chunk.width()).map(surface_of).collect();

        surfaces
    }

    /// Reset levels and collect the flood sources, one worker per column
    fn seed(&self, chunk: &mut Chunk, registry: &BlockRegistry, surfaces: &[Option<usize>]) -> Vec<(usize, usize)> {
        let height = chunk.height();
        let seeds = Mutex::new(Vec::new());
        let config = &self.config;

        let seed_column = |(x, column): (usize, &mut [Block])| {
            Self::seed_column(x, column, registry, surfaces, config, &seeds);
        };

        #[cfg(feature = "parallel")]
        chunk
            .blocks_mut()
            .par_chunks_mut(height)
            .enumerate()
            .for_each(seed_column);

        #[cfg(not(feature = "parallel"))]
        chunk
            .blocks_mut()
            .chunks_mut(height)
            .enumerate()
            .for_each(seed_column);

        // Workers finish in any order; BFS results depend on queue order
        let mut seeds = seeds.into_inner();
        seeds.sort_unstable();
        seeds
    }

    fn seed_column(
        x: usize,
        column: &mut [Block],
        registry: &BlockRegistry,
        surfaces: &[Option<usize>],
        config: &LightingConfig,
        seeds: &Mutex<Vec<(usize, usize)>>,
    ) {
        // A row is open sky in column `nx` if it lies above that column's surface
        let open_at = |nx: usize, y: usize| surfaces.get(nx).is_some_and(|s| s.map_or(true, |s| y < s));
        let surface = surfaces[x];

        for (y, block) in column.iter_mut().enumerate() {
            let def = registry.get(block.id);
            let emission = def.light_emission.clamp(MIN_LIGHT_LEVEL, MAX_LIGHT_LEVEL);
            block.light = emission;

            let sky_exposed = surface == Some(y)
                || (config.side_exposure
                    && !def.transparent
                    && ((x > 0 && open_at(x - 1, y)) || open_at(x + 1, y)));

            if sky_exposed {
                block.light = MAX_LIGHT_LEVEL;
            }

            if sky_exposed || emission > MIN_LIGHT_LEVEL {
                seeds.lock().push((x, y));
            }
        }
    }

    /// Breadth-first spread, each step loses one level
    fn flood_fill(&mut self, blocks: &mut [Block], width: usize, height: usize) {
        let mut processed = vec![false; width * height];
        let exact = self.config.exact_relaxation;

        while let Some((x, y)) = self.queue.pop_front() {
            let light = blocks[x * height + y].light;
            if light <= MIN_LIGHT_LEVEL {
                continue;
            }
            let offer = light - 1;

            let neighbors = [
                (x, y + 1),
                (x, y.wrapping_sub(1)),
                (x + 1, y),
                (x.wrapping_sub(1), y),
            ];

            for (nx, ny) in neighbors {
                if nx >= width || ny >= height {
                    continue;
                }
                let idx = nx * height + ny;
                if processed[idx] && !exact {
                    continue;
                }
                if blocks[idx].light < offer {
                    blocks[idx].light = offer;
                    processed[idx] = true;
                    self.queue.push_back((nx, ny));
                }
            }
        }
    }
}

impl Default for LightPropagator {
    fn default() -> Self {
        Self::new(LightingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::BlockId;

    fn lights_of_column(chunk: &Chunk, x: usize) -> Vec<u8> {
        chunk.column(x).iter().map(|b| b.light).collect()
    }

    #[test]
    fn test_single_column_falloff() {
        let registry = BlockRegistry::with_defaults();
        let mut chunk = Chunk::new(0, 1, 5, 16);
        for y in 0..5 {
            chunk.fill_block(0, y, BlockId::STONE);
        }

        LightPropagator::default().propagate(&mut chunk, &registry);

        assert_eq!(lights_of_column(&chunk, 0), vec![10, 9, 8, 7, 6]);
    }

    #[test]
    fn test_light_bounds_and_sky_seeds() {
        let registry = BlockRegistry::with_defaults();
        let mut chunk = Chunk::new(0, 8, 40, 16);
        for x in 0..8 {
            for y in (10 + x)..40 {
                chunk.fill_block(x, y, BlockId::STONE);
            }
        }
        chunk.fill_block(3, 30, BlockId::TORCH);

        LightPropagator::default().propagate(&mut chunk, &registry);

        for block in chunk.blocks() {
            assert!((MIN_LIGHT_LEVEL..=MAX_LIGHT_LEVEL).contains(&block.light));
        }
        for x in 0..8 {
            assert_eq!(chunk.light(x, 10 + x), MAX_LIGHT_LEVEL);
        }
        assert!(chunk.light(3, 30) >= 8);
        assert_eq!(chunk.light(3, 39), MIN_LIGHT_LEVEL);
    }

    #[test]
    fn test_side_exposure_lights_cliff_face() {
        let registry = BlockRegistry::with_defaults();
        // Column 0 is a tall pillar, column 1 is open down to row 8
        let mut chunk = Chunk::new(0, 2, 10, 16);
        for y in 2..10 {
            chunk.fill_block(0, y, BlockId::STONE);
        }
        chunk.fill_block(1, 8, BlockId::STONE);
        chunk.fill_block(1, 9, BlockId::STONE);

        LightPropagator::default().propagate(&mut chunk, &registry);
        assert_eq!(chunk.light(0, 7), MAX_LIGHT_LEVEL);

        let mut propagator = LightPropagator::new(LightingConfig {
            side_exposure: false,
            ..LightingConfig::default()
        });
        propagator.propagate(&mut chunk, &registry);
        assert!(chunk.light(0, 7) < MAX_LIGHT_LEVEL);
    }

    #[test]
    fn test_single_visit_versus_exact_relaxation() {
        let registry = BlockRegistry::with_defaults();
        // One row: torch, four air cells, stone that catches the sky
        let build = || {
            let mut chunk = Chunk::new(0, 6, 1, 16);
            chunk.fill_block(0, 0, BlockId::TORCH);
            chunk.fill_block(5, 0, BlockId::STONE);
            chunk
        };

        let mut fast = build();
        LightPropagator::default().propagate(&mut fast, &registry);
        let fast_levels: Vec<u8> = (0..6).map(|x| fast.light(x, 0)).collect();
        assert_eq!(fast_levels, vec![8, 7, 6, 8, 9, 10]);

        let mut exact = build();
        LightPropagator::new(LightingConfig {
            exact_relaxation: true,
            ..LightingConfig::default()
        })
        .propagate(&mut exact, &registry);
        let exact_levels: Vec<u8> = (0..6).map(|x| exact.light(x, 0)).collect();
        assert_eq!(exact_levels, vec![8, 7, 7, 8, 9, 10]);
    }

    #[test]
    fn test_empty_column_stays_dark() {
        let registry = BlockRegistry::with_defaults();
        let mut chunk = Chunk::new(0, 1, 4, 16);
        LightPropagator::default().propagate(&mut chunk, &registry);
        assert_eq!(lights_of_column(&chunk, 0), vec![1, 1, 1, 1]);
    }
}
