//! Cave carving - removes material where blended noise density is low

use crate::simulation::BlockId;
use crate::world::noise_field::NoiseField;
use crate::world::worldgen_config::CaveParams;
use crate::world::Chunk;

pub struct CaveCarver<'a> {
    noise: &'a NoiseField,
    params: &'a CaveParams,
    /// Terrain amplitude, reused to scale the vertical falloff
    amplitude: f32,
}

impl<'a> CaveCarver<'a> {
    pub fn new(noise: &'a NoiseField, params: &'a CaveParams, amplitude: f32) -> Self {
        Self {
            noise,
            params,
            amplitude,
        }
    }

    /// Density in `[0, 4]` at a world cell; low values are hollow
    pub fn density(&self, world_x: i64, y: usize, chunk_height: usize) -> f32 {
        let (fx, fy) = (world_x as f32, y as f32);
        let terrain = self.noise.terrain(fx, fy);
        let cave = self.noise.cave(fx, fy);
        let blended = terrain + (cave - terrain) * self.params.cave_weight;
        let mut density = (blended + 1.0) / 2.0;

        if self.params.vertical_falloff {
            let middle = chunk_height as f32 / 2.0;
            let distance = (density * self.amplitude - middle).abs();
            density *= (-(distance / middle).powi(2)).exp() * 4.0;
        }

        density
    }

    /// Carve one chunk in place. Air is never touched, so carving only removes.
    /// Returns the number of cells hollowed out.
    pub fn carve(&self, chunk: &mut Chunk) -> usize {
        if !self.params.enabled {
            return 0;
        }

        let height = chunk.height();
        let column_offset = chunk.id() as i64 * chunk.width() as i64;
        let mut carved = 0;

        for x in 0..chunk.width() {
            let world_x = column_offset + x as i64;
            for y in 0..height {
                if chunk.get(x, y).is_air() {
                    continue;
                }
                if self.density(world_x, y, height) < self.params.threshold {
                    chunk.fill_block(x, y, BlockId::AIR);
                    carved += 1;
                }
            }
        }

        carved
    }
}
