//! Chunk geometry: per-cell terrain quads and greedy-merged background walls

use crate::simulation::light::{MAX_LIGHT_LEVEL, MIN_LIGHT_LEVEL};
use crate::simulation::BlockRegistry;
use crate::world::greedy::greedy_merge;
use crate::world::Chunk;
use glam::Vec2;

/// Vertex layout shared with the draw layer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World pixels
    pub position: [f32; 2],
    /// Atlas pixels for terrain, tile units for walls
    pub tex_coords: [f32; 2],
    pub color: [u8; 4],
    /// Atlas slot
    pub tile: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw vertex bytes for buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn push_quad(&mut self, min: Vec2, max: Vec2, uv_min: Vec2, uv_max: Vec2, color: [u8; 4], tile: u32) {
        let base = self.vertices.len() as u32;
        let corners = [
            (Vec2::new(min.x, min.y), Vec2::new(uv_min.x, uv_min.y)),
            (Vec2::new(max.x, min.y), Vec2::new(uv_max.x, uv_min.y)),
            (Vec2::new(max.x, max.y), Vec2::new(uv_max.x, uv_max.y)),
            (Vec2::new(min.x, max.y), Vec2::new(uv_min.x, uv_max.y)),
        ];
        for (position, uv) in corners {
            self.vertices.push(Vertex {
                position: position.to_array(),
                tex_coords: uv.to_array(),
                color,
                tile,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Both layers of a chunk
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    pub foreground: Mesh,
    pub background: Mesh,
}

impl ChunkMesh {
    pub fn quad_count(&self) -> usize {
        self.foreground.quad_count() + self.background.quad_count()
    }
}

/// Grey tint for a light level
pub fn light_tint(light: u8) -> [u8; 4] {
    let level = light.clamp(MIN_LIGHT_LEVEL, MAX_LIGHT_LEVEL) as f32 / MAX_LIGHT_LEVEL as f32;
    let grey = (level * 255.0) as u8;
    [grey, grey, grey, 255]
}

pub struct ChunkMesher;

impl ChunkMesher {
    pub fn build(chunk: &Chunk, registry: &BlockRegistry, block_size: u32) -> ChunkMesh {
        ChunkMesh {
            foreground: Self::build_foreground(chunk, registry, block_size),
            background: Self::build_background(chunk, registry, block_size),
        }
    }

    /// One lit quad per visible terrain cell
    pub fn build_foreground(chunk: &Chunk, registry: &BlockRegistry, block_size: u32) -> Mesh {
        let mut mesh = Mesh::default();
        let origin = chunk.bounds().position.as_vec2();
        let bs = block_size as f32;

        for x in 0..chunk.width() {
            for (y, block) in chunk.column(x).iter().enumerate() {
                if block.is_air() {
                    continue;
                }
                // Blocks without an atlas slot are invisible
                let Some(slot) = registry.get(block.id).atlas_slot else {
                    continue;
                };

                let min = origin + Vec2::new(x as f32, y as f32) * bs;
                let uv_min = Vec2::new(slot as f32 * bs, 0.0);
                mesh.push_quad(
                    min,
                    min + Vec2::splat(bs),
                    uv_min,
                    uv_min + Vec2::splat(bs),
                    light_tint(block.light),
                    slot as u32,
                );
            }
        }

        mesh
    }

    /// Background walls merged into as few quads as possible; texture coordinates
    /// count tiles so a repeating sampler can tile them
    pub fn build_background(chunk: &Chunk, registry: &BlockRegistry, block_size: u32) -> Mesh {
        let mut mesh = Mesh::default();
        let origin = chunk.bounds().position.as_vec2();
        let bs = block_size as f32;

        let rects = greedy_merge(chunk.width(), chunk.height(), |x, y| {
            let wall = chunk.wall(x, y);
            registry.get(wall).background.then_some(wall)
        });

        for rect in rects {
            let Some(slot) = registry.get(rect.key).atlas_slot else {
                continue;
            };
            let min = origin + Vec2::new(rect.x as f32, rect.y as f32) * bs;
            let tiles = Vec2::new(rect.width as f32, rect.height as f32);
            mesh.push_quad(min, min + tiles * bs, Vec2::ZERO, tiles, [255; 4], slot as u32);
        }

        mesh
    }
}
