//! Merged terrain colliders

use crate::physics::rect::Rect;
use crate::simulation::{BlockRegistry, CollisionClass};
use crate::world::greedy::greedy_merge;
use crate::world::Chunk;
use glam::Vec2;

/// Axis-aligned collision rectangle in world pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub rect: Rect,
    pub class: CollisionClass,
}

impl Collider {
    pub fn new(rect: Rect, class: CollisionClass) -> Self {
        Self { rect, class }
    }

    pub fn solid(rect: Rect) -> Self {
        Self::new(rect, CollisionClass::Solid)
    }

    pub fn platform(rect: Rect) -> Self {
        Self::new(rect, CollisionClass::Platform)
    }
}

/// Builds the minimal collider set for a chunk
pub struct ColliderMerger;

impl ColliderMerger {
    /// Merge colliding cells of a `width x height` grid whose top-left corner sits at `origin`.
    pub fn merge_grid<F>(width: usize, height: usize, origin: Vec2, block_size: f32, class_at: F) -> Vec<Collider>
    where
        F: Fn(usize, usize) -> CollisionClass,
    {
        greedy_merge(width, height, |x, y| {
            let class = class_at(x, y);
            class.collides().then_some(class)
        })
        .into_iter()
        .map(|m| {
            let position = origin + Vec2::new(m.x as f32, m.y as f32) * block_size;
            let size = Vec2::new(m.width as f32, m.height as f32) * block_size;
            Collider::new(Rect::new(position, size), m.key)
        })
        .collect()
    }

    pub fn merge_chunk(chunk: &Chunk, registry: &BlockRegistry, block_size: f32) -> Vec<Collider> {
        let colliders = Self::merge_grid(
            chunk.width(),
            chunk.height(),
            chunk.bounds().position.as_vec2(),
            block_size,
            |x, y| registry.get(chunk.get(x, y).id).collision,
        );
        log::debug!("Chunk {}: merged {} colliders", chunk.id(), colliders.len());
        colliders
    }
}
