//! Raycasting utilities for block picking and line-of-sight queries

use super::World;
use glam::{IVec2, Vec2};

/// Which layers stop a ray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RayTarget {
    /// Non-air terrain only
    #[default]
    Foreground,
    /// Terrain or background walls
    IncludeWalls,
}

enum CellState {
    Outside,
    Empty,
    Hit,
}

/// Raycasting utilities - stateless grid traversal over a world
pub struct Raycasting;

impl Raycasting {
    /// Grid DDA from `from` toward `to` (both in world pixels).
    ///
    /// The origin cell is tested first, then the ray advances one grid line at a
    /// time, up to `max_steps` advances. Returns the global cell coordinate of the
    /// first hit, or `None` if the ray is degenerate, runs out of steps, or leaves
    /// the world.
    pub fn raycast(world: &World, from: Vec2, to: Vec2, max_steps: usize, target: RayTarget) -> Option<IVec2> {
        let block_size = world.settings().block_size as f32;
        let direction = (to - from).normalize_or_zero();
        if direction == Vec2::ZERO || !from.is_finite() {
            return None;
        }

        let start = from / block_size;
        let mut cell = start.floor().as_ivec2();
        let step = IVec2::new(direction.x.signum() as i32, direction.y.signum() as i32);

        // Ray length to cross one full cell on each axis
        let t_delta = Vec2::new(
            if direction.x != 0.0 { 1.0 / direction.x.abs() } else { f32::INFINITY },
            if direction.y != 0.0 { 1.0 / direction.y.abs() } else { f32::INFINITY },
        );

        // Ray length to the first grid line on each axis
        let first_boundary = |start: f32, cell: i32, dir: f32, delta: f32| {
            if dir > 0.0 {
                (cell as f32 + 1.0 - start) * delta
            } else if dir < 0.0 {
                (start - cell as f32) * delta
            } else {
                f32::INFINITY
            }
        };
        let mut t_max = Vec2::new(
            first_boundary(start.x, cell.x, direction.x, t_delta.x),
            first_boundary(start.y, cell.y, direction.y, t_delta.y),
        );

        match Self::classify(world, cell, target) {
            CellState::Outside => return None,
            CellState::Hit => return Some(cell),
            CellState::Empty => {}
        }

        for _ in 0..max_steps {
            if t_max.x < t_max.y {
                cell.x += step.x;
                t_max.x += t_delta.x;
            } else {
                cell.y += step.y;
                t_max.y += t_delta.y;
            }

            match Self::classify(world, cell, target) {
                CellState::Outside => return None,
                CellState::Hit => return Some(cell),
                CellState::Empty => {}
            }
        }

        None
    }

    fn classify(world: &World, cell: IVec2, target: RayTarget) -> CellState {
        let Some(block) = world.block_at_cell(cell) else {
            return CellState::Outside;
        };
        let wall_hit = target == RayTarget::IncludeWalls && world.wall_at_cell(cell).is_some_and(|w| w != 0);
        if !block.is_air() || wall_hit {
            CellState::Hit
        } else {
            CellState::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{BlockId, BlockRegistry};
    use crate::world::events::EventSink;
    use crate::world::WorldSettings;
    use std::sync::Arc;

    fn test_world() -> World {
        let settings = WorldSettings {
            block_size: 16,
            chunk_width: 8,
            chunk_height: 8,
            chunk_count: 2,
        };
        World::empty(settings, Arc::new(BlockRegistry::with_defaults()), EventSink::disconnected())
    }

    #[test]
    fn test_hit_in_origin_cell() {
        let mut world = test_world();
        assert!(world.place_block(Vec2::new(40.0, 40.0), BlockId::STONE));
        let hit = Raycasting::raycast(&world, Vec2::new(40.0, 40.0), Vec2::new(10.0, 40.0), 6, RayTarget::Foreground);
        assert_eq!(hit, Some(IVec2::new(2, 2)));
    }

    #[test]
    fn test_steps_toward_target() {
        let mut world = test_world();
        world.place_block(Vec2::new(40.0, 40.0), BlockId::STONE);

        // From cell (6, 2) it takes four steps to reach (2, 2)
        let from = Vec2::new(100.0, 40.0);
        let to = Vec2::new(10.0, 40.0);
        assert_eq!(Raycasting::raycast(&world, from, to, 3, RayTarget::Foreground), None);
        assert_eq!(
            Raycasting::raycast(&world, from, to, 4, RayTarget::Foreground),
            Some(IVec2::new(2, 2))
        );
    }

    #[test]
    fn test_crosses_chunk_boundary() {
        let mut world = test_world();
        // Cell (9, 3) lives in chunk 1
        world.place_block(Vec2::new(9.0 * 16.0 + 1.0, 3.0 * 16.0 + 1.0), BlockId::DIRT);
        let hit = Raycasting::raycast(&world, Vec2::new(8.0, 56.0), Vec2::new(250.0, 56.0), 20, RayTarget::Foreground);
        assert_eq!(hit, Some(IVec2::new(9, 3)));
    }

    #[test]
    fn test_diagonal_ray() {
        let mut world = test_world();
        world.place_block(Vec2::new(5.0 * 16.0 + 8.0, 5.0 * 16.0 + 8.0), BlockId::STONE);
        let hit = Raycasting::raycast(&world, Vec2::new(8.0, 8.0), Vec2::new(120.0, 120.0), 20, RayTarget::Foreground);
        assert_eq!(hit, Some(IVec2::new(5, 5)));
    }

    #[test]
    fn test_leaving_world_is_miss() {
        let mut world = test_world();
        world.place_block(Vec2::new(200.0, 40.0), BlockId::STONE);
        // Pointing left, away from the block, exits at x < 0
        let hit = Raycasting::raycast(&world, Vec2::new(40.0, 40.0), Vec2::new(0.0, 40.0), 100, RayTarget::Foreground);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_zero_direction_is_miss() {
        let world = test_world();
        let p = Vec2::new(40.0, 40.0);
        assert_eq!(Raycasting::raycast(&world, p, p, 10, RayTarget::Foreground), None);
    }

    #[test]
    fn test_walls_only_hit_when_requested() {
        let settings = WorldSettings {
            block_size: 16,
            chunk_width: 8,
            chunk_height: 16,
            chunk_count: 1,
        };
        let registry = Arc::new(BlockRegistry::with_defaults());
        let world = World::generate(
            7,
            settings,
            crate::world::WorldGenConfig::default(),
            crate::simulation::light::LightingConfig::default(),
            registry,
            EventSink::disconnected(),
        );
        let surface = world.height_at(0) as i32;
        let from = Vec2::new(8.0, 1.0);
        let down = Vec2::new(8.0, 255.0);

        let wall_hit = Raycasting::raycast(&world, from, down, 32, RayTarget::IncludeWalls);
        assert_eq!(wall_hit, Some(IVec2::new(0, surface)));

        // Caves may hollow the surface cell, so terrain is hit at or below it
        let terrain_hit = Raycasting::raycast(&world, from, down, 32, RayTarget::Foreground);
        assert!(terrain_hit.map_or(true, |cell| cell.y >= surface));
    }
}
