//! Simulation systems - block catalog and lighting

mod blocks;
pub mod light;

pub use blocks::{BlockId, BlockRegistry, BlockType, CollisionClass};
pub use light::{LightPropagator, LightingConfig, MAX_LIGHT_LEVEL, MIN_LIGHT_LEVEL};
