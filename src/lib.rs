//! # Blockworld - 2D Block Sandbox Core
//!
//! Procedural terrain in a strip of chunks, flood-fill lighting, greedy
//! collider merging, and a character controller. Rendering is left to the
//! caller, which consumes the chunk meshes.

pub mod app;
pub mod config;
pub mod entity;
pub mod error;
pub mod physics;
pub mod render;
pub mod simulation;
pub mod world;

pub use app::App;
pub use error::{WorldError, WorldResult};

/// Common imports for internal use
pub mod prelude {
    pub use crate::simulation::{BlockId, BlockRegistry, BlockType};
    pub use crate::world::{Block, Chunk, World, WorldSettings};
    pub use glam::{IVec2, Vec2};
}
