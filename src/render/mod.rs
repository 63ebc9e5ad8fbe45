//! Rendering data - chunk vertex buffers, drawn by an external renderer

pub mod mesh;

pub use mesh::{ChunkMesh, ChunkMesher, Mesh, Vertex};
