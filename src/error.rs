//! Error types for world loading, saving and block registry setup

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building, saving or loading a world.
#[derive(Error, Debug)]
pub enum WorldError {
    /// Filesystem failure while reading or writing world data.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The world record could not be serialized.
    #[error("failed to encode world: {0}")]
    Encode(String),

    /// The world record could not be deserialized.
    #[error("failed to decode world: {0}")]
    Decode(String),

    /// The compressed payload is corrupt.
    #[error("failed to decompress world: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    /// A world layout that cannot be built: zero or oversized dimensions.
    #[error(
        "invalid world dimensions: {chunk_count} chunks of {chunk_width}x{chunk_height} blocks, block size {block_size}"
    )]
    InvalidDimensions {
        chunk_width: usize,
        chunk_height: usize,
        chunk_count: usize,
        block_size: u32,
    },

    /// A chunk record has the wrong number of cells.
    #[error("chunk {chunk_id} has {found} cells, expected {expected}")]
    CorruptChunk {
        chunk_id: usize,
        expected: usize,
        found: usize,
    },

    /// The save was written by an unknown format version.
    #[error("unsupported world format version {0}")]
    UnsupportedVersion(u32),

    /// Block definition directory is missing or unreadable.
    #[error("block definition directory {0} cannot be read")]
    RegistryDir(PathBuf),
}

impl WorldError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type WorldResult<T> = Result<T, WorldError>;
