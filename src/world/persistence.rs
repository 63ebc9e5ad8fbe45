//! World save files: bincode record, lz4 compressed, written atomically

use crate::error::{WorldError, WorldResult};
use crate::physics::IRect;
use crate::world::{Chunk, WorldSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

/// Everything needed to rebuild a world. Light, meshes and colliders are derived
/// data and are recomputed on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub version: u32,
    pub seed: u64,
    pub block_size: u32,
    pub chunk_width: usize,
    pub chunk_height: usize,
    pub chunks: Vec<ChunkRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: usize,
    /// World pixel bounds
    pub bounds: IRect,
    /// Block ids, index = x * chunk_height + y
    pub blocks: Vec<u16>,
}

impl ChunkRecord {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id(),
            bounds: chunk.bounds(),
            blocks: chunk.block_ids(),
        }
    }
}

impl WorldRecord {
    pub fn settings(&self) -> WorldSettings {
        WorldSettings {
            block_size: self.block_size,
            chunk_width: self.chunk_width,
            chunk_height: self.chunk_height,
            chunk_count: self.chunks.len(),
        }
    }

    /// Reject records whose layout cannot be rebuilt or whose chunks are truncated
    pub fn validate(&self) -> WorldResult<()> {
        if self.version != FORMAT_VERSION {
            return Err(WorldError::UnsupportedVersion(self.version));
        }

        let expected = self.settings().validate()?;
        for chunk in &self.chunks {
            if chunk.blocks.len() != expected {
                return Err(WorldError::CorruptChunk {
                    chunk_id: chunk.id,
                    expected,
                    found: chunk.blocks.len(),
                });
            }
        }
        Ok(())
    }

    pub fn encode(&self) -> WorldResult<Vec<u8>> {
        let serialized = bincode_next::serde::encode_to_vec(self, bincode_next::config::standard())
            .map_err(|e| WorldError::Encode(e.to_string()))?;
        Ok(lz4_flex::compress_prepend_size(&serialized))
    }

    pub fn decode(bytes: &[u8]) -> WorldResult<Self> {
        let serialized = lz4_flex::decompress_size_prepended(bytes)?;
        let (record, _): (WorldRecord, _) =
            bincode_next::serde::decode_from_slice(&serialized, bincode_next::config::standard())
                .map_err(|e| {
                    log::error!("Bincode deserialization error: {:?}", e);
                    WorldError::Decode(e.to_string())
                })?;
        Ok(record)
    }
}

/// Save with compression. Written to a temp file first, then renamed over the target.
pub fn save_record(record: &WorldRecord, path: &Path) -> WorldResult<()> {
    let compressed = record.encode()?;
    let compressed_size = compressed.len();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WorldError::io(parent, e))?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, compressed).map_err(|e| WorldError::io(&temp_path, e))?;
    std::fs::rename(&temp_path, path).map_err(|e| WorldError::io(path, e))?;

    log::info!(
        "[SAVE] World seed {} - {} chunks - {} bytes compressed - {:?}",
        record.seed,
        record.chunks.len(),
        compressed_size,
        path
    );
    Ok(())
}

pub fn load_record(path: &Path) -> WorldResult<WorldRecord> {
    let compressed = std::fs::read(path).map_err(|e| WorldError::io(path, e))?;
    log::debug!("Read {} bytes from {:?}", compressed.len(), path);

    let record = WorldRecord::decode(&compressed)?;
    record.validate()?;

    log::info!(
        "[LOAD] World seed {} - {} chunks from {:?}",
        record.seed,
        record.chunks.len(),
        path
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    fn sample_record() -> WorldRecord {
        let mut blocks = vec![0u16; 4 * 8];
        blocks[5] = 3;
        blocks[30] = 2;
        WorldRecord {
            version: FORMAT_VERSION,
            seed: 12345,
            block_size: 16,
            chunk_width: 4,
            chunk_height: 8,
            chunks: vec![ChunkRecord {
                id: 0,
                bounds: IRect::new(IVec2::ZERO, IVec2::new(64, 128)),
                blocks,
            }],
        }
    }

    #[test]
    fn test_save_load_roundtrip() -> WorldResult<()> {
        let dir = tempfile::tempdir().map_err(|e| WorldError::io("tempdir", e))?;
        let path = dir.path().join("saves").join("world.bin");

        let record = sample_record();
        save_record(&record, &path)?;
        assert!(!path.with_extension("tmp").exists());

        let loaded = load_record(&path)?;
        assert_eq!(loaded, record);
        Ok(())
    }

    #[test]
    fn test_corrupt_payload_is_error() {
        let garbage = [1u8, 0, 0, 0, 9, 9, 9];
        assert!(WorldRecord::decode(&garbage).is_err());
    }

    #[test]
    fn test_validate_rejects_short_chunk() {
        let mut record = sample_record();
        record.chunks[0].blocks.pop();
        assert!(matches!(
            record.validate(),
            Err(WorldError::CorruptChunk { chunk_id: 0, expected: 32, found: 31 })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let mut record = sample_record();
        record.version = 99;
        assert!(matches!(record.validate(), Err(WorldError::UnsupportedVersion(99))));
    }

    #[test]
    fn test_validate_rejects_zero_width() {
        let mut record = sample_record();
        record.chunk_width = 0;
        record.chunks[0].blocks.clear();
        assert!(matches!(
            record.validate(),
            Err(WorldError::InvalidDimensions { chunk_width: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_overflowing_dimensions() {
        let mut record = sample_record();
        record.chunk_width = usize::MAX;
        record.chunk_height = 2;
        assert!(matches!(record.validate(), Err(WorldError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_world() {
        let mut record = sample_record();
        record.chunks.clear();
        assert!(matches!(
            record.validate(),
            Err(WorldError::InvalidDimensions { chunk_count: 0, .. })
        ));
    }

    #[test]
    fn test_load_rejects_zero_block_size() -> WorldResult<()> {
        let dir = tempfile::tempdir().map_err(|e| WorldError::io("tempdir", e))?;
        let path = dir.path().join("world.bin");

        let mut record = sample_record();
        record.block_size = 0;
        save_record(&record, &path)?;

        assert!(matches!(load_record(&path), Err(WorldError::InvalidDimensions { block_size: 0, .. })));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_record(Path::new("/no/such/world.bin"));
        assert!(matches!(result, Err(WorldError::Io { .. })));
    }
}
