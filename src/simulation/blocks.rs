//! Block definitions and registry

use crate::error::{WorldError, WorldResult};
use glam::UVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Built-in block IDs
pub struct BlockId;

impl BlockId {
    pub const AIR: u16 = 0;
    pub const GRASS: u16 = 1;
    pub const DIRT: u16 = 2;
    pub const STONE: u16 = 3;
    pub const DIRT_WALL: u16 = 4;
    pub const TORCH: u16 = 5;
    pub const WOOD_PLATFORM: u16 = 6;
}

/// How a block takes part in collision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionClass {
    #[default]
    None,
    /// Blocks movement on both axes
    Solid,
    /// One-way: blocks only bodies landing from above
    Platform,
}

impl CollisionClass {
    pub fn collides(self) -> bool {
        self != CollisionClass::None
    }
}

fn default_emission() -> u8 {
    1
}

/// Immutable properties shared by every cell of one block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    pub id: u16,
    pub name: String,
    #[serde(default)]
    pub collision: CollisionClass,
    /// Lets sky light pass to the cell below during seeding
    #[serde(default)]
    pub transparent: bool,
    /// Light emitted by the block itself (1 = none)
    #[serde(default = "default_emission")]
    pub light_emission: u8,
    /// Column in the tile atlas, `None` for blocks that are never drawn
    #[serde(default)]
    pub atlas_slot: Option<u16>,
    /// Background wall tile, drawn behind terrain
    #[serde(default)]
    pub background: bool,
}

impl BlockType {
    pub fn air() -> Self {
        Self {
            id: BlockId::AIR,
            name: "air".to_string(),
            collision: CollisionClass::None,
            transparent: true,
            light_emission: 1,
            atlas_slot: None,
            background: false,
        }
    }

    pub fn is_air(&self) -> bool {
        self.id == BlockId::AIR
    }
}

/// Registry of all block types, indexed by id
pub struct BlockRegistry {
    air: BlockType,
    blocks: Vec<Option<BlockType>>,
    by_name: HashMap<String, u16>,
}

impl BlockRegistry {
    /// Registry containing only air
    pub fn empty() -> Self {
        let air = BlockType::air();
        let mut by_name = HashMap::new();
        by_name.insert(air.name.clone(), air.id);
        Self {
            air: air.clone(),
            blocks: vec![Some(air)],
            by_name,
        }
    }

    /// Registry with the built-in terrain blocks
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register(BlockType {
            id: BlockId::GRASS,
            name: "grass".to_string(),
            collision: CollisionClass::Solid,
            transparent: false,
            light_emission: 1,
            atlas_slot: Some(0),
            background: false,
        });

        self.register(BlockType {
            id: BlockId::DIRT,
            name: "dirt".to_string(),
            collision: CollisionClass::Solid,
            transparent: false,
            light_emission: 1,
            atlas_slot: Some(1),
            background: false,
        });

        self.register(BlockType {
            id: BlockId::STONE,
            name: "stone".to_string(),
            collision: CollisionClass::Solid,
            transparent: false,
            light_emission: 1,
            atlas_slot: Some(2),
            background: false,
        });

        // Background only, never placed in the foreground grid by generation
        self.register(BlockType {
            id: BlockId::DIRT_WALL,
            name: "dirt_wall".to_string(),
            collision: CollisionClass::None,
            transparent: true,
            light_emission: 1,
            atlas_slot: Some(3),
            background: true,
        });

        self.register(BlockType {
            id: BlockId::TORCH,
            name: "torch".to_string(),
            collision: CollisionClass::None,
            transparent: true,
            light_emission: 8,
            atlas_slot: Some(4),
            background: false,
        });

        self.register(BlockType {
            id: BlockId::WOOD_PLATFORM,
            name: "wood_platform".to_string(),
            collision: CollisionClass::Platform,
            transparent: true,
            light_emission: 1,
            atlas_slot: Some(5),
            background: false,
        });
    }

    /// Add or replace a block type. Air cannot be replaced.
    pub fn register(&mut self, block: BlockType) -> bool {
        if block.id == BlockId::AIR {
            log::warn!("Refusing to redefine air (block '{}')", block.name);
            return false;
        }

        let id = block.id as usize;
        if self.blocks.len() <= id {
            self.blocks.resize(id + 1, None);
        }

        if let Some(previous) = self.blocks[id].take() {
            log::warn!(
                "Block id {} redefined: '{}' replaces '{}'",
                block.id,
                block.name,
                previous.name
            );
            self.by_name.remove(&previous.name);
        }

        self.by_name.insert(block.name.clone(), block.id);
        self.blocks[id] = Some(block);
        true
    }

    /// Load every `*.ron` block definition in `dir`.
    ///
    /// Files that cannot be read or parsed are logged and skipped.
    /// Returns the number of definitions registered.
    pub fn load_dir(&mut self, dir: &Path) -> WorldResult<usize> {
        let entries =
            std::fs::read_dir(dir).map_err(|_| WorldError::RegistryDir(dir.to_path_buf()))?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    log::warn!("Skipping unreadable block definition {:?}: {}", path, e);
                    continue;
                }
            };

            match ron::from_str::<BlockType>(&contents) {
                Ok(block) => {
                    log::debug!("Loaded block '{}' (id {}) from {:?}", block.name, block.id, path);
                    if self.register(block) {
                        loaded += 1;
                    }
                }
                Err(e) => {
                    log::warn!("Skipping malformed block definition {:?}: {}", path, e);
                }
            }
        }

        log::info!("Registered {} block definitions from {:?}", loaded, dir);
        Ok(loaded)
    }

    /// Get block type by id, falling back to air
    pub fn get(&self, id: u16) -> &BlockType {
        self.blocks
            .get(id as usize)
            .and_then(Option::as_ref)
            .unwrap_or(&self.air)
    }

    /// Get block type by name, falling back to air
    pub fn get_by_name(&self, name: &str) -> &BlockType {
        self.by_name
            .get(name)
            .map(|&id| self.get(id))
            .unwrap_or(&self.air)
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.blocks.iter().flatten()
    }

    /// Number of tile columns in the atlas
    pub fn atlas_columns(&self) -> u32 {
        self.iter()
            .filter_map(|b| b.atlas_slot)
            .map(|slot| slot as u32 + 1)
            .max()
            .unwrap_or(0)
    }

    /// Atlas size in pixels: one row of square tiles
    pub fn atlas_size(&self, block_size: u32) -> UVec2 {
        UVec2::new(self.atlas_columns() * block_size, block_size)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
