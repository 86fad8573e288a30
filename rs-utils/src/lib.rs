use serde::{Deserialize, Serialize};

pub mod registry;
pub use registry::{
    BlockShape, ContactKind, block_shape, block_state, block_state_id, block_state_meta,
    can_be_replaced, contact_kind, friction_factor, is_liquid, is_solid, is_transparent,
};

pub const CHUNK_SIZE: i32 = 16;
pub const SECTION_HEIGHT: i32 = 16;
pub const WORLD_HEIGHT: i32 = 256;

/// Runtime id of a simulated entity, unique within one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

#[derive(Clone, Debug)]
pub struct ChunkSection {
    pub y: u8,
    /// 4096 packed block states, indexed `y * 256 + z * 16 + x`.
    pub blocks: Vec<u16>,
}

impl ChunkSection {
    pub fn filled(y: u8, block_state: u16) -> Self {
        Self {
            y,
            blocks: vec![block_state; (CHUNK_SIZE * CHUNK_SIZE * SECTION_HEIGHT) as usize],
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChunkData {
    pub x: i32,
    pub z: i32,
    pub full: bool,
    pub sections: Vec<ChunkSection>,
}

impl ChunkData {
    pub fn empty(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            full: true,
            sections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockUpdate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub block_state: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn chunk(self) -> (i32, i32) {
        (self.x.div_euclid(CHUNK_SIZE), self.z.div_euclid(CHUNK_SIZE))
    }

    pub fn below(self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }
}
