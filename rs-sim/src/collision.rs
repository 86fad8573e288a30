use std::collections::HashMap;

use bevy_ecs::prelude::Resource;
use bevy_math::DVec3;
use rs_utils::{
    BlockPos, BlockShape, BlockUpdate, CHUNK_SIZE, ChunkData, ContactKind, EntityId,
    SECTION_HEIGHT, WORLD_HEIGHT, block_shape, block_state_id, block_state_meta, contact_kind,
    is_solid,
};
use tracing::debug;

use crate::aabb::Aabb;

const BLOCK_RANGE_EPS: f64 = 1e-7;

/// A block the moving box touched after its move resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEffect {
    pub pos: BlockPos,
    pub kind: ContactKind,
}

/// Read-only view of static collision geometry.
///
/// Implementations return a snapshot; the resolver never writes through it.
/// Regions over unloaded terrain yield no boxes.
pub trait CollisionQuery {
    fn collision_boxes(&self, region: &Aabb, excluding: Option<EntityId>) -> Vec<Aabb>;

    /// Simulation ticks advanced per update. Above 1 the resolver queries
    /// only the destination box instead of the full sweep.
    fn tick_rate(&self) -> u32 {
        1
    }

    fn contact_effects(&self, _region: &Aabb) -> Vec<ContactEffect> {
        Vec::new()
    }
}

/// Explicit list of boxes, each optionally owned by an entity.
#[derive(Debug, Clone, Default)]
pub struct StaticBoxes {
    boxes: Vec<(Option<EntityId>, Aabb)>,
    tick_rate: u32,
}

impl StaticBoxes {
    pub fn new() -> Self {
        Self {
            boxes: Vec::new(),
            tick_rate: 1,
        }
    }

    pub fn with(mut self, aabb: Aabb) -> Self {
        self.boxes.push((None, aabb));
        self
    }

    pub fn with_owned(mut self, owner: EntityId, aabb: Aabb) -> Self {
        self.boxes.push((Some(owner), aabb));
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate;
        self
    }
}

impl CollisionQuery for StaticBoxes {
    fn collision_boxes(&self, region: &Aabb, excluding: Option<EntityId>) -> Vec<Aabb> {
        self.boxes
            .iter()
            .filter(|(owner, _)| excluding.is_none() || *owner != excluding)
            .filter(|(_, aabb)| aabb.intersects(region))
            .map(|(_, aabb)| *aabb)
            .collect()
    }

    fn tick_rate(&self) -> u32 {
        self.tick_rate
    }
}

#[derive(Clone, Default)]
struct ChunkColumn {
    sections: Vec<Option<Vec<u16>>>,
}

impl ChunkColumn {
    fn new() -> Self {
        Self {
            sections: vec![None; (WORLD_HEIGHT / SECTION_HEIGHT) as usize],
        }
    }

    fn set_section(&mut self, y: u8, blocks: Vec<u16>) {
        let idx = y as usize;
        if idx >= self.sections.len() {
            return;
        }
        self.sections[idx] = Some(blocks);
    }

    fn set_block(&mut self, local_x: i32, y: i32, local_z: i32, state: u16) {
        let section_index = (y / SECTION_HEIGHT) as usize;
        let Some(section) = self.sections.get_mut(section_index) else {
            return;
        };
        let blocks = section.get_or_insert_with(|| {
            vec![0; (CHUNK_SIZE * CHUNK_SIZE * SECTION_HEIGHT) as usize]
        });
        let local_y = y % SECTION_HEIGHT;
        let idx = (local_y * 16 * 16 + local_z * 16 + local_x) as usize;
        if let Some(slot) = blocks.get_mut(idx) {
            *slot = state;
        }
    }
}

/// Loaded terrain of one world, queried for block collision volumes.
#[derive(Resource, Default)]
pub struct WorldCollisionMap {
    chunks: HashMap<(i32, i32), ChunkColumn>,
    tick_rate: u32,
}

impl WorldCollisionMap {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            chunks: HashMap::new(),
            tick_rate: tick_rate.max(1),
        }
    }

    pub fn update_chunk(&mut self, chunk: ChunkData) {
        let key = (chunk.x, chunk.z);
        let entry = self.chunks.entry(key).or_insert_with(ChunkColumn::new);
        if chunk.full {
            *entry = ChunkColumn::new();
        }
        for section in chunk.sections {
            entry.set_section(section.y, section.blocks);
        }
    }

    pub fn unload_chunk(&mut self, x: i32, z: i32) {
        self.chunks.remove(&(x, z));
    }

    pub fn has_chunk(&self, x: i32, z: i32) -> bool {
        self.chunks.contains_key(&(x, z))
    }

    /// Writes one block. Updates into unloaded chunks are dropped.
    pub fn apply_block_update(&mut self, update: BlockUpdate) {
        if !(0..WORLD_HEIGHT).contains(&update.y) {
            return;
        }
        let pos = BlockPos::new(update.x, update.y, update.z);
        let Some(column) = self.chunks.get_mut(&pos.chunk()) else {
            debug!(?pos, "dropping block update for unloaded chunk");
            return;
        };
        column.set_block(
            update.x.rem_euclid(CHUNK_SIZE),
            update.y,
            update.z.rem_euclid(CHUNK_SIZE),
            update.block_state,
        );
    }

    pub fn block_at(&self, x: i32, y: i32, z: i32) -> u16 {
        if y < 0 || y >= WORLD_HEIGHT {
            return 0;
        }

        let chunk_x = x.div_euclid(CHUNK_SIZE);
        let chunk_z = z.div_euclid(CHUNK_SIZE);
        let local_x = x.rem_euclid(CHUNK_SIZE);
        let local_z = z.rem_euclid(CHUNK_SIZE);

        let Some(column) = self.chunks.get(&(chunk_x, chunk_z)) else {
            return 0;
        };

        let section_index = (y / SECTION_HEIGHT) as usize;
        let local_y = (y % SECTION_HEIGHT) as usize;
        let Some(section) = column.sections.get(section_index).and_then(|v| v.as_ref()) else {
            return 0;
        };

        let idx = local_y * 16 * 16 + local_z as usize * 16 + local_x as usize;
        *section.get(idx).unwrap_or(&0)
    }

    pub fn block_at_pos(&self, pos: BlockPos) -> u16 {
        self.block_at(pos.x, pos.y, pos.z)
    }

    /// Collision volumes of the block at the given position, in world space.
    pub fn block_collision_boxes(&self, x: i32, y: i32, z: i32) -> Vec<Aabb> {
        let mut out = Vec::new();
        append_block_collision_boxes(self, self.block_at(x, y, z), x, y, z, &mut out);
        out
    }
}

impl CollisionQuery for WorldCollisionMap {
    fn collision_boxes(&self, region: &Aabb, _excluding: Option<EntityId>) -> Vec<Aabb> {
        let (min_x, max_x) = block_range(region.min.x, region.max.x);
        // fences reach 0.5 above their cell, so look one block further down
        let (min_y, max_y) = block_range(region.min.y - 0.5, region.max.y);
        let (min_z, max_z) = block_range(region.min.z, region.max.z);
        let mut out = Vec::new();
        for y in min_y..=max_y {
            for z in min_z..=max_z {
                for x in min_x..=max_x {
                    let block_state = self.block_at(x, y, z);
                    append_block_collision_boxes(self, block_state, x, y, z, &mut out);
                }
            }
        }
        out.retain(|bb| bb.intersects(region));
        out
    }

    fn tick_rate(&self) -> u32 {
        self.tick_rate.max(1)
    }

    fn contact_effects(&self, region: &Aabb) -> Vec<ContactEffect> {
        let inner = region.contract(0.001, 0.001, 0.001);
        let (min_x, max_x) = block_range(inner.min.x, inner.max.x);
        let (min_y, max_y) = block_range(inner.min.y, inner.max.y);
        let (min_z, max_z) = block_range(inner.min.z, inner.max.z);
        let mut out = Vec::new();
        for y in min_y..=max_y {
            for z in min_z..=max_z {
                for x in min_x..=max_x {
                    if let Some(kind) = contact_kind(block_state_id(self.block_at(x, y, z))) {
                        out.push(ContactEffect {
                            pos: BlockPos::new(x, y, z),
                            kind,
                        });
                    }
                }
            }
        }
        out
    }
}

fn block_range(min: f64, max: f64) -> (i32, i32) {
    let min_i = (min + BLOCK_RANGE_EPS).floor() as i32;
    let max_i = (max - BLOCK_RANGE_EPS).floor() as i32;
    if min_i <= max_i {
        (min_i, max_i)
    } else {
        (max_i, min_i)
    }
}

fn append_box(
    block_x: i32,
    block_y: i32,
    block_z: i32,
    local_min: [f64; 3],
    local_max: [f64; 3],
    out: &mut Vec<Aabb>,
) {
    let origin = DVec3::new(block_x as f64, block_y as f64, block_z as f64);
    out.push(Aabb::new(
        origin + DVec3::from_array(local_min),
        origin + DVec3::from_array(local_max),
    ));
}

fn append_block_collision_boxes(
    world: &WorldCollisionMap,
    block_state: u16,
    block_x: i32,
    block_y: i32,
    block_z: i32,
    out: &mut Vec<Aabb>,
) {
    let block_id = block_state_id(block_state);
    let meta = block_state_meta(block_state);
    match block_shape(block_id) {
        BlockShape::Empty => {}
        BlockShape::Full => append_box(
            block_x,
            block_y,
            block_z,
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            out,
        ),
        BlockShape::Slab => {
            if (meta & 0x8) != 0 {
                append_box(block_x, block_y, block_z, [0.0, 0.5, 0.0], [1.0, 1.0, 1.0], out);
            } else {
                append_box(block_x, block_y, block_z, [0.0, 0.0, 0.0], [1.0, 0.5, 1.0], out);
            }
        }
        BlockShape::Stairs => append_stair_boxes(meta, block_x, block_y, block_z, out),
        BlockShape::Fence | BlockShape::Pane => {
            let fence = matches!(block_shape(block_id), BlockShape::Fence);
            let (lo, hi, height) = if fence {
                (0.375, 0.625, 1.5)
            } else {
                (0.4375, 0.5625, 1.0)
            };
            let connects = |x: i32, z: i32| {
                let neighbor = block_state_id(world.block_at(x, block_y, z));
                is_solid(neighbor) || block_shape(neighbor) == block_shape(block_id)
            };
            let east = connects(block_x + 1, block_z);
            let west = connects(block_x - 1, block_z);
            let south = connects(block_x, block_z + 1);
            let north = connects(block_x, block_z - 1);

            append_box(block_x, block_y, block_z, [lo, 0.0, lo], [hi, height, hi], out);
            if north {
                append_box(block_x, block_y, block_z, [lo, 0.0, 0.0], [hi, height, 0.5], out);
            }
            if south {
                append_box(block_x, block_y, block_z, [lo, 0.0, 0.5], [hi, height, 1.0], out);
            }
            if west {
                append_box(block_x, block_y, block_z, [0.0, 0.0, lo], [0.5, height, hi], out);
            }
            if east {
                append_box(block_x, block_y, block_z, [0.5, 0.0, lo], [1.0, height, hi], out);
            }
        }
        BlockShape::Partial { height } => {
            append_box(block_x, block_y, block_z, [0.0, 0.0, 0.0], [1.0, height, 1.0], out);
        }
        BlockShape::Inset { inset, height } => append_box(
            block_x,
            block_y,
            block_z,
            [inset, 0.0, inset],
            [1.0 - inset, height, 1.0 - inset],
            out,
        ),
        BlockShape::Layered => {
            // a single layer has no collision volume
            let layers = (meta & 0x7) as f64;
            if layers > 0.0 {
                append_box(
                    block_x,
                    block_y,
                    block_z,
                    [0.0, 0.0, 0.0],
                    [1.0, layers / 8.0, 1.0],
                    out,
                );
            }
        }
    }
}

fn append_stair_boxes(meta: u8, block_x: i32, block_y: i32, block_z: i32, out: &mut Vec<Aabb>) {
    let top = (meta & 0x4) != 0;
    let facing = meta & 0x3;

    if top {
        append_box(block_x, block_y, block_z, [0.0, 0.5, 0.0], [1.0, 1.0, 1.0], out);
    } else {
        append_box(block_x, block_y, block_z, [0.0, 0.0, 0.0], [1.0, 0.5, 1.0], out);
    }

    let (min_x, max_x, min_z, max_z) = match facing {
        0 => (0.5, 1.0, 0.0, 1.0), // east
        1 => (0.0, 0.5, 0.0, 1.0), // west
        2 => (0.0, 1.0, 0.5, 1.0), // south
        _ => (0.0, 1.0, 0.0, 0.5), // north
    };
    let (lo_y, hi_y) = if top { (0.0, 0.5) } else { (0.5, 1.0) };
    append_box(
        block_x,
        block_y,
        block_z,
        [min_x, lo_y, min_z],
        [max_x, hi_y, max_z],
        out,
    );
}
