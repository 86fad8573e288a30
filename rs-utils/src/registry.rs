//! Static block property table.
//!
//! Block states are packed as `id << 4 | meta`, the pre-flattening layout.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockShape {
    /// No collision volume (air, liquids, plants, torches).
    Empty,
    Full,
    /// Half block; meta bit 0x8 puts it in the upper half.
    Slab,
    /// Half block plus a quarter step; meta 0x3 is facing, 0x4 upside down.
    Stairs,
    /// Post plus arms toward solid neighbours, 1.5 blocks tall.
    Fence,
    /// Thin pane or bars connecting to neighbours.
    Pane,
    /// Full footprint, reduced height.
    Partial { height: f64 },
    /// Footprint inset on X/Z by `inset`, reduced height.
    Inset { inset: f64, height: f64 },
    /// Height taken from meta, in eighths (snow layers).
    Layered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactKind {
    Cobweb,
    Damage(f32),
}

pub const fn block_state(id: u16, meta: u8) -> u16 {
    (id << 4) | (meta as u16 & 0xF)
}

pub const fn block_state_id(state: u16) -> u16 {
    state >> 4
}

pub const fn block_state_meta(state: u16) -> u8 {
    (state & 0xF) as u8
}

pub fn is_liquid(id: u16) -> bool {
    matches!(id, 8..=11)
}

pub fn block_shape(id: u16) -> BlockShape {
    match id {
        0 | 8..=11 => BlockShape::Empty,
        6 | 27 | 28 | 30..=32 | 37..=40 | 50 | 51 | 55 | 59 | 63 | 65..=66 | 68..=69 | 75
        | 76 | 77 | 83 | 106 | 115 | 131 | 132 | 141 | 142 | 143 | 157 | 171 | 175 => {
            BlockShape::Empty
        }
        26 => BlockShape::Partial { height: 9.0 / 16.0 },
        44 | 126 | 182 => BlockShape::Slab,
        53 | 67 | 108 | 109 | 114 | 128 | 134..=136 | 156 | 163 | 164 | 180 => BlockShape::Stairs,
        85 | 113 | 188..=192 => BlockShape::Fence,
        101 | 102 | 160 => BlockShape::Pane,
        54 | 130 | 146 => BlockShape::Inset {
            inset: 1.0 / 16.0,
            height: 14.0 / 16.0,
        },
        60 => BlockShape::Partial { height: 0.9375 },
        78 => BlockShape::Layered,
        81 => BlockShape::Inset {
            inset: 1.0 / 16.0,
            height: 15.0 / 16.0,
        },
        88 => BlockShape::Partial { height: 0.875 },
        _ => BlockShape::Full,
    }
}

pub fn is_solid(id: u16) -> bool {
    !matches!(block_shape(id), BlockShape::Empty)
}

/// Horizontal friction multiplier for entities sliding on top of the block.
pub fn friction_factor(id: u16) -> f64 {
    match id {
        79 | 174 => 0.98,
        165 => 0.8,
        _ => 0.6,
    }
}

pub fn is_transparent(id: u16) -> bool {
    matches!(
        id,
        0 | 6 | 8..=11 | 18 | 20 | 26 | 27 | 28 | 30..=32 | 37..=40 | 44 | 50 | 51 | 53 | 55
            | 59 | 63 | 65..=69 | 75..=78 | 81 | 83 | 85 | 101 | 102 | 106 | 113 | 115
            | 126 | 131 | 132 | 141 | 142 | 143 | 160 | 161 | 171 | 175
    )
}

pub fn can_be_replaced(id: u16) -> bool {
    matches!(id, 0 | 8..=11 | 31 | 32 | 51 | 78 | 106 | 175)
}

pub fn contact_kind(id: u16) -> Option<ContactKind> {
    match id {
        30 => Some(ContactKind::Cobweb),
        81 => Some(ContactKind::Damage(1.0)),
        _ => None,
    }
}
