use rs_sim::{CollisionQuery, WorldCollisionMap};
use rs_utils::BlockPos;

pub mod arrow;
pub mod boat;
pub mod falling_block;
pub mod kind;
pub mod plugin;
pub mod vehicle;

pub use arrow::{Arrow, ArrowTick};
pub use boat::{Boat, BoatDamage, BoatTick};
pub use falling_block::{DamageCause, FallingBlock, Landing};
pub use kind::{EntityKind, Physics};
pub use plugin::{EntityPlugin, SimClock, TickReport};
pub use vehicle::{MountError, Rider, Vehicle};

/// Point lookups of block states, next to the box queries the resolver uses.
pub trait BlockAccess {
    fn block_state_at(&self, pos: BlockPos) -> u16;
}

impl BlockAccess for WorldCollisionMap {
    fn block_state_at(&self, pos: BlockPos) -> u16 {
        self.block_at_pos(pos)
    }
}

/// Everything an entity tick needs from the world.
pub trait EntityWorld: CollisionQuery + BlockAccess {}

impl<T: CollisionQuery + BlockAccess> EntityWorld for T {}
