use bevy_ecs::prelude::Component;
use rs_sim::{MotionConfig, MotionResolver, MovableEntity};
use rs_utils::{BlockPos, block_state_id, can_be_replaced, is_transparent};
use tracing::debug;

use crate::EntityWorld;
use crate::kind::EntityKind;
use crate::vehicle::KILL_DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageCause {
    Attack,
    Fall,
    Contact,
    Void,
}

/// Where a landed block ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Place { pos: BlockPos, block_state: u16 },
    /// The cell is taken by something that cannot be overwritten.
    Drop { pos: BlockPos, block_state: u16 },
    /// Fell out of the world. Nothing is placed or dropped.
    Void,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct FallingBlock {
    pub block_state: u16,
}

impl FallingBlock {
    /// Air cannot fall.
    pub fn new(block_state: u16) -> Option<Self> {
        if block_state_id(block_state) == 0 {
            return None;
        }
        Some(Self { block_state })
    }

    pub fn tick<W: EntityWorld + ?Sized>(
        &self,
        body: &mut MovableEntity,
        world: &W,
        config: &MotionConfig,
    ) -> Option<Landing> {
        if body.feet().y < KILL_DEPTH && Self::accepts_damage(DamageCause::Void) {
            debug!(entity = ?body.id, "falling block lost to the void");
            return Some(Landing::Void);
        }

        let physics = EntityKind::FallingBlock.physics();
        body.motion.y -= physics.gravity;
        MotionResolver::new(world, *config).resolve_motion(body);
        body.motion *= 1.0 - physics.drag;
        // fall and contact damage do not affect falling blocks
        body.take_pending_damage();

        if !body.on_ground {
            return None;
        }

        // the cell holding the top of the block, so partial blocks below are built upon
        let center = body.position();
        let top = body.feet().y + physics.height;
        let pos = BlockPos::new(
            center.x.floor() as i32,
            top.floor() as i32,
            center.z.floor() as i32,
        );
        let target = block_state_id(world.block_state_at(pos));
        let landing = if target > 0 && is_transparent(target) && !can_be_replaced(target) {
            Landing::Drop {
                pos,
                block_state: self.block_state,
            }
        } else {
            Landing::Place {
                pos,
                block_state: self.block_state,
            }
        };
        debug!(entity = ?body.id, ?landing, "falling block landed");
        Some(landing)
    }

    /// Only the void hurts a falling block.
    pub fn accepts_damage(cause: DamageCause) -> bool {
        cause == DamageCause::Void
    }
}
