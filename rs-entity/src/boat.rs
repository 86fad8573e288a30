use bevy_ecs::prelude::Component;
use bevy_math::DVec3;
use rs_sim::{MotionConfig, MotionResolver, MovableEntity};
use rs_utils::{BlockPos, EntityId, block_state_id, friction_factor, is_liquid, is_solid};
use tracing::debug;

use crate::EntityWorld;
use crate::kind::EntityKind;
use crate::vehicle::Vehicle;

/// Sinking speed when nothing holds the boat up.
const SINK_SPEED: f64 = -0.08;
/// Accumulated damage above which the boat breaks.
const BREAK_DAMAGE: i32 = 40;
const BOUNCE: f64 = -0.5;
const MOTION_EPS: f64 = 0.00001;
/// Keeps the inside-block probe off the surface the boat rests on.
const FEET_PROBE: DVec3 = DVec3::new(0.0, 0.001, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoatTick {
    Idle,
    Moved,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoatDamage {
    Hurt,
    /// `drop_item` is false when a creative attacker removed it outright.
    Destroyed {
        drop_item: bool,
        passenger: Option<EntityId>,
    },
}

#[derive(Component, Debug, Clone)]
pub struct Boat {
    pub vehicle: Vehicle,
}

impl Boat {
    pub const HEALTH: f32 = 20.0;
    pub const MOUNTED_Y_OFFSET: f64 = 0.35;

    pub fn new(id: EntityId) -> Self {
        Self {
            vehicle: Vehicle::new(id, Self::HEALTH),
        }
    }

    pub fn tick<W: EntityWorld + ?Sized>(
        &mut self,
        body: &mut MovableEntity,
        world: &W,
        config: &MotionConfig,
    ) -> BoatTick {
        if self.vehicle.dead || !self.vehicle.tick(body.feet().y) {
            return BoatTick::Destroyed;
        }

        let physics = EntityKind::Boat.physics();
        let from = body.position();

        let inside = block_state_id(world.block_state_at(block_pos(body.feet() + FEET_PROBE)));
        body.motion.y = if is_solid(inside) || is_liquid(inside) {
            physics.gravity
        } else {
            SINK_SPEED
        };

        MotionResolver::new(world, *config).resolve_motion(body);

        let damage = body.take_pending_damage();
        if damage > 0.0 {
            if let BoatDamage::Destroyed { .. } = self.attack(damage, false) {
                return BoatTick::Destroyed;
            }
        }

        let mut friction = 1.0 - physics.drag;
        if body.on_ground && (body.motion.x.abs() > MOTION_EPS || body.motion.z.abs() > MOTION_EPS) {
            let below = block_pos(body.feet() + FEET_PROBE).below();
            friction *= friction_factor(block_state_id(world.block_state_at(below)));
        }

        body.motion.x *= friction;
        body.motion.y *= 1.0 - physics.drag;
        body.motion.z *= friction;

        if body.on_ground {
            body.motion.y *= BOUNCE;
        }

        if body.position() == from {
            BoatTick::Idle
        } else {
            BoatTick::Moved
        }
    }

    pub fn attack(&mut self, damage: f32, creative_attacker: bool) -> BoatDamage {
        self.vehicle.perform_hurt_animation(damage.floor() as i32);
        if !creative_attacker && self.vehicle.damage <= BREAK_DAMAGE {
            return BoatDamage::Hurt;
        }

        let passenger = self.vehicle.passenger.take();
        self.vehicle.dead = true;
        debug!(boat = ?self.vehicle.id, ?passenger, creative_attacker, "boat destroyed");
        BoatDamage::Destroyed {
            drop_item: !creative_attacker,
            passenger,
        }
    }
}

fn block_pos(point: DVec3) -> BlockPos {
    BlockPos::new(
        point.x.floor() as i32,
        point.y.floor() as i32,
        point.z.floor() as i32,
    )
}
