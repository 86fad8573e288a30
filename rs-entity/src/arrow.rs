use bevy_ecs::prelude::Component;
use bevy_math::DVec3;
use rs_sim::{MotionConfig, MotionResolver, MovableEntity};
use rs_utils::EntityId;

use crate::EntityWorld;
use crate::kind::EntityKind;

const DESPAWN_AGE: u32 = 1200;
const BASE_DAMAGE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowTick {
    Flying,
    Stuck,
    Despawn,
}

#[derive(Component, Debug, Clone)]
pub struct Arrow {
    pub shooter: Option<EntityId>,
    pub critical: bool,
    pub age: u32,
    pub stuck: bool,
}

impl Arrow {
    pub fn new(shooter: Option<EntityId>, critical: bool) -> Self {
        Self {
            shooter,
            critical,
            age: 0,
            stuck: false,
        }
    }

    pub fn tick<W: EntityWorld + ?Sized>(
        &mut self,
        body: &mut MovableEntity,
        world: &W,
        config: &MotionConfig,
    ) -> ArrowTick {
        self.age += 1;
        if self.age > DESPAWN_AGE {
            return ArrowTick::Despawn;
        }
        if self.stuck {
            return ArrowTick::Stuck;
        }

        let physics = EntityKind::Arrow.physics();
        body.motion *= 1.0 - physics.drag;
        body.motion.y -= physics.gravity;
        MotionResolver::new(world, *config).resolve_motion(body);

        if body.collided_horizontally || body.collided_vertically {
            self.stuck = true;
            body.motion = DVec3::ZERO;
            return ArrowTick::Stuck;
        }
        ArrowTick::Flying
    }

    /// Damage dealt on impact at the given velocity.
    pub fn impact_damage(&self, motion: DVec3) -> f64 {
        let damage = (motion.length() * BASE_DAMAGE).ceil();
        if self.critical {
            damage + (BASE_DAMAGE / 2.0).floor() + 1.0
        } else {
            damage
        }
    }
}
