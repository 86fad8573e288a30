use bevy_math::DVec3;
use rs_utils::ContactKind;
use tracing::{trace, warn};

use crate::aabb::Aabb;
use crate::collision::CollisionQuery;
use crate::config::MotionConfig;
use crate::error::{Axis, MotionError};
use crate::types::MovableEntity;

/// Sweeps entity hitboxes through static geometry, one axis at a time.
pub struct MotionResolver<'a, Q: CollisionQuery + ?Sized> {
    world: &'a Q,
    config: MotionConfig,
}

impl<'a, Q: CollisionQuery + ?Sized> MotionResolver<'a, Q> {
    pub fn new(world: &'a Q, config: MotionConfig) -> Self {
        Self { world, config }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn validate(&self, delta: DVec3) -> Result<DVec3, MotionError> {
        let limit = self.config.max_displacement;
        for (axis, value) in [(Axis::X, delta.x), (Axis::Y, delta.y), (Axis::Z, delta.z)] {
            if !value.is_finite() {
                return Err(MotionError::NonFinite { axis, value });
            }
            if value.abs() > limit {
                return Err(MotionError::ExcessiveDisplacement { axis, value, limit });
            }
        }
        Ok(delta)
    }

    /// Non-finite components become zero, the rest are clamped to the limit.
    pub fn sanitize(&self, delta: DVec3) -> DVec3 {
        let limit = self.config.max_displacement;
        let fix = |v: f64| if v.is_finite() { v.clamp(-limit, limit) } else { 0.0 };
        DVec3::new(fix(delta.x), fix(delta.y), fix(delta.z))
    }

    /// Moves the entity by its current motion vector.
    pub fn resolve_motion(&self, entity: &mut MovableEntity) -> DVec3 {
        let motion = entity.motion;
        self.resolve_move(entity, motion.x, motion.y, motion.z)
    }

    /// Moves `entity` by up to `(dx, dy, dz)` and returns the displacement
    /// actually applied.
    ///
    /// Contract violations panic in debug builds; release builds log them and
    /// continue with [`MotionResolver::sanitize`]d input.
    pub fn resolve_move(&self, entity: &mut MovableEntity, dx: f64, dy: f64, dz: f64) -> DVec3 {
        if dx == 0.0 && dy == 0.0 && dz == 0.0 {
            return DVec3::ZERO;
        }

        let requested = match self.validate(DVec3::new(dx, dy, dz)) {
            Ok(delta) => delta,
            Err(err) => {
                if cfg!(debug_assertions) {
                    panic!("resolve_move contract violation for {:?}: {err}", entity.id);
                }
                warn!(entity = ?entity.id, %err, "clamping runaway displacement");
                self.sanitize(DVec3::new(dx, dy, dz))
            }
        };

        if entity.keep_movement {
            let mut bb = entity.bounding_box();
            bb.offset(requested);
            let previous_chunk = entity.chunk();
            entity.set_bounding_box(bb);
            entity.on_ground = entity.keep_movement_on_ground;
            entity.chunk_changed |= entity.chunk() != previous_chunk;
            return requested;
        }

        let eps = self.config.overlap_epsilon;
        entity.y_size *= self.config.y_size_decay;

        let start_box = entity.bounding_box();
        let region = if self.world.tick_rate() > 1 {
            start_box.offset_copy(requested)
        } else {
            start_box.add_coord(requested)
        };
        let boxes = self.world.collision_boxes(&region, Some(entity.id));
        let (mut bb, mut delta) = sweep_axes(&boxes, start_box, requested, eps);

        let falling = entity.on_ground || (delta.y != requested.y && requested.y < 0.0);
        let blocked_horizontally = delta.x != requested.x || delta.z != requested.z;

        if entity.step_height > 0.0
            && falling
            && entity.y_size < self.config.step_retry_threshold
            && blocked_horizontally
        {
            let step = DVec3::new(requested.x, entity.step_height, requested.z);
            let boxes = self
                .world
                .collision_boxes(&start_box.add_coord(step), Some(entity.id));
            let (step_box, step_delta) = sweep_axes(&boxes, start_box, step, eps);

            let flat_dist = delta.x * delta.x + delta.z * delta.z;
            let step_dist = step_delta.x * step_delta.x + step_delta.z * step_delta.z;
            if flat_dist >= step_dist {
                trace!(entity = ?entity.id, flat_dist, step_dist, "step-up rejected");
            } else {
                trace!(entity = ?entity.id, flat_dist, step_dist, "step-up accepted");
                bb = step_box;
                delta = step_delta;
                entity.y_size += self.config.step_climb_increment;
            }
        }

        let previous_chunk = entity.chunk();
        entity.set_bounding_box(bb);
        entity.chunk_changed |= entity.chunk() != previous_chunk;

        self.apply_contact_effects(entity, &bb);
        update_ground_state(entity, requested, delta);
        update_fall_state(entity, delta.y);

        if requested.x != delta.x {
            entity.motion.x = 0.0;
        }
        if requested.y != delta.y {
            entity.motion.y = 0.0;
        }
        if requested.z != delta.z {
            entity.motion.z = 0.0;
        }

        delta
    }

    fn apply_contact_effects(&self, entity: &mut MovableEntity, bb: &Aabb) {
        entity.in_web = false;
        for effect in self.world.contact_effects(bb) {
            match effect.kind {
                ContactKind::Cobweb => {
                    entity.in_web = true;
                    entity.reset_fall_distance();
                }
                ContactKind::Damage(amount) => entity.pending_damage += amount,
            }
        }
    }
}

/// Clamps `delta` against every box, Y first, then X, then Z, offsetting the
/// box after each axis. Returns the moved box and the clamped delta.
fn sweep_axes(boxes: &[Aabb], mut bb: Aabb, delta: DVec3, eps: f64) -> (Aabb, DVec3) {
    let dy = boxes
        .iter()
        .fold(delta.y, |dy, block| block.clamp_offset_y(&bb, dy, eps));
    bb.offset(DVec3::new(0.0, dy, 0.0));

    let dx = boxes
        .iter()
        .fold(delta.x, |dx, block| block.clamp_offset_x(&bb, dx, eps));
    bb.offset(DVec3::new(dx, 0.0, 0.0));

    let dz = boxes
        .iter()
        .fold(delta.z, |dz, block| block.clamp_offset_z(&bb, dz, eps));
    bb.offset(DVec3::new(0.0, 0.0, dz));

    (bb, DVec3::new(dx, dy, dz))
}

fn update_ground_state(entity: &mut MovableEntity, requested: DVec3, delta: DVec3) {
    entity.collided_vertically = requested.y != delta.y;
    entity.collided_horizontally = requested.x != delta.x || requested.z != delta.z;
    entity.on_ground = requested.y != delta.y && requested.y < 0.0;
}

fn update_fall_state(entity: &mut MovableEntity, dy: f64) {
    if entity.on_ground {
        if entity.fall_distance > 0.0 {
            let damage = (entity.fall_distance - 3.0).ceil();
            if damage > 0.0 {
                entity.pending_damage += damage as f32;
            }
            entity.reset_fall_distance();
        }
    } else if dy < 0.0 {
        entity.fall_distance -= dy;
    }
}
