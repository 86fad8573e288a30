use bevy_ecs::prelude::Component;
use bevy_math::DVec3;
use rs_utils::{CHUNK_SIZE, EntityId};

use crate::aabb::Aabb;

/// Hitbox derived from position and size, rebuilt on demand after
/// [`BoundingBoxCache::invalidate`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundingBoxCache {
    cached: Option<Aabb>,
}

impl BoundingBoxCache {
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn is_valid(&self) -> bool {
        self.cached.is_some()
    }

    pub fn set(&mut self, aabb: Aabb) {
        self.cached = Some(aabb);
    }

    pub fn get_or_recompute(&mut self, recompute: impl FnOnce() -> Aabb) -> Aabb {
        *self.cached.get_or_insert_with(recompute)
    }
}

/// Physical state of an entity moved by the resolver.
///
/// `position` is the centre of the hitbox on all three axes.
#[derive(Component, Clone, Debug)]
pub struct MovableEntity {
    pub id: EntityId,
    position: DVec3,
    pub width: f64,
    pub height: f64,
    bounding_box: BoundingBoxCache,
    pub motion: DVec3,
    pub on_ground: bool,
    /// Decaying memory of recent step-ups.
    pub y_size: f64,
    pub step_height: f64,
    /// Moves skip collision entirely (passenger seating, teleports).
    pub keep_movement: bool,
    /// `on_ground` value assigned by keep-movement moves.
    pub keep_movement_on_ground: bool,
    pub fall_distance: f64,
    pub collided_horizontally: bool,
    pub collided_vertically: bool,
    /// Set when a move crossed a chunk border; cleared by whoever tracks
    /// chunk membership.
    pub chunk_changed: bool,
    pub in_web: bool,
    /// Contact and fall damage accumulated since the last
    /// [`MovableEntity::take_pending_damage`].
    pub pending_damage: f32,
}

impl MovableEntity {
    pub fn new(id: EntityId, position: DVec3, width: f64, height: f64) -> Self {
        Self {
            id,
            position,
            width,
            height,
            bounding_box: BoundingBoxCache::default(),
            motion: DVec3::ZERO,
            on_ground: false,
            y_size: 0.0,
            step_height: 0.0,
            keep_movement: false,
            keep_movement_on_ground: false,
            fall_distance: 0.0,
            collided_horizontally: false,
            collided_vertically: false,
            chunk_changed: false,
            in_web: false,
            pending_damage: 0.0,
        }
    }

    /// Entity whose hitbox is exactly `aabb`.
    pub fn from_box(id: EntityId, aabb: Aabb) -> Self {
        let size = aabb.size();
        let mut entity = Self::new(id, aabb.center(), size.x, size.y);
        entity.bounding_box.set(aabb);
        entity
    }

    pub fn with_step_height(mut self, step_height: f64) -> Self {
        self.step_height = step_height;
        self
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
        self.bounding_box.invalidate();
    }

    pub fn bounding_box(&mut self) -> Aabb {
        let (position, width, height) = (self.position, self.width, self.height);
        self.bounding_box
            .get_or_recompute(|| Aabb::from_center(position, width, height))
    }

    /// Called when neighbouring geometry changed under the entity.
    pub fn invalidate_bounding_box(&mut self) {
        self.bounding_box.invalidate();
    }

    /// Adopts `aabb` as the hitbox and re-anchors the position on its centre.
    pub fn set_bounding_box(&mut self, aabb: Aabb) {
        self.position = aabb.center();
        self.bounding_box.set(aabb);
    }

    /// Bottom centre of the hitbox.
    pub fn feet(&mut self) -> DVec3 {
        let bb = self.bounding_box();
        DVec3::new(self.position.x, bb.min.y, self.position.z)
    }

    pub fn chunk(&self) -> (i32, i32) {
        (
            (self.position.x.floor() as i32).div_euclid(CHUNK_SIZE),
            (self.position.z.floor() as i32).div_euclid(CHUNK_SIZE),
        )
    }

    pub fn take_pending_damage(&mut self) -> f32 {
        std::mem::take(&mut self.pending_damage)
    }

    pub fn reset_fall_distance(&mut self) {
        self.fall_distance = 0.0;
    }
}
