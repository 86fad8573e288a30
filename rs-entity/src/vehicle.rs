use bevy_ecs::prelude::Component;
use bevy_math::DVec3;
use rs_sim::{CollisionQuery, MotionResolver, MovableEntity};
use rs_utils::EntityId;
use thiserror::Error;
use tracing::{debug, info};

/// Vehicles below this height are destroyed.
pub const KILL_DEPTH: f64 = -16.0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MountError {
    #[error("entity {0:?} is already riding a vehicle")]
    AlreadyMounted(EntityId),
    #[error("entity {0:?} is not riding this vehicle")]
    NotMounted(EntityId),
    #[error("vehicle already carries {0:?}")]
    Occupied(EntityId),
}

/// Riding link on the passenger side.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Rider {
    pub vehicle: Option<EntityId>,
}

/// Damage and wobble counters shared by rideable entities.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: EntityId,
    pub rolling_amplitude: i32,
    pub rolling_direction: i32,
    pub damage: i32,
    pub health: f32,
    pub passenger: Option<EntityId>,
    pub dead: bool,
    roll_positive: bool,
}

impl Vehicle {
    pub fn new(id: EntityId, health: f32) -> Self {
        Self {
            id,
            rolling_amplitude: 0,
            rolling_direction: 0,
            damage: 0,
            health,
            passenger: None,
            dead: false,
            roll_positive: true,
        }
    }

    /// Decays the wobble and damage counters. Returns false once the vehicle
    /// has fallen out of the world.
    pub fn tick(&mut self, y: f64) -> bool {
        if self.rolling_amplitude > 0 {
            self.rolling_amplitude -= 1;
        }
        if self.damage > 0 {
            self.damage -= 1;
        }
        if y < KILL_DEPTH {
            debug!(vehicle = ?self.id, y, "vehicle fell out of the world");
            self.dead = true;
        }
        !self.dead
    }

    /// Starts the wobble and accumulates damage. Lethal hits are left to the
    /// caller and return false.
    pub fn perform_hurt_animation(&mut self, damage: i32) -> bool {
        if damage as f32 >= self.health {
            return false;
        }
        self.rolling_amplitude = 10;
        self.rolling_direction = if self.roll_positive { 1 } else { -1 };
        self.roll_positive = !self.roll_positive;
        self.damage += damage;
        debug!(vehicle = ?self.id, damage = self.damage, "vehicle hurt");
        true
    }

    pub fn can_interact(&self) -> bool {
        self.passenger.is_none() && !self.dead
    }

    pub fn mount(&mut self, rider_id: EntityId, rider: &mut Rider) -> Result<(), MountError> {
        if rider.vehicle.is_some() {
            return Err(MountError::AlreadyMounted(rider_id));
        }
        if let Some(current) = self.passenger {
            return Err(MountError::Occupied(current));
        }
        rider.vehicle = Some(self.id);
        self.passenger = Some(rider_id);
        info!("Entity {:?} mount {:?}", rider_id, self.id);
        Ok(())
    }

    pub fn dismount(&mut self, rider_id: EntityId, rider: &mut Rider) -> Result<(), MountError> {
        if rider.vehicle != Some(self.id) || self.passenger != Some(rider_id) {
            return Err(MountError::NotMounted(rider_id));
        }
        rider.vehicle = None;
        self.passenger = None;
        info!("Entity {:?} dismount {:?}", rider_id, self.id);
        Ok(())
    }
}

/// Places the passenger on its seat without colliding on the way there.
///
/// Seats further away than one resolver move are reached by teleport.
pub fn seat_passenger<Q: CollisionQuery + ?Sized>(
    vehicle_position: DVec3,
    mounted_y_offset: f64,
    passenger: &mut MovableEntity,
    resolver: &MotionResolver<'_, Q>,
) {
    let seat = vehicle_position + DVec3::new(0.0, mounted_y_offset, 0.0);
    let delta = seat - passenger.position();
    passenger.keep_movement_on_ground = false;
    if delta.abs().max_element() > resolver.config().max_displacement {
        let previous_chunk = passenger.chunk();
        passenger.set_position(seat);
        passenger.on_ground = passenger.keep_movement_on_ground;
        passenger.chunk_changed |= passenger.chunk() != previous_chunk;
        return;
    }
    let keep = passenger.keep_movement;
    passenger.keep_movement = true;
    resolver.resolve_move(passenger, delta.x, delta.y, delta.z);
    passenger.keep_movement = keep;
}
