use bevy_app::prelude::{App, Plugin, Update};
use bevy_ecs::prelude::*;
use rs_sim::{MotionConfig, MotionResolver, MovableEntity, WorldCollisionMap};
use rs_utils::{BlockPos, BlockUpdate, EntityId};
use tracing::{debug, info};

use crate::arrow::{Arrow, ArrowTick};
use crate::boat::{Boat, BoatTick};
use crate::falling_block::{FallingBlock, Landing};
use crate::vehicle::{Rider, seat_passenger};

#[derive(Debug, Default, Resource)]
pub struct SimClock {
    pub tick: u64,
}

/// What happened during the last tick.
#[derive(Debug, Default, Resource)]
pub struct TickReport {
    pub placed: Vec<BlockUpdate>,
    pub dropped: Vec<(BlockPos, u16)>,
    pub despawned: Vec<EntityId>,
    pub moved: usize,
}

pub struct EntityPlugin {
    pub motion: MotionConfig,
}

impl Plugin for EntityPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.motion)
            .init_resource::<WorldCollisionMap>()
            .init_resource::<SimClock>()
            .init_resource::<TickReport>()
            .add_systems(
                Update,
                (
                    advance_clock,
                    tick_boats,
                    seat_passengers,
                    tick_falling_blocks,
                    tick_arrows,
                )
                    .chain(),
            );
    }
}

fn advance_clock(mut clock: ResMut<SimClock>, mut report: ResMut<TickReport>) {
    clock.tick += 1;
    *report = TickReport::default();
}

fn tick_boats(
    mut commands: Commands,
    world: Res<WorldCollisionMap>,
    config: Res<MotionConfig>,
    mut report: ResMut<TickReport>,
    mut boats: Query<(Entity, &mut MovableEntity, &mut Boat)>,
) {
    for (entity, mut body, mut boat) in &mut boats {
        match boat.tick(&mut body, &*world, &config) {
            BoatTick::Idle => {}
            BoatTick::Moved => report.moved += 1,
            BoatTick::Destroyed => {
                report.despawned.push(body.id);
                commands.entity(entity).despawn();
            }
        }
    }
}

fn seat_passengers(
    world: Res<WorldCollisionMap>,
    config: Res<MotionConfig>,
    boats: Query<(&MovableEntity, &Boat)>,
    mut riders: Query<(&mut MovableEntity, &mut Rider), Without<Boat>>,
) {
    let resolver = MotionResolver::new(&*world, *config);
    for (mut body, mut rider) in &mut riders {
        let Some(vehicle_id) = rider.vehicle else {
            continue;
        };
        let seat = boats
            .iter()
            .find(|(vehicle, boat)| vehicle.id == vehicle_id && !boat.vehicle.dead)
            .map(|(vehicle, _)| vehicle.position());
        match seat {
            Some(position) => {
                seat_passenger(position, Boat::MOUNTED_Y_OFFSET, &mut body, &resolver)
            }
            None => {
                debug!(rider = ?body.id, vehicle = ?vehicle_id, "vehicle gone, unlinking rider");
                rider.vehicle = None;
            }
        }
    }
}

fn tick_falling_blocks(
    mut commands: Commands,
    mut world: ResMut<WorldCollisionMap>,
    config: Res<MotionConfig>,
    mut report: ResMut<TickReport>,
    mut blocks: Query<(Entity, &mut MovableEntity, &FallingBlock)>,
) {
    for (entity, mut body, block) in &mut blocks {
        let Some(landing) = block.tick(&mut body, &*world, &config) else {
            continue;
        };
        match landing {
            Landing::Place { pos, block_state } => {
                let update = BlockUpdate {
                    x: pos.x,
                    y: pos.y,
                    z: pos.z,
                    block_state,
                };
                world.apply_block_update(update);
                report.placed.push(update);
            }
            Landing::Drop { pos, block_state } => {
                info!(?pos, block_state, "falling block dropped as item");
                report.dropped.push((pos, block_state));
            }
            Landing::Void => {}
        }
        report.despawned.push(body.id);
        commands.entity(entity).despawn();
    }
}

fn tick_arrows(
    mut commands: Commands,
    world: Res<WorldCollisionMap>,
    config: Res<MotionConfig>,
    mut report: ResMut<TickReport>,
    mut arrows: Query<(Entity, &mut MovableEntity, &mut Arrow)>,
) {
    for (entity, mut body, mut arrow) in &mut arrows {
        match arrow.tick(&mut body, &*world, &config) {
            ArrowTick::Flying => report.moved += 1,
            ArrowTick::Stuck => {}
            ArrowTick::Despawn => {
                report.despawned.push(body.id);
                commands.entity(entity).despawn();
            }
        }
    }
}
