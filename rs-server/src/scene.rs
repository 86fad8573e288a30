use bevy_ecs::prelude::{Entity, World};
use bevy_math::DVec3;
use rs_entity::{Arrow, Boat, EntityKind, FallingBlock, MountError, Rider};
use rs_sim::WorldCollisionMap;
use rs_utils::{ChunkData, ChunkSection, EntityId, SECTION_HEIGHT, block_state};
use tracing::{debug, info};

use crate::config::WorldConfig;

const FLOOR: u16 = block_state(1, 0);
const SAND: u16 = block_state(12, 0);

/// Flat stone floor up to `ground_level`, plus any configured blocks.
pub fn build_world(config: &WorldConfig) -> WorldCollisionMap {
    let mut map = WorldCollisionMap::new(config.tick_rate);
    let top_section = config.ground_level / SECTION_HEIGHT;

    for cx in -config.radius..=config.radius {
        for cz in -config.radius..=config.radius {
            let mut chunk = ChunkData::empty(cx, cz);
            for section_y in 0..=top_section {
                let mut section = ChunkSection::filled(section_y as u8, 0);
                let base = section_y * SECTION_HEIGHT;
                let solid_layers = (config.ground_level - base + 1).clamp(0, SECTION_HEIGHT);
                let layer = (SECTION_HEIGHT * SECTION_HEIGHT) as usize;
                section.blocks[..solid_layers as usize * layer].fill(FLOOR);
                chunk.sections.push(section);
            }
            map.update_chunk(chunk);
        }
    }

    for update in &config.blocks {
        map.apply_block_update(*update);
    }
    debug!(
        radius = config.radius,
        ground_level = config.ground_level,
        extra = config.blocks.len(),
        "world built"
    );
    map
}

/// Entities of the demo scene.
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    pub boat: Entity,
    pub rider: Entity,
    pub sand: Entity,
    pub arrow: Entity,
}

impl Scene {
    pub fn named(&self) -> [(&'static str, Entity); 4] {
        [
            ("boat", self.boat),
            ("rider", self.rider),
            ("sand", self.sand),
            ("arrow", self.arrow),
        ]
    }
}

/// Spawns a ridden boat, a falling sand block and an arrow above a floor whose
/// top face is at `ground`.
pub fn spawn_scene(world: &mut World, ground: f64) -> Result<Scene, MountError> {
    let boat_id = EntityId(1);
    let rider_id = EntityId(2);

    let mut boat = Boat::new(boat_id);
    let mut rider = Rider::default();
    boat.vehicle.mount(rider_id, &mut rider)?;

    let boat = world
        .spawn((
            EntityKind::Boat,
            EntityKind::Boat.spawn(boat_id, DVec3::new(0.5, ground, 0.5)),
            boat,
        ))
        .id();
    let rider = world
        .spawn((
            EntityKind::Mob,
            EntityKind::Mob.spawn(rider_id, DVec3::new(0.5, ground + 0.35, 0.5)),
            rider,
        ))
        .id();

    let sand = world
        .spawn((
            EntityKind::FallingBlock,
            EntityKind::FallingBlock.spawn(EntityId(3), DVec3::new(4.5, ground + 8.0, 4.5)),
            FallingBlock { block_state: SAND },
        ))
        .id();

    let mut arrow_body = EntityKind::Arrow.spawn(EntityId(4), DVec3::new(-3.5, ground + 1.5, 0.5));
    arrow_body.motion = DVec3::new(0.6, 0.1, 0.0);
    let arrow = world
        .spawn((EntityKind::Arrow, arrow_body, Arrow::new(Some(rider_id), false)))
        .id();

    info!("Scene spawned on ground {ground}");
    Ok(Scene {
        boat,
        rider,
        sand,
        arrow,
    })
}
