use std::cell::Cell;

use bevy_math::DVec3;
use rs_utils::{BlockUpdate, ChunkData, ChunkSection, EntityId, block_state};

use super::aabb::Aabb;
use super::collision::{CollisionQuery, StaticBoxes, WorldCollisionMap};
use super::config::MotionConfig;
use super::error::{Axis, MotionError};
use super::movement::MotionResolver;
use super::types::MovableEntity;

const EPS: f64 = 1e-9;

struct CountingQuery<Q> {
    inner: Q,
    calls: Cell<usize>,
}

impl<Q> CountingQuery<Q> {
    fn new(inner: Q) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }
}

impl<Q: CollisionQuery> CollisionQuery for CountingQuery<Q> {
    fn collision_boxes(&self, region: &Aabb, excluding: Option<EntityId>) -> Vec<Aabb> {
        self.calls.set(self.calls.get() + 1);
        self.inner.collision_boxes(region, excluding)
    }

    fn tick_rate(&self) -> u32 {
        self.inner.tick_rate()
    }
}

fn unit_entity() -> MovableEntity {
    MovableEntity::from_box(EntityId(1), Aabb::from_bounds(0.0, 0.0, 0.0, 1.0, 1.0, 1.0))
}

fn resolve<Q: CollisionQuery>(world: &Q, entity: &mut MovableEntity, delta: DVec3) -> DVec3 {
    MotionResolver::new(world, MotionConfig::default()).resolve_move(entity, delta.x, delta.y, delta.z)
}

fn assert_box_eq(actual: Aabb, expected: Aabb) {
    assert!(
        (actual.min - expected.min).length() < EPS && (actual.max - expected.max).length() < EPS,
        "box {:?} != {:?}",
        actual,
        expected
    );
}

fn penetration(a: &Aabb, b: &Aabb) -> f64 {
    let depth = a.max.min(b.max) - a.min.max(b.min);
    depth.x.min(depth.y).min(depth.z)
}

#[test]
fn zero_move_is_a_noop() {
    let world = CountingQuery::new(StaticBoxes::new().with(Aabb::from_bounds(0.0, 0.0, 1.0, 1.0, 1.0, 2.0)));
    let mut entity = unit_entity();
    entity.motion = DVec3::new(0.3, -0.1, 0.2);
    entity.y_size = 0.5;
    entity.on_ground = true;

    let before = entity.clone();
    let moved = resolve(&world, &mut entity, DVec3::ZERO);

    assert_eq!(moved, DVec3::ZERO);
    assert_eq!(world.calls.get(), 0);
    assert_eq!(entity.bounding_box(), Aabb::from_bounds(0.0, 0.0, 0.0, 1.0, 1.0, 1.0));
    assert_eq!(entity.position(), before.position());
    assert_eq!(entity.motion, before.motion);
    assert_eq!(entity.y_size, before.y_size);
    assert!(entity.on_ground);
}

#[test]
fn touching_wall_blocks_completely() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(0.0, 0.0, 1.0, 1.0, 1.0, 2.0));
    let mut entity = unit_entity();
    entity.motion = DVec3::new(0.0, 0.0, 0.5);

    let moved = resolve(&world, &mut entity, DVec3::new(0.0, 0.0, 0.5));

    assert_eq!(moved, DVec3::ZERO);
    assert_eq!(entity.motion.z, 0.0);
    assert!(entity.collided_horizontally);
    assert_box_eq(entity.bounding_box(), Aabb::from_bounds(0.0, 0.0, 0.0, 1.0, 1.0, 1.0));
}

#[test]
fn distant_wall_does_not_block() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(0.0, 0.0, 2.0, 1.0, 1.0, 3.0));
    let mut entity = unit_entity();
    entity.motion = DVec3::new(0.0, 0.0, 0.5);

    let moved = resolve(&world, &mut entity, DVec3::new(0.0, 0.0, 0.5));

    assert_eq!(moved, DVec3::new(0.0, 0.0, 0.5));
    assert_eq!(entity.motion.z, 0.5);
    assert_box_eq(entity.bounding_box(), Aabb::from_bounds(0.0, 0.0, 0.5, 1.0, 1.0, 1.5));
}

#[test]
fn steps_up_onto_one_block_ledge() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(1.0, 0.0, 0.0, 2.0, 1.0, 1.0));
    let mut entity = unit_entity().with_step_height(1.0);
    entity.on_ground = true;

    let moved = resolve(&world, &mut entity, DVec3::new(0.5, 0.0, 0.0));

    assert!((moved.x - 0.5).abs() < EPS);
    assert!((moved.y - 1.0).abs() < EPS);
    let bb = entity.bounding_box();
    assert!((bb.min.y - 1.0).abs() < EPS);
    assert!((bb.min.x - 0.5).abs() < EPS);
    assert!((entity.y_size - 0.5).abs() < EPS);
}

#[test]
fn no_step_up_without_step_height() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(1.0, 0.0, 0.0, 2.0, 1.0, 1.0));
    let mut entity = unit_entity();
    entity.on_ground = true;
    entity.motion = DVec3::new(0.5, 0.0, 0.0);

    let moved = resolve(&world, &mut entity, DVec3::new(0.5, 0.0, 0.0));

    assert_eq!(moved, DVec3::ZERO);
    assert_eq!(entity.motion.x, 0.0);
    assert_eq!(entity.y_size, 0.0);
}

#[test]
fn no_step_up_while_airborne() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(1.0, 0.0, 0.0, 2.0, 1.0, 1.0));
    let mut entity = unit_entity().with_step_height(1.0);
    entity.on_ground = false;

    let moved = resolve(&world, &mut entity, DVec3::new(0.5, 0.0, 0.0));

    assert_eq!(moved, DVec3::ZERO);
}

#[test]
fn recent_step_suppresses_retry() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(1.0, 0.0, 0.0, 2.0, 1.0, 1.0));
    let mut entity = unit_entity().with_step_height(1.0);
    entity.on_ground = true;
    // 0.2 * 0.4 = 0.08, still above the retry threshold
    entity.y_size = 0.2;

    let moved = resolve(&world, &mut entity, DVec3::new(0.5, 0.0, 0.0));

    assert_eq!(moved.x, 0.0);
    assert!((entity.y_size - 0.08).abs() < EPS);
}

#[test]
fn step_up_never_moves_less_than_flat_attempt() {
    for ledge in [0.25, 0.5, 1.0, 1.25, 2.0] {
        let world = StaticBoxes::new().with(Aabb::from_bounds(1.0, 0.0, 0.0, 2.0, ledge, 1.0));
        for dx in [0.1, 0.5, 0.9] {
            let mut flat = unit_entity();
            flat.on_ground = true;
            let flat_moved = resolve(&world, &mut flat, DVec3::new(dx, 0.0, 0.0));

            let mut stepper = unit_entity().with_step_height(1.0);
            stepper.on_ground = true;
            let step_moved = resolve(&world, &mut stepper, DVec3::new(dx, 0.0, 0.0));

            assert!(
                step_moved.x.abs() >= flat_moved.x.abs(),
                "ledge {ledge} dx {dx}: stepped {step_moved:?} flat {flat_moved:?}"
            );
            if ledge > 1.0 {
                assert_eq!(step_moved, flat_moved);
            }
        }
    }
}

#[test]
fn empty_world_passes_through() {
    let world = StaticBoxes::new();
    for delta in [
        DVec3::new(0.5, 0.0, 0.0),
        DVec3::new(-3.25, 1.5, 7.0),
        DVec3::new(0.0, -19.5, 0.0),
        DVec3::new(1e-6, -1e-6, 1e-6),
    ] {
        let mut entity = unit_entity();
        let moved = resolve(&world, &mut entity, delta);
        assert_eq!(moved, delta);
        assert_box_eq(
            entity.bounding_box(),
            Aabb::from_bounds(0.0, 0.0, 0.0, 1.0, 1.0, 1.0).offset_copy(delta),
        );
    }
}

#[test]
fn landing_sets_ground_and_kills_vertical_motion() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(-1.0, -1.0, -1.0, 2.0, -0.25, 2.0));
    let mut entity = unit_entity();
    entity.motion = DVec3::new(0.1, -0.5, 0.0);

    let motion = entity.motion;
    let moved = resolve(&world, &mut entity, motion);

    assert!((moved.y + 0.25).abs() < EPS);
    assert_eq!(moved.x, 0.1);
    assert!(entity.on_ground);
    assert!(entity.collided_vertically);
    assert_eq!(entity.motion.y, 0.0);
    assert_eq!(entity.motion.x, 0.1);
}

#[test]
fn most_restrictive_box_wins() {
    let world = StaticBoxes::new()
        .with(Aabb::from_bounds(0.0, 0.0, 2.0, 1.0, 1.0, 3.0))
        .with(Aabb::from_bounds(0.0, 0.0, 1.5, 1.0, 1.0, 1.75))
        .with(Aabb::from_bounds(0.0, 0.0, 4.0, 1.0, 1.0, 5.0));
    let mut entity = unit_entity();

    let moved = resolve(&world, &mut entity, DVec3::new(0.0, 0.0, 3.5));

    assert!((moved.z - 0.5).abs() < EPS);
}

#[test]
fn slides_along_wall_on_other_axis() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(1.0, 0.0, -5.0, 2.0, 1.0, 5.0));
    let mut entity = unit_entity();
    entity.motion = DVec3::new(0.4, 0.0, 0.3);

    let motion = entity.motion;
    let moved = resolve(&world, &mut entity, motion);

    assert_eq!(moved.x, 0.0);
    assert_eq!(moved.z, 0.3);
    assert_eq!(entity.motion, DVec3::new(0.0, 0.0, 0.3));
}

#[test]
fn sweep_invariants_hold_over_grid() {
    let obstacles = [
        Aabb::from_bounds(1.2, 0.0, 0.0, 2.2, 1.0, 1.0),
        Aabb::from_bounds(0.0, -1.5, 0.0, 1.0, -0.2, 1.0),
        Aabb::from_bounds(0.5, 0.5, 1.0, 1.5, 1.5, 2.0),
        Aabb::from_bounds(-2.0, 0.3, -2.0, -0.5, 3.0, -0.1),
        Aabb::from_bounds(-0.7, -0.7, 0.2, -0.1, 0.6, 0.8),
    ];
    let steps = [-1.3, -0.4, 0.0, 0.7, 1.9];

    for obstacle in obstacles {
        let world = StaticBoxes::new().with(obstacle);
        for &x in &steps {
            for &y in &steps {
                for &z in &steps {
                    let requested = DVec3::new(x, y, z);
                    let mut entity = unit_entity();
                    entity.motion = requested;
                    let moved = resolve(&world, &mut entity, requested);

                    let bb = entity.bounding_box();
                    assert!(
                        penetration(&bb, &obstacle) < 1e-6,
                        "{requested:?} pushed {bb:?} into {obstacle:?}"
                    );

                    for (r, d) in [(x, moved.x), (y, moved.y), (z, moved.z)] {
                        assert!(d.abs() <= r.abs() + EPS, "{requested:?} grew to {moved:?}");
                        assert!(d * r >= 0.0, "{requested:?} flipped to {moved:?}");
                        if d != r {
                            assert!(entity.collided_horizontally || entity.collided_vertically);
                        }
                    }
                    if moved.x != x {
                        assert_eq!(entity.motion.x, 0.0);
                    }
                    if moved.y != y {
                        assert_eq!(entity.motion.y, 0.0);
                    }
                    if moved.z != z {
                        assert_eq!(entity.motion.z, 0.0);
                    }
                }
            }
        }
    }
}

#[test]
fn stepping_entities_do_not_penetrate() {
    let obstacles = [
        Aabb::from_bounds(1.0, 0.0, 0.0, 2.0, 0.5, 1.0),
        Aabb::from_bounds(1.0, 0.0, 0.0, 2.0, 1.0, 1.0),
        Aabb::from_bounds(1.0, 0.0, 0.0, 2.0, 3.0, 1.0),
        Aabb::from_bounds(-1.0, 1.2, -1.0, 3.0, 2.0, 3.0),
    ];
    for obstacle in obstacles {
        let world = StaticBoxes::new().with(obstacle);
        for dx in [0.3, 0.8, 1.6] {
            for dz in [-0.5, 0.0, 0.5] {
                let mut entity = unit_entity().with_step_height(1.0);
                entity.on_ground = true;
                resolve(&world, &mut entity, DVec3::new(dx, 0.0, dz));
                let bb = entity.bounding_box();
                assert!(penetration(&bb, &obstacle) < 1e-6, "{bb:?} inside {obstacle:?}");
            }
        }
    }
}

#[test]
fn keep_movement_skips_collision() {
    let world = CountingQuery::new(StaticBoxes::new().with(Aabb::from_bounds(0.0, 0.0, 1.0, 1.0, 1.0, 2.0)));
    let mut entity = unit_entity();
    entity.keep_movement = true;
    entity.keep_movement_on_ground = true;
    entity.y_size = 0.5;

    let moved = resolve(&world, &mut entity, DVec3::new(0.0, 0.25, 1.5));

    assert_eq!(moved, DVec3::new(0.0, 0.25, 1.5));
    assert_eq!(world.calls.get(), 0);
    assert!(entity.on_ground);
    assert_eq!(entity.y_size, 0.5);
    assert!((entity.position() - DVec3::new(0.5, 0.75, 2.0)).length() < EPS);
}

#[test]
fn excluded_entity_geometry_is_ignored() {
    let id = EntityId(1);
    let world = StaticBoxes::new().with_owned(id, Aabb::from_bounds(0.0, 0.0, 1.0, 1.0, 1.0, 2.0));
    let mut entity = unit_entity();

    let moved = resolve(&world, &mut entity, DVec3::new(0.0, 0.0, 0.5));

    assert_eq!(moved.z, 0.5);
}

#[test]
fn offset_query_when_ticking_faster() {
    let wall = Aabb::from_bounds(0.0, 0.0, 2.0, 1.0, 1.0, 2.5);

    let mut entity = unit_entity();
    let moved = resolve(&StaticBoxes::new().with(wall), &mut entity, DVec3::new(0.0, 0.0, 5.0));
    assert!((moved.z - 1.0).abs() < EPS);

    // the destination-only query misses thin geometry along the path
    let mut entity = unit_entity();
    let fast = StaticBoxes::new().with(wall).with_tick_rate(2);
    let moved = resolve(&fast, &mut entity, DVec3::new(0.0, 0.0, 5.0));
    assert_eq!(moved.z, 5.0);
}

#[test]
fn y_size_decays_each_move() {
    let world = StaticBoxes::new();
    let mut entity = unit_entity();
    entity.y_size = 0.5;
    resolve(&world, &mut entity, DVec3::new(0.1, 0.0, 0.0));
    assert!((entity.y_size - 0.2).abs() < EPS);
    resolve(&world, &mut entity, DVec3::new(0.1, 0.0, 0.0));
    assert!((entity.y_size - 0.08).abs() < EPS);
}

#[test]
fn fall_damage_on_landing() {
    let world = StaticBoxes::new().with(Aabb::from_bounds(-5.0, -20.0, -5.0, 5.0, -6.0, 5.0));
    let mut entity = unit_entity();
    for _ in 0..5 {
        resolve(&world, &mut entity, DVec3::new(0.0, -1.0, 0.0));
    }
    assert!((entity.fall_distance - 5.0).abs() < EPS);
    assert_eq!(entity.pending_damage, 0.0);

    // only 1.0 of the requested 2.0 is available
    let moved = resolve(&world, &mut entity, DVec3::new(0.0, -2.0, 0.0));
    assert!((moved.y + 1.0).abs() < EPS);
    assert!(entity.on_ground);
    assert_eq!(entity.fall_distance, 0.0);
    // fall distance 5 at touchdown; the landing move itself is not counted
    assert_eq!(entity.take_pending_damage(), 2.0);
    assert_eq!(entity.pending_damage, 0.0);
}

#[test]
fn crossing_chunk_border_is_flagged() {
    let world = StaticBoxes::new();
    let mut entity =
        MovableEntity::from_box(EntityId(4), Aabb::from_bounds(14.0, 0.0, 0.0, 15.0, 1.0, 1.0));
    resolve(&world, &mut entity, DVec3::new(0.25, 0.0, 0.0));
    assert!(!entity.chunk_changed);
    resolve(&world, &mut entity, DVec3::new(1.5, 0.0, 0.0));
    assert!(entity.chunk_changed);
}

#[test]
fn validate_reports_contract_violations() {
    let world = StaticBoxes::new();
    let resolver = MotionResolver::new(&world, MotionConfig::default());

    assert_eq!(
        resolver.validate(DVec3::new(0.0, 25.0, 0.0)),
        Err(MotionError::ExcessiveDisplacement {
            axis: Axis::Y,
            value: 25.0,
            limit: 20.0,
        })
    );
    assert!(matches!(
        resolver.validate(DVec3::new(f64::NAN, 0.0, 0.0)),
        Err(MotionError::NonFinite { axis: Axis::X, .. })
    ));
    assert!(resolver.validate(DVec3::new(20.0, -20.0, 0.0)).is_ok());

    let fixed = resolver.sanitize(DVec3::new(f64::INFINITY, -30.0, 4.0));
    assert_eq!(fixed, DVec3::new(0.0, -20.0, 4.0));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "contract violation")]
fn runaway_displacement_panics_in_debug() {
    let world = StaticBoxes::new();
    let mut entity = unit_entity();
    resolve(&world, &mut entity, DVec3::new(21.0, 0.0, 0.0));
}

fn flat_world() -> WorldCollisionMap {
    let mut map = WorldCollisionMap::new(1);
    for cx in -1..=1 {
        for cz in -1..=1 {
            let mut chunk = ChunkData::empty(cx, cz);
            chunk.sections.push(ChunkSection::filled(0, 0));
            map.update_chunk(chunk);
        }
    }
    for x in -16..32 {
        for z in -16..32 {
            map.apply_block_update(BlockUpdate {
                x,
                y: 3,
                z,
                block_state: block_state(1, 0),
            });
        }
    }
    map
}

#[test]
fn falls_onto_terrain() {
    let map = flat_world();
    let mut entity = MovableEntity::new(EntityId(9), DVec3::new(0.5, 10.0, 0.5), 0.98, 0.98);
    for _ in 0..200 {
        entity.motion.y -= 0.04;
        let motion = entity.motion;
        resolve(&map, &mut entity, motion);
        entity.motion *= 0.98;
        if entity.on_ground {
            break;
        }
    }
    assert!(entity.on_ground);
    assert!((entity.feet().y - 4.0).abs() < 1e-6);
}

#[test]
fn climbs_slab_with_half_block_step() {
    let mut map = flat_world();
    map.apply_block_update(BlockUpdate {
        x: 2,
        y: 4,
        z: 0,
        block_state: block_state(44, 0),
    });
    let mut entity = MovableEntity::new(EntityId(10), DVec3::new(1.5, 4.35, 0.5), 0.98, 0.7)
        .with_step_height(0.5);
    entity.on_ground = true;
    entity.motion = DVec3::new(0.3, 0.0, 0.0);

    let motion = entity.motion;
    let moved = resolve(&map, &mut entity, motion);

    assert!((moved.x - 0.3).abs() < EPS);
    assert!((entity.feet().y - 4.5).abs() < 1e-6);
}

#[test]
fn cobweb_contact_resets_fall() {
    let mut map = flat_world();
    map.apply_block_update(BlockUpdate {
        x: 0,
        y: 6,
        z: 0,
        block_state: block_state(30, 0),
    });
    let mut entity = MovableEntity::new(EntityId(11), DVec3::new(0.5, 8.0, 0.5), 0.5, 0.5);
    entity.fall_distance = 10.0;
    resolve(&map, &mut entity, DVec3::new(0.0, -1.5, 0.0));
    assert!(entity.in_web);
    // web resets fall distance before this move's drop is added
    assert!((entity.fall_distance - 1.5).abs() < EPS);
}
