use bevy_ecs::prelude::Component;
use bevy_math::DVec3;
use rs_sim::MovableEntity;
use rs_utils::EntityId;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Boat,
    FallingBlock,
    Arrow,
    Snowball,
    Item,
    Mob,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub width: f64,
    pub height: f64,
    /// Downward acceleration per tick. Boats use it as buoyancy instead.
    pub gravity: f64,
    pub drag: f64,
    pub step_height: f64,
}

impl EntityKind {
    pub fn physics(self) -> Physics {
        let (width, height, gravity, drag, step_height) = match self {
            EntityKind::Boat => (1.6, 0.7, 0.1, 0.1, 1.0),
            EntityKind::FallingBlock => (0.98, 0.98, 0.04, 0.02, 0.0),
            EntityKind::Arrow => (0.25, 0.25, 0.05, 0.01, 0.0),
            EntityKind::Snowball => (0.25, 0.25, 0.03, 0.01, 0.0),
            EntityKind::Item => (0.25, 0.25, 0.04, 0.02, 0.0),
            EntityKind::Mob => (0.6, 1.8, 0.08, 0.02, 0.6),
        };
        Physics {
            width,
            height,
            gravity,
            drag,
            step_height,
        }
    }

    /// Fresh body standing with its feet at `feet`.
    pub fn spawn(self, id: EntityId, feet: DVec3) -> MovableEntity {
        let physics = self.physics();
        let center = feet + DVec3::new(0.0, physics.height * 0.5, 0.0);
        MovableEntity::new(id, center, physics.width, physics.height)
            .with_step_height(physics.step_height)
    }
}
