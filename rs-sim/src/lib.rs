pub mod aabb;
pub mod collision;
pub mod config;
pub mod error;
pub mod movement;
pub mod types;

pub use aabb::Aabb;
pub use collision::{CollisionQuery, ContactEffect, StaticBoxes, WorldCollisionMap};
pub use config::MotionConfig;
pub use error::{Axis, ConfigError, MotionError};
pub use movement::MotionResolver;
pub use types::{BoundingBoxCache, MovableEntity};

#[cfg(test)]
mod tests;
