//! Physics - shapes, merged terrain colliders, swept tests and the character controller

pub mod collider;
pub mod collision;
pub mod controller;
pub mod rect;

pub use collider::{Collider, ColliderMerger};
pub use collision::{ray_vs_rect, sweep, Contact};
pub use controller::{CharacterController, StepReport, SweptContact};
pub use rect::{IRect, Rect};
pub use crate::simulation::CollisionClass;
