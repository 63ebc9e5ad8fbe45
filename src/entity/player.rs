use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::Rect;

/// The player's physical state. Behaviour lives in `CharacterController`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner in world pixels
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
    /// Sub-pixel movement not yet applied by integer stepping
    #[serde(skip)]
    pub remainder: Vec2,
}

impl Body {
    pub const DEFAULT_SIZE: Vec2 = Vec2::new(16.0, 24.0);

    /// Create a new body at the specified position
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
            grounded: false,
            remainder: Vec2::ZERO,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Move the body by the specified offset
    pub fn move_by(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Drop all motion, e.g. after a teleport
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.remainder = Vec2::ZERO;
        self.grounded = false;
    }
}
