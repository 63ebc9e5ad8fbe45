//! Axis-aligned rectangles in world pixels

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Float rectangle, `position` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Static overlap test. Intervals are half-open, so touching edges do not overlap.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left() && point.x < self.right() && point.y >= self.top() && point.y < self.bottom()
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::new(self.position + offset, self.size)
    }

    /// Minkowski sum with a box of the given half extents
    pub fn expanded(&self, half_extents: Vec2) -> Rect {
        Rect::new(self.position - half_extents, self.size + half_extents * 2.0)
    }
}

/// Integer rectangle, used for chunk bounds and merged grid regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IRect {
    pub position: IVec2,
    pub size: IVec2,
}

impl IRect {
    pub const fn new(position: IVec2, size: IVec2) -> Self {
        Self { position, size }
    }

    pub fn max(&self) -> IVec2 {
        self.position + self.size
    }

    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.position.x
            && point.y >= self.position.y
            && point.x < self.position.x + self.size.x
            && point.y < self.position.y + self.size.y
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.position.as_vec2(), self.size.as_vec2())
    }
}
