//! Player input state

use crate::simulation::BlockId;
use glam::Vec2;

/// Tracks current input state for player control
#[derive(Debug, Clone)]
pub struct InputState {
    // Movement keys
    pub w_pressed: bool,
    pub a_pressed: bool,
    pub s_pressed: bool, // Also drops through platforms
    pub d_pressed: bool,
    pub jump_pressed: bool,

    /// Block placed with the right mouse button
    pub selected_block: u16,

    // Mouse state
    pub mouse_world_pos: Option<Vec2>,
    pub left_mouse_pressed: bool,
    pub right_mouse_pressed: bool,
    pub prev_right_mouse_pressed: bool, // Previous tick's right mouse state
}

impl InputState {
    pub fn new() -> Self {
        Self {
            w_pressed: false,
            a_pressed: false,
            s_pressed: false,
            d_pressed: false,
            jump_pressed: false,
            selected_block: BlockId::DIRT,
            mouse_world_pos: None,
            left_mouse_pressed: false,
            right_mouse_pressed: false,
            prev_right_mouse_pressed: false,
        }
    }

    /// -1 for left, 1 for right, 0 for none or both
    pub fn horizontal(&self) -> f32 {
        (self.d_pressed as i32 - self.a_pressed as i32) as f32
    }

    /// -1 for up, 1 for down (y grows downward)
    pub fn vertical(&self) -> f32 {
        (self.s_pressed as i32 - self.w_pressed as i32) as f32
    }

    pub fn drop_through(&self) -> bool {
        self.s_pressed
    }

    /// Right button went down this tick
    pub fn right_clicked(&self) -> bool {
        self.right_mouse_pressed && !self.prev_right_mouse_pressed
    }

    /// Call once at the end of each tick
    pub fn end_tick(&mut self) {
        self.prev_right_mouse_pressed = self.right_mouse_pressed;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
