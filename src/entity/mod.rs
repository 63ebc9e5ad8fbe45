//! Player body and input

pub mod input;
pub mod player;

pub use input::InputState;
pub use player::Body;
