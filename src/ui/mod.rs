pub mod gamepad;
pub mod input;
pub mod link;
pub mod renderer;
pub mod sound;
