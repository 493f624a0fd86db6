pub mod event;
pub mod scheduler;
pub mod step;
pub mod tween;
pub mod world;
