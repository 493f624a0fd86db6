pub mod antagonist;
pub mod assets;
pub mod entity;
pub mod message;
pub mod physics;
pub mod rules;
