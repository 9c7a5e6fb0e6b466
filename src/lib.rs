pub mod cli;
pub mod config;
pub mod ecs;
pub mod events;
pub mod input;
pub mod tool;

pub use ecs::ZoneToolsWorld;
