// Game modules: characters, combat and the shared entity arena

pub mod characters;
pub mod combat;
pub mod world;

pub use world::{Character, EntityId, World};
