//! Fixed-timestep 2D animation and combat-event engine
//!
//! Characters, projectiles and effects are driven frame by frame from an
//! [`AnimationRegistry`]. Frame events (projectile spawns, sound cues, damage
//! windows) are turned into [`CombatEvent`]s for the game rules to consume.

pub mod core;
pub mod engine;
pub mod game;

pub use crate::core::math::{BoundingBox, Vector2};
pub use crate::engine::{EngineConfig, EngineError, FixedStepClock, RegistryError};
pub use crate::game::characters::{
    AnimationData, AnimationId, AnimationRegistry, CharacterDefinition, CharacterDefinitions,
    CharacterState, Facing, ProjectileState,
};
pub use crate::game::combat::{AnimationEngine, CombatEvent, EngineSnapshot, ProjectileSpec};
pub use crate::game::world::{EntityId, World};
