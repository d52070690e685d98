// Character system
//
// This module contains everything related to animated entities:
// - Animation data and the registry
// - Per-entity animation state and facing
// - Character definitions supplied by the game
// - Facing, movement and hit/hurtbox queries over the world

pub mod animation;
pub mod character;
pub mod definition;
pub mod hitbox;
pub mod state;

// Re-export commonly used types
pub use animation::{AnimationData, AnimationId, AnimationRegistry, FrameHitbox, HitboxKind};
pub use definition::{CharacterDefinition, CharacterDefinitions};
pub use hitbox::{check_collision, HitResult};
pub use state::{CharacterState, Facing, ProjectileState};
