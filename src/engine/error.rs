// Error types for the engine, the character system and the animation registry

use crate::game::world::EntityId;

/// Errors returned by entity-level operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Entity already exists: {0}")]
    AlreadyExists(EntityId),

    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Entity is not a character: {0}")]
    NotACharacter(EntityId),

    #[error("Animation not found: {0}")]
    UnknownAnimation(String),

    #[error("Non-finite value for {field}")]
    NonFinite { field: &'static str },
}

/// Errors raised while building or loading an animation registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate animation: {0}")]
    Duplicate(String),

    #[error("Invalid animation {name}: {reason}")]
    Invalid { name: String, reason: String },

    #[error("Failed to parse animation data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
