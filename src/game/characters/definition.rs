// Character definitions supplied by the embedding game
//
// The engine only needs the muzzle point to place projectiles; everything
// else about a character (stats, deck, AI) lives with the game rules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::math::Vector2;
use crate::game::world::EntityId;

use super::state::Facing;

/// Spawn-point geometry for one character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterDefinition {
    /// Local-space point projectiles leave from, relative to the pivot
    pub muzzle_offset: Vector2,
    /// Sprite-space anchor that the character's position refers to
    pub pivot: Vector2,
}

/// Definition used when the game doesn't customize a character
pub const STANDARD_DEFINITION: CharacterDefinition = CharacterDefinition {
    // Chest height, a little in front of the body
    muzzle_offset: Vector2::new(40.0, -30.0),
    // Bottom-center of a 64x64 frame
    pivot: Vector2::new(32.0, 64.0),
};

impl Default for CharacterDefinition {
    fn default() -> Self {
        STANDARD_DEFINITION
    }
}

impl CharacterDefinition {
    pub fn new(muzzle_offset: Vector2, pivot: Vector2) -> Self {
        Self {
            muzzle_offset,
            pivot,
        }
    }

    /// World-space muzzle point for a character standing at `position`
    pub fn muzzle_position(&self, position: Vector2, facing: Facing) -> Vector2 {
        position + facing.mirror(self.muzzle_offset)
    }
}

/// Lookup from character id to definition
#[derive(Debug, Clone, Default)]
pub struct CharacterDefinitions {
    definitions: HashMap<EntityId, CharacterDefinition>,
}

impl CharacterDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a character's definition
    pub fn insert(&mut self, id: &str, definition: CharacterDefinition) {
        self.definitions.insert(id.to_string(), definition);
    }

    pub fn with(mut self, id: &str, definition: CharacterDefinition) -> Self {
        self.insert(id, definition);
        self
    }

    pub fn get(&self, id: &str) -> Option<&CharacterDefinition> {
        self.definitions.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<CharacterDefinition> {
        self.definitions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
