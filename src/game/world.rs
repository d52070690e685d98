// Entity arena shared by the animation engine and the character system
//
// Ids are unique across characters, projectiles and effects. Tables are
// ordered by id so every pass over them is deterministic.

use std::collections::BTreeMap;

use crate::core::math::BoundingBox;
use crate::engine::error::EngineError;
use crate::game::characters::hitbox::to_world;
use crate::game::characters::state::{CharacterState, ProjectileState};

/// Unique identifier for an entity
pub type EntityId = String;

/// A character and the hurtboxes of its current frame
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub state: CharacterState,
    /// Hurtboxes of the current frame in local space
    local_hurtboxes: Vec<BoundingBox>,
    /// `local_hurtboxes` placed at the character's position and facing
    hurtboxes: Vec<BoundingBox>,
}

impl Character {
    pub fn new(state: CharacterState) -> Self {
        Self {
            state,
            local_hurtboxes: Vec::new(),
            hurtboxes: Vec::new(),
        }
    }

    /// World-space hurtboxes
    pub fn hurtboxes(&self) -> &[BoundingBox] {
        &self.hurtboxes
    }

    /// Replace the local hurtboxes and place them in the world
    pub fn set_local_hurtboxes(&mut self, boxes: Vec<BoundingBox>) {
        self.local_hurtboxes = boxes;
        self.reproject();
    }

    /// Recompute world hurtboxes after a position or facing change
    pub fn reproject(&mut self) {
        let position = self.state.position;
        let facing = self.state.facing;
        self.hurtboxes = self
            .local_hurtboxes
            .iter()
            .map(|local| to_world(local, position, facing))
            .collect();
    }
}

/// Owns every live entity
#[derive(Debug, Clone, Default)]
pub struct World {
    characters: BTreeMap<EntityId, Character>,
    projectiles: BTreeMap<EntityId, ProjectileState>,
    effects: BTreeMap<EntityId, CharacterState>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any entity uses this id
    pub fn contains(&self, id: &str) -> bool {
        self.characters.contains_key(id)
            || self.projectiles.contains_key(id)
            || self.effects.contains_key(id)
    }

    fn ensure_free(&self, id: &str) -> Result<(), EngineError> {
        if self.contains(id) {
            Err(EngineError::AlreadyExists(id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn insert_character(&mut self, character: Character) -> Result<(), EngineError> {
        self.ensure_free(&character.state.id)?;
        self.characters
            .insert(character.state.id.clone(), character);
        Ok(())
    }

    pub fn insert_projectile(&mut self, projectile: ProjectileState) -> Result<(), EngineError> {
        self.ensure_free(projectile.id())?;
        self.projectiles
            .insert(projectile.state.id.clone(), projectile);
        Ok(())
    }

    pub fn insert_effect(&mut self, effect: CharacterState) -> Result<(), EngineError> {
        self.ensure_free(&effect.id)?;
        self.effects.insert(effect.id.clone(), effect);
        Ok(())
    }

    /// Get a character by ID
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    /// Get a mutable character by ID
    pub fn character_mut(&mut self, id: &str) -> Option<&mut Character> {
        self.characters.get_mut(id)
    }

    pub fn projectile(&self, id: &str) -> Option<&ProjectileState> {
        self.projectiles.get(id)
    }

    pub fn projectile_mut(&mut self, id: &str) -> Option<&mut ProjectileState> {
        self.projectiles.get_mut(id)
    }

    pub fn effect(&self, id: &str) -> Option<&CharacterState> {
        self.effects.get(id)
    }

    pub fn effect_mut(&mut self, id: &str) -> Option<&mut CharacterState> {
        self.effects.get_mut(id)
    }

    /// Get all characters, ordered by id
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn characters_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.characters.values_mut()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &ProjectileState> {
        self.projectiles.values()
    }

    pub fn projectiles_mut(&mut self) -> impl Iterator<Item = &mut ProjectileState> {
        self.projectiles.values_mut()
    }

    pub fn effects(&self) -> impl Iterator<Item = &CharacterState> {
        self.effects.values()
    }

    pub fn effects_mut(&mut self) -> impl Iterator<Item = &mut CharacterState> {
        self.effects.values_mut()
    }

    /// Remove a character by ID
    pub fn remove_character(&mut self, id: &str) -> Option<Character> {
        self.characters.remove(id)
    }

    pub fn remove_projectile(&mut self, id: &str) -> Option<ProjectileState> {
        self.projectiles.remove(id)
    }

    pub fn remove_effect(&mut self, id: &str) -> Option<CharacterState> {
        self.effects.remove(id)
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        self.characters.clear();
        self.projectiles.clear();
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vector2;
    use crate::game::characters::animation::AnimationRegistry;
    use crate::game::characters::state::Facing;

    fn state(id: &str) -> CharacterState {
        let idle = AnimationRegistry::standard().resolve("idle").unwrap();
        CharacterState::new(id, Vector2::ZERO, Facing::Right, idle)
    }

    #[test]
    fn test_world_new() {
        let world = World::new();
        assert_eq!(world.character_count(), 0);
        assert_eq!(world.projectile_count(), 0);
        assert_eq!(world.effect_count(), 0);
    }

    #[test]
    fn test_ids_unique_across_tables() {
        let mut world = World::new();
        world.insert_character(Character::new(state("a"))).unwrap();

        assert_eq!(
            world.insert_effect(state("a")),
            Err(EngineError::AlreadyExists("a".to_string()))
        );
        assert_eq!(
            world.insert_character(Character::new(state("a"))),
            Err(EngineError::AlreadyExists("a".to_string()))
        );
        assert!(world.insert_effect(state("b")).is_ok());
        assert!(world.contains("b"));
    }

    #[test]
    fn test_iteration_ordered_by_id() {
        let mut world = World::new();
        for id in ["c", "a", "b"] {
            world.insert_character(Character::new(state(id))).unwrap();
        }
        let ids: Vec<&str> = world.characters().map(|c| c.state.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_hurtboxes_follow_position() {
        let mut character = Character::new(state("a"));
        character.set_local_hurtboxes(vec![BoundingBox::new(10.0, -60.0, 40.0, 60.0)]);
        assert_eq!(
            character.hurtboxes(),
            &[BoundingBox::new(10.0, -60.0, 40.0, 60.0)]
        );

        character.state.position = Vector2::new(100.0, 200.0);
        character.state.facing = Facing::Left;
        character.reproject();
        assert_eq!(
            character.hurtboxes(),
            &[BoundingBox::new(90.0, 140.0, 40.0, 60.0)]
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let mut world = World::new();
        world.insert_character(Character::new(state("a"))).unwrap();
        world.insert_effect(state("fx")).unwrap();

        assert!(world.remove_character("a").is_some());
        assert!(world.remove_character("a").is_none());

        world.clear();
        assert!(!world.contains("fx"));
    }
}
