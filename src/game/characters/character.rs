// Character system: facing, movement and spatial queries over the world
//
// These are plain functions over `World` so the animation engine and game
// code share one set of characters. They never step animations; the engine
// refreshes hurtboxes whenever it changes a character's frame.

use crate::core::math::{ensure_finite, ensure_finite_vec, BoundingBox, Vector2};
use crate::engine::config::IDLE_ANIMATION;
use crate::engine::error::EngineError;
use crate::game::world::{Character, World};

use super::animation::{AnimationRegistry, FrameHitbox, HitboxKind};
use super::hitbox::{check_collision, contains_point, to_world, HitResult};
use super::state::{CharacterState, Facing};

/// Horizontal speed at or below which movement leaves facing alone
pub const FACING_DEADZONE: f32 = 0.1;

fn character_mut<'a>(world: &'a mut World, id: &str) -> Result<&'a mut Character, EngineError> {
    if world.character(id).is_none() {
        return Err(if world.contains(id) {
            EngineError::NotACharacter(id.to_string())
        } else {
            EngineError::NotFound(id.to_string())
        });
    }
    world
        .character_mut(id)
        .ok_or_else(|| EngineError::NotFound(id.to_string()))
}

/// Create a character in its idle animation
pub fn create_character(
    world: &mut World,
    registry: &AnimationRegistry,
    id: &str,
    position: Vector2,
    facing: Facing,
) -> Result<(), EngineError> {
    let position = ensure_finite_vec("position", position)?;
    let idle = registry
        .resolve(IDLE_ANIMATION)
        .ok_or_else(|| EngineError::UnknownAnimation(IDLE_ANIMATION.to_string()))?;

    let mut character = Character::new(CharacterState::new(id, position, facing, idle));
    refresh_hurtboxes(&mut character, registry);
    world.insert_character(character)
}

/// Get a character's state by ID
pub fn get_character<'a>(world: &'a World, id: &str) -> Option<&'a CharacterState> {
    world.character(id).map(|character| &character.state)
}

pub fn update_character_position(
    world: &mut World,
    id: &str,
    position: Vector2,
) -> Result<(), EngineError> {
    let position = ensure_finite_vec("position", position)?;
    let character = character_mut(world, id)?;
    character.state.position = position;
    character.reproject();
    Ok(())
}

pub fn set_character_facing(world: &mut World, id: &str, facing: Facing) -> Result<(), EngineError> {
    let character = character_mut(world, id)?;
    character.state.facing = facing;
    character.reproject();
    Ok(())
}

/// Facing toward a target point; a target straight above or below faces left
pub fn calculate_facing_to_target(world: &World, id: &str, target: Vector2) -> Option<Facing> {
    get_character(world, id).map(|state| {
        if target.x > state.position.x {
            Facing::Right
        } else {
            Facing::Left
        }
    })
}

/// Turn toward horizontal movement outside the deadzone, returns the facing
pub fn update_facing_from_movement(
    world: &mut World,
    id: &str,
    velocity: Vector2,
) -> Result<Facing, EngineError> {
    let character = character_mut(world, id)?;
    if velocity.x.abs() > FACING_DEADZONE {
        let facing = Facing::from_direction(velocity.x);
        if facing != character.state.facing {
            character.state.facing = facing;
            character.reproject();
        }
    }
    Ok(character.state.facing)
}

/// Move along a direction by `speed` units; a zero direction does nothing
pub fn move_character(
    world: &mut World,
    id: &str,
    direction: Vector2,
    speed: f32,
) -> Result<(), EngineError> {
    let direction = ensure_finite_vec("direction", direction)?;
    let speed = ensure_finite("speed", speed)?;
    let character = character_mut(world, id)?;

    let normalized = direction.normalize_or_zero();
    if normalized == Vector2::ZERO {
        return Ok(());
    }

    let velocity = normalized * speed;
    character.state.position += velocity;
    if velocity.x.abs() > FACING_DEADZONE {
        character.state.facing = Facing::from_direction(velocity.x);
    }
    character.reproject();
    Ok(())
}

/// Set position directly, keeping facing
pub fn teleport_character(world: &mut World, id: &str, position: Vector2) -> Result<(), EngineError> {
    update_character_position(world, id, position)
}

/// Load the hurtboxes of an animation frame onto a character
pub fn update_hurtboxes(
    world: &mut World,
    registry: &AnimationRegistry,
    id: &str,
    animation: &str,
    frame: usize,
) -> Result<(), EngineError> {
    let data = registry
        .by_name(animation)
        .ok_or_else(|| EngineError::UnknownAnimation(animation.to_string()))?;
    let boxes: Vec<BoundingBox> = data
        .hitboxes_at(frame, HitboxKind::Hurt)
        .map(|hitbox| hitbox.bounds)
        .collect();
    character_mut(world, id)?.set_local_hurtboxes(boxes);
    Ok(())
}

/// Load the hurtboxes of the character's current animation frame
pub fn refresh_hurtboxes(character: &mut Character, registry: &AnimationRegistry) {
    let boxes: Vec<BoundingBox> = registry
        .get(character.state.current_animation)
        .map(|data| {
            data.hitboxes_at(character.state.animation_frame, HitboxKind::Hurt)
                .map(|hitbox| hitbox.bounds)
                .collect()
        })
        .unwrap_or_default();
    character.set_local_hurtboxes(boxes);
}

/// Check if a point falls inside any of the character's hurtboxes
pub fn check_point_collision(world: &World, id: &str, point: Vector2) -> bool {
    world.character(id).is_some_and(|character| {
        character
            .hurtboxes()
            .iter()
            .any(|bounds| contains_point(bounds, point))
    })
}

/// Check if any hurtbox pair between two characters overlaps
pub fn check_character_collision(world: &World, a: &str, b: &str) -> bool {
    let (Some(a), Some(b)) = (world.character(a), world.character(b)) else {
        return false;
    };
    a.hurtboxes()
        .iter()
        .any(|box_a| b.hurtboxes().iter().any(|box_b| check_collision(box_a, box_b)))
}

/// World-space hit boxes active on the character's current frame
pub fn active_hitboxes(
    world: &World,
    registry: &AnimationRegistry,
    id: &str,
) -> Vec<(BoundingBox, FrameHitbox)> {
    let Some(state) = get_character(world, id) else {
        return Vec::new();
    };
    let Some(data) = registry.get(state.current_animation) else {
        return Vec::new();
    };
    data.hitboxes_at(state.animation_frame, HitboxKind::Hit)
        .map(|hitbox| {
            (
                to_world(&hitbox.bounds, state.position, state.facing),
                hitbox.clone(),
            )
        })
        .collect()
}

/// First active hitbox of `attacker` that overlaps a hurtbox of `defender`
pub fn check_hit(
    world: &World,
    registry: &AnimationRegistry,
    attacker: &str,
    defender: &str,
) -> Option<HitResult> {
    if attacker == defender {
        return None;
    }
    let facing = get_character(world, attacker)?.facing;
    let target = world.character(defender)?;

    active_hitboxes(world, registry, attacker)
        .into_iter()
        .find(|(bounds, _)| {
            target
                .hurtboxes()
                .iter()
                .any(|hurtbox| check_collision(bounds, hurtbox))
        })
        .map(|(bounds, hitbox)| HitResult {
            attacker: attacker.to_string(),
            defender: defender.to_string(),
            hitbox: bounds,
            damage: hitbox.damage.unwrap_or_default(),
            knockback: facing.mirror(hitbox.knockback.unwrap_or_default()),
            hitstun: hitbox.hitstun.unwrap_or_default(),
        })
}

pub fn is_in_animation(
    world: &World,
    registry: &AnimationRegistry,
    id: &str,
    animation: &str,
) -> bool {
    match (get_character(world, id), registry.resolve(animation)) {
        (Some(state), Some(animation)) => state.current_animation == animation,
        _ => false,
    }
}

pub fn is_in_frame(world: &World, id: &str, frame: usize) -> bool {
    get_character(world, id).is_some_and(|state| state.animation_frame == frame)
}

/// Check if the current frame is within `start..=end`
pub fn is_in_frame_range(world: &World, id: &str, start: usize, end: usize) -> bool {
    get_character(world, id)
        .is_some_and(|state| (start..=end).contains(&state.animation_frame))
}

pub fn get_all_characters(world: &World) -> Vec<&CharacterState> {
    world.characters().map(|character| &character.state).collect()
}

/// Characters whose position is within `radius` of `center` (inclusive)
pub fn get_characters_in_area(world: &World, center: Vector2, radius: f32) -> Vec<&CharacterState> {
    world
        .characters()
        .map(|character| &character.state)
        .filter(|state| state.position.distance(center) <= radius)
        .collect()
}

/// Closest character to `position`, optionally skipping one id.
/// Ties go to the lowest id.
pub fn get_nearest_character<'a>(
    world: &'a World,
    position: Vector2,
    exclude: Option<&str>,
) -> Option<&'a CharacterState> {
    world
        .characters()
        .map(|character| &character.state)
        .filter(|state| exclude != Some(state.id.as_str()))
        .fold(None, |nearest: Option<(&CharacterState, f32)>, state| {
            let distance = state.position.distance_squared(position);
            match nearest {
                Some((_, best)) if best <= distance => nearest,
                _ => Some((state, distance)),
            }
        })
        .map(|(state, _)| state)
}

/// Remove a character by ID, returns whether it existed
pub fn remove_character(world: &mut World, id: &str) -> bool {
    world.remove_character(id).is_some()
}

/// Remove every entity from the world
pub fn clear(world: &mut World) {
    world.clear();
}
