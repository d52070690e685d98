// Per-entity animation and motion state

use crate::core::math::Vector2;
use crate::game::world::EntityId;

use super::animation::AnimationId;

/// Direction an entity faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    Left = -1,
    #[default]
    Right = 1,
}

impl Facing {
    /// -1.0 for left, 1.0 for right
    pub fn sign(&self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Facing for a horizontal direction; zero counts as right
    pub fn from_direction(x: f32) -> Self {
        if x < 0.0 {
            Self::Left
        } else {
            Self::Right
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Self::Left)
    }

    /// Mirror a local-space offset into world orientation
    pub fn mirror(&self, offset: Vector2) -> Vector2 {
        Vector2::new(offset.x * self.sign(), offset.y)
    }
}

/// Animation and placement state shared by characters, projectiles and effects
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterState {
    pub id: EntityId,
    pub position: Vector2,
    pub facing: Facing,
    pub current_animation: AnimationId,
    /// Always within the current animation's frame range
    pub animation_frame: usize,
    /// Time spent in the current animation (ms)
    pub animation_time: f64,
    /// Set once the current animation has been stepped; frame 0 events fire
    /// on the step that sets it
    pub animation_started: bool,
}

impl CharacterState {
    pub fn new(id: &str, position: Vector2, facing: Facing, animation: AnimationId) -> Self {
        Self {
            id: id.to_string(),
            position,
            facing,
            current_animation: animation,
            animation_frame: 0,
            animation_time: 0.0,
            animation_started: false,
        }
    }

    /// Switch to an animation from its first frame, even if it's the same one
    pub fn restart(&mut self, animation: AnimationId) {
        self.current_animation = animation;
        self.animation_frame = 0;
        self.animation_time = 0.0;
        self.animation_started = false;
    }
}

/// A flying projectile
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileState {
    pub state: CharacterState,
    /// Units per second
    pub velocity: Vector2,
    pub speed: f32,
    /// Fail-safe lifetime (ms)
    pub max_lifetime: f64,
    /// Time alive (ms)
    pub lifetime: f64,
    pub damage: f32,
    pub knockback: Vector2,
    /// Hitstun applied on hit (ms)
    pub hitstun: f32,
    /// Character that fired it; not re-validated after spawn
    pub owner: EntityId,
    /// Simulation time at which a destroyed projectile leaves the world
    pub removal_at: Option<f64>,
}

impl ProjectileState {
    /// Destroyed and playing its terminal animation
    pub fn is_dying(&self) -> bool {
        self.removal_at.is_some()
    }

    pub fn id(&self) -> &str {
        &self.state.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_sign() {
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left as i32, -1);
        assert_eq!(Facing::default(), Facing::Right);
    }

    #[test]
    fn test_facing_from_direction() {
        assert_eq!(Facing::from_direction(-3.0), Facing::Left);
        assert_eq!(Facing::from_direction(0.0), Facing::Right);
        assert_eq!(Facing::from_direction(2.0), Facing::Right);
    }

    #[test]
    fn test_facing_mirror() {
        let offset = Vector2::new(40.0, -20.0);
        assert_eq!(Facing::Right.mirror(offset), offset);
        assert_eq!(Facing::Left.mirror(offset), Vector2::new(-40.0, -20.0));
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert!(Facing::Right.flipped().is_left());
    }

    #[test]
    fn test_restart_resets_timing() {
        let registry = crate::game::characters::animation::AnimationRegistry::standard();
        let idle = registry.resolve("idle").unwrap();
        let ranged = registry.resolve("ranged").unwrap();

        let mut state = CharacterState::new("c1", Vector2::new(1.0, 2.0), Facing::Left, idle);
        state.animation_frame = 2;
        state.animation_time = 300.0;
        state.animation_started = true;

        state.restart(ranged);
        assert_eq!(state.current_animation, ranged);
        assert_eq!(state.animation_frame, 0);
        assert_eq!(state.animation_time, 0.0);
        assert!(!state.animation_started);

        // Same animation restarts too
        state.animation_frame = 1;
        state.restart(ranged);
        assert_eq!(state.animation_frame, 0);
    }
}
