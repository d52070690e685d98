// Projectile spawn parameters and motion

use crate::core::math::{ensure_finite, ensure_finite_vec, Vector2};
use crate::engine::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::game::characters::animation::AnimationId;
use crate::game::characters::state::{CharacterState, Facing, ProjectileState};
use crate::game::world::EntityId;

use super::events::SpawnProjectileData;

/// Everything needed to launch a projectile; unset combat values fall back
/// to the engine config
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSpec {
    pub position: Vector2,
    /// Units per second
    pub velocity: Vector2,
    pub owner: EntityId,
    pub damage: Option<f32>,
    pub knockback: Option<Vector2>,
    pub hitstun: Option<f32>,
}

impl ProjectileSpec {
    pub fn new(position: Vector2, velocity: Vector2, owner: &str) -> Self {
        Self {
            position,
            velocity,
            owner: owner.to_string(),
            damage: None,
            knockback: None,
            hitstun: None,
        }
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_knockback(mut self, knockback: Vector2) -> Self {
        self.knockback = Some(knockback);
        self
    }

    pub fn with_hitstun(mut self, hitstun: f32) -> Self {
        self.hitstun = Some(hitstun);
        self
    }

    /// Apply the overrides an animation event declared
    pub fn with_overrides(mut self, data: &SpawnProjectileData) -> Self {
        self.damage = data.damage.or(self.damage);
        self.knockback = data.knockback.or(self.knockback);
        self.hitstun = data.hitstun.or(self.hitstun);
        self
    }

    /// Validate and build the projectile's state
    pub(crate) fn build(
        self,
        id: &str,
        animation: AnimationId,
        config: &EngineConfig,
    ) -> Result<ProjectileState, EngineError> {
        let position = ensure_finite_vec("position", self.position)?;
        let velocity = ensure_finite_vec("velocity", self.velocity)?;
        let damage = ensure_finite("damage", self.damage.unwrap_or(config.projectile_damage))?;
        let knockback = ensure_finite_vec(
            "knockback",
            self.knockback.unwrap_or(config.projectile_knockback),
        )?;
        let hitstun = ensure_finite(
            "hitstun",
            self.hitstun.unwrap_or(config.projectile_hitstun_ms),
        )?;

        let facing = Facing::from_direction(velocity.x);
        Ok(ProjectileState {
            state: CharacterState::new(id, position, facing, animation),
            velocity,
            speed: velocity.length(),
            max_lifetime: config.projectile_max_lifetime_ms,
            lifetime: 0.0,
            damage,
            knockback,
            hitstun,
            owner: self.owner,
            removal_at: None,
        })
    }
}

/// Move a projectile along its velocity for `step_ms`
pub fn integrate(projectile: &mut ProjectileState, step_ms: f64) {
    projectile.state.position += projectile.velocity * (step_ms / 1000.0) as f32;
    projectile.lifetime += step_ms;
}
