// Engine tuning - one table of constants shared by every match
//
// Gameplay differences come from animation data, not from engine constants.

use serde::{Deserialize, Serialize};

use crate::core::math::Vector2;

/// Name of the animation every character starts in and returns to
pub const IDLE_ANIMATION: &str = "idle";
/// Name of the animation projectiles fly with
pub const PROJECTILE_ANIMATION: &str = "projectile";
/// Name of the terminal animation played before a projectile is removed
pub const DIE_ANIMATION: &str = "die";

/// Default simulation step (60 updates per second)
pub const DEFAULT_TIMESTEP_MS: f64 = 1000.0 / 60.0;

/// Simulation and combat constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Timing
    /// Length of one simulation step in milliseconds
    pub fixed_timestep_ms: f64,
    /// Maximum fixed steps `update` runs per call before deferring the rest
    pub max_steps_per_update: u32,

    // Projectiles
    /// Distance below which a projectile hits a character
    pub collision_radius: f32,
    /// Horizontal speed of projectiles spawned by animation events (units/second)
    pub projectile_speed: f32,
    /// Fail-safe lifetime after which a projectile destroys itself (ms)
    pub projectile_max_lifetime_ms: f64,
    /// Default projectile damage
    pub projectile_damage: f32,
    /// Default projectile knockback
    pub projectile_knockback: Vector2,
    /// Default projectile hitstun (ms)
    pub projectile_hitstun_ms: f32,
    /// Effect animation spawned where a projectile hits
    pub hit_effect: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_timestep_ms: DEFAULT_TIMESTEP_MS,
            max_steps_per_update: 5,

            collision_radius: 50.0,
            projectile_speed: 600.0,
            projectile_max_lifetime_ms: 1200.0,
            projectile_damage: 15.0,
            projectile_knockback: Vector2::new(30.0, -15.0),
            projectile_hitstun_ms: 200.0,
            hit_effect: "blast".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Replace values the simulation loop cannot run with
    pub fn sanitized(mut self) -> Self {
        if !(self.fixed_timestep_ms.is_finite() && self.fixed_timestep_ms > 0.0) {
            log::warn!(
                "Ignoring invalid fixed timestep {}, using {}",
                self.fixed_timestep_ms,
                DEFAULT_TIMESTEP_MS
            );
            self.fixed_timestep_ms = DEFAULT_TIMESTEP_MS;
        }
        self.max_steps_per_update = self.max_steps_per_update.max(1);
        self
    }
}
