// Combat layer
//
// - Frame events declared by animations and the messages sent to game rules
// - Projectile launch parameters
// - The animation engine that ticks every entity

pub mod engine;
pub mod events;
pub mod projectile;

pub use engine::{AnimationEngine, EngineSnapshot};
pub use events::{AnimationEvent, CombatEvent, FrameEvent, FrameEventKind};
pub use projectile::ProjectileSpec;
