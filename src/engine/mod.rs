// Engine plumbing: simulation clock, configuration and error types

pub mod config;
pub mod error;
pub mod game_loop;

pub use config::EngineConfig;
pub use error::{EngineError, RegistryError};
pub use game_loop::FixedStepClock;
