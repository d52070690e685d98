// Core math shared by the engine and the character system

pub mod math;

pub use math::{BoundingBox, Vector2};
