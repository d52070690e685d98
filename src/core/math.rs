// Math utilities and helper functions

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;

/// 2D vector used for positions, velocities and offsets
pub type Vector2 = glam::Vec2;

/// Tolerance used when turning accumulated time into a frame index.
/// Repeated float additions of 1000/60 otherwise land a hair below an
/// exact frame boundary.
pub const FRAME_EPSILON: f64 = 1e-6;

/// Axis-aligned box, local or world space depending on context
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Minimum corner
    pub fn min(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Maximum corner
    pub fn max(&self) -> Vector2 {
        Vector2::new(self.x + self.width, self.y + self.height)
    }

    /// Check that every component is finite and the size is non-negative
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// Floor that absorbs accumulated rounding error just below an integer
pub fn tolerant_floor(value: f64) -> f64 {
    (value + FRAME_EPSILON).floor()
}

/// Reject NaN/Infinity scalars at the API boundary
pub fn ensure_finite(field: &'static str, value: f32) -> Result<f32, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFinite { field })
    }
}

/// Reject vectors with a NaN/Infinity component at the API boundary
pub fn ensure_finite_vec(field: &'static str, value: Vector2) -> Result<Vector2, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFinite { field })
    }
}
