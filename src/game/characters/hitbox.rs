// Hit/hurt box placement and overlap tests
//
// Boxes are closed intervals: touching edges count as overlapping.

use parry2d::bounding_volume::{Aabb, BoundingVolume};
use parry2d::math::Point;

use crate::core::math::{BoundingBox, Vector2};
use crate::game::world::EntityId;

use super::state::Facing;

fn to_aabb(bounds: &BoundingBox) -> Aabb {
    let min = bounds.min();
    let max = bounds.max();
    Aabb::new(Point::new(min.x, min.y), Point::new(max.x, max.y))
}

/// Place a local box at `position`, mirroring its x offset by facing.
/// Width and height are unchanged.
pub fn to_world(local: &BoundingBox, position: Vector2, facing: Facing) -> BoundingBox {
    BoundingBox::new(
        position.x + local.x * facing.sign(),
        position.y + local.y,
        local.width,
        local.height,
    )
}

/// AABB overlap test, symmetric
pub fn check_collision(a: &BoundingBox, b: &BoundingBox) -> bool {
    to_aabb(a).intersects(&to_aabb(b))
}

/// Check if a point lies inside or on the edge of a box
pub fn contains_point(bounds: &BoundingBox, point: Vector2) -> bool {
    let point = Point::new(point.x, point.y);
    to_aabb(bounds).intersects(&Aabb::new(point, point))
}

/// An attacker's hitbox overlapping a defender's hurtbox
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub attacker: EntityId,
    pub defender: EntityId,
    /// World-space hitbox that connected
    pub hitbox: BoundingBox,
    pub damage: f32,
    /// Knockback mirrored by the attacker's facing
    pub knockback: Vector2,
    /// Hitstun duration (ms)
    pub hitstun: f32,
}
