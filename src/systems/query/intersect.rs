use std::collections::HashSet;

use glam::Vec2;

use crate::domain::{Entity, EntityId, EntityKind, Shape};

use super::shapes::{circle_intersects_circle, circle_intersects_polygon};

/// Bisection rounds before the nearest-entity search settles for what it has.
pub const MAX_BISECTION_ITERATIONS: usize = 10;

/// Shape test for one entity against a circle, at the latest solver pose.
///
/// Constraints have no area and match when either anchor lies inside the circle.
pub fn entity_intersects_circle(entity: &Entity, center: Vec2, radius: f32) -> bool {
    if entity.is_disposed() || !valid_radius(radius) {
        return false;
    }
    match entity.kind() {
        EntityKind::Physical(physical) => {
            let pose = physical.current_transform();
            match physical.shape() {
                Shape::Circle { radius: r } => circle_intersects_circle(center, radius, pose.position, *r),
                Shape::Polygon { .. } => circle_intersects_polygon(center, radius, &physical.world_vertices()),
            }
        }
        EntityKind::Constraint(constraint) => {
            let r2 = radius * radius;
            constraint
                .current_anchors()
                .iter()
                .any(|anchor| anchor.distance_squared(center) <= r2)
        }
    }
}

/// Negative, NaN and infinite radii match nothing.
fn valid_radius(radius: f32) -> bool {
    radius.is_finite() && radius >= 0.0
}

/// Linear scan; results keep insertion order and hold each id once.
pub fn things_intersecting_circle(entities: &[Entity], center: Vec2, radius: f32) -> Vec<EntityId> {
    let mut seen = HashSet::new();
    entities
        .iter()
        .filter(|e| entity_intersects_circle(e, center, radius))
        .map(Entity::id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Approximate nearest entity by bisecting the query radius.
///
/// Shrinks the radius while several entities match and grows it while none
/// do, until exactly one remains or the iteration cap is reached. At the cap
/// the first hit of the last non-empty round wins.
pub fn closest_thing_intersecting_circle(
    entities: &[Entity],
    center: Vec2,
    max_distance: f32,
) -> Option<EntityId> {
    let mut hits = things_intersecting_circle(entities, center, max_distance);
    if hits.len() <= 1 {
        return hits.first().copied();
    }

    let (mut lower, mut upper) = (0.0_f32, max_distance);
    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = 0.5 * (lower + upper);
        let round = things_intersecting_circle(entities, center, mid);
        match round.len() {
            0 => lower = mid,
            1 => return round.first().copied(),
            _ => {
                upper = mid;
                hits = round;
            }
        }
    }
    hits.first().copied()
}
