use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::{Aabb, Transform, WorldError};

/// The closed set of shapes a physical entity can have.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f32 },
    /// Simple outline in body-local coordinates
    Polygon { vertices: Vec<Vec2> },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        Shape::Polygon { vertices }
    }

    /// Axis-aligned box centered on the body origin.
    pub fn rect(width: f32, height: f32) -> Self {
        let hw = width * 0.5;
        let hh = height * 0.5;
        Shape::Polygon {
            vertices: vec![
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
        }
    }

    pub(crate) fn validate_radius(&self) -> Result<(), WorldError> {
        if let Shape::Circle { radius } = self {
            if !radius.is_finite() || *radius <= 0.0 {
                return Err(WorldError::InvalidShape(format!("circle radius {radius}")));
            }
        }
        Ok(())
    }

    /// Outline vertices moved into world space. Empty for circles.
    pub fn world_vertices(&self, transform: &Transform) -> Vec<Vec2> {
        match self {
            Shape::Circle { .. } => Vec::new(),
            Shape::Polygon { vertices } => vertices.iter().map(|v| transform.apply(*v)).collect(),
        }
    }

    /// Bounds of the transformed shape, recomputed on every call.
    pub fn aabb(&self, transform: &Transform) -> Aabb {
        match self {
            Shape::Circle { radius } => Aabb::around_circle(transform.position, *radius),
            Shape::Polygon { .. } => Aabb::from_points(&self.world_vertices(transform))
                .unwrap_or(Aabb::around_circle(transform.position, 0.0)),
        }
    }
}

/// Per-fixture material.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub friction: f32,
    pub density: f32,
    /// Bounciness (0.0 = no bounce, 1.0 = full elastic)
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.5,
            density: 1.0,
            restitution: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_rect_bounds_follow_transform() {
        let shape = Shape::rect(2.0, 2.0);
        let t = Transform::new(5.0, 5.0, std::f32::consts::FRAC_PI_4);
        let aabb = shape.aabb(&t);
        let half_diag = 2.0f32.sqrt();
        assert!((aabb.min.x - (5.0 - half_diag)).abs() < 1e-5);
        assert!((aabb.max.y - (5.0 + half_diag)).abs() < 1e-5);
    }

    #[test]
    fn circle_rejects_non_positive_radius() {
        assert!(Shape::circle(0.0).validate_radius().is_err());
        assert!(Shape::circle(f32::NAN).validate_radius().is_err());
        assert!(Shape::circle(0.25).validate_radius().is_ok());
    }
}
