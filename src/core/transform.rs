use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Position + rotation of a body in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Rotation (radians, counter-clockwise)
    pub angle: f32,
}

impl Transform {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            angle,
        }
    }

    /// Transform a point from body-local to world coordinates.
    #[inline]
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.angle).rotate(local)
    }

    /// Transform a world point into body-local coordinates.
    #[inline]
    pub fn inverse_apply(&self, world: Vec2) -> Vec2 {
        Vec2::from_angle(-self.angle).rotate(world - self.position)
    }

    /// Blend: `alpha = 0` gives `self`, `alpha = 1` gives `other`.
    ///
    /// The angle turns along the shorter arc, so a body crossing ±π does not
    /// spin the long way round. The result may lie outside (-π, π].
    pub fn lerp(&self, other: &Transform, alpha: f32) -> Transform {
        let delta = (other.angle - self.angle + PI).rem_euclid(TAU) - PI;
        Transform {
            position: self.position.lerp(other.position, alpha),
            angle: self.angle + delta * alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_and_inverse_are_symmetric() {
        let t = Transform::new(3.0, -2.0, 0.7);
        let local = Vec2::new(1.5, 0.25);
        let back = t.inverse_apply(t.apply(local));
        assert!((back - local).length() < 1e-5);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Transform::new(0.0, 0.0, 0.0);
        let b = Transform::new(10.0, 4.0, 1.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        let end = a.lerp(&b, 1.0);
        assert!((end.position - b.position).length() < 1e-6);
        assert!((end.angle - b.angle).abs() < 1e-6);
    }

    #[test]
    fn lerp_takes_the_short_way_across_pi() {
        let a = Transform::new(0.0, 0.0, 3.1);
        let b = Transform::new(0.0, 0.0, -3.1);
        let mid = a.lerp(&b, 0.5);
        assert!(mid.angle.abs() > 3.1);
        let end = a.lerp(&b, 1.0);
        assert!((Vec2::from_angle(end.angle) - Vec2::from_angle(b.angle)).length() < 1e-5);
    }
}
