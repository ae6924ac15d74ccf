//! Polygon services used when building multi-fixture bodies.
//!
//! - `repair`    - removes repeated / collinear vertices before decomposition
//! - `decompose` - splits an outline into convex triangles, with the
//!                 degenerate-triangle retry and the safe/permissive policy

mod decompose;
mod repair;

use glam::Vec2;

pub use decompose::{decompose_checked, Decompose, DegeneracyPolicy, EarClipper, MIN_TRIANGLE_AREA};
pub use repair::{PolygonRepair, SimplifyPolygon};

/// Three vertices, counter-clockwise when valid.
pub type Triangle = [Vec2; 3];

/// Shoelace signed area. Positive for counter-clockwise outlines.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0f32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.perp_dot(b);
    }
    twice * 0.5
}

#[inline]
pub fn triangle_area(tri: &Triangle) -> f32 {
    (tri[1] - tri[0]).perp_dot(tri[2] - tri[0]) * 0.5
}
