use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::WorldError;

use super::{triangle_area, PolygonRepair, Triangle};

/// Triangles with a signed area below this are degenerate.
pub const MIN_TRIANGLE_AREA: f32 = 1e-5;

/// What to do when a triangle stays degenerate after the winding retry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneracyPolicy {
    /// Refuse the shape.
    #[default]
    Safe,
    /// Accept the degenerate fixture.
    Permissive,
}

/// Splits a simple outline into triangles.
pub trait Decompose {
    fn decompose(&self, outline: &[Vec2]) -> Vec<Triangle>;
}

/// Ear clipping for simple counter-clockwise outlines.
///
/// When no ear can be found (clockwise or self-intersecting input) the
/// current vertex is clipped anyway so the loop always terminates; the
/// resulting triangle fails the area check in `decompose_checked`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EarClipper;

impl Decompose for EarClipper {
    fn decompose(&self, outline: &[Vec2]) -> Vec<Triangle> {
        if outline.len() < 3 {
            return Vec::new();
        }
        let mut ring: Vec<usize> = (0..outline.len()).collect();
        let mut triangles = Vec::with_capacity(outline.len() - 2);

        while ring.len() > 3 {
            let m = ring.len();
            let ear = (0..m).find(|&i| is_ear(outline, &ring, i));
            let i = ear.unwrap_or(0);
            let prev = ring[(i + m - 1) % m];
            let next = ring[(i + 1) % m];
            triangles.push([outline[prev], outline[ring[i]], outline[next]]);
            ring.remove(i);
        }
        triangles.push([outline[ring[0]], outline[ring[1]], outline[ring[2]]]);
        triangles
    }
}

fn is_ear(outline: &[Vec2], ring: &[usize], i: usize) -> bool {
    let m = ring.len();
    let ia = ring[(i + m - 1) % m];
    let ib = ring[i];
    let ic = ring[(i + 1) % m];
    let (a, b, c) = (outline[ia], outline[ib], outline[ic]);

    // Reflex or flat corner.
    if (b - a).perp_dot(c - b) <= 0.0 {
        return false;
    }

    ring.iter()
        .filter(|&&k| k != ia && k != ib && k != ic)
        .all(|&k| !point_in_triangle(outline[k], a, b, c))
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

fn smallest_area(triangles: &[Triangle]) -> Option<f32> {
    triangles
        .iter()
        .map(triangle_area)
        .find(|area| *area < MIN_TRIANGLE_AREA)
}

/// Repair, decompose and validate an outline.
///
/// A degenerate result is retried once with the winding reversed. If the
/// retry is still degenerate the `policy` decides.
pub fn decompose_checked(
    outline: &[Vec2],
    repair: &dyn PolygonRepair,
    decomposer: &dyn Decompose,
    policy: DegeneracyPolicy,
) -> Result<Vec<Triangle>, WorldError> {
    let repaired = repair.repair(outline)?;

    let triangles = decomposer.decompose(&repaired);
    if triangles.is_empty() {
        return Err(WorldError::InvalidPolygon(repaired.len()));
    }
    if smallest_area(&triangles).is_none() {
        return Ok(triangles);
    }

    let reversed: Vec<Vec2> = repaired.iter().rev().copied().collect();
    let retried = decomposer.decompose(&reversed);
    match smallest_area(&retried) {
        None if !retried.is_empty() => Ok(retried),
        None => Err(WorldError::InvalidPolygon(repaired.len())),
        Some(area) => match policy {
            DegeneracyPolicy::Safe => Err(WorldError::DegenerateGeometry { area }),
            DegeneracyPolicy::Permissive => {
                log::warn!("accepting degenerate triangle (area {area}) in permissive mode");
                Ok(retried)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::geometry::SimplifyPolygon;

    fn square(ccw: bool) -> Vec<Vec2> {
        let mut pts = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        if !ccw {
            pts.reverse();
        }
        pts
    }

    #[test]
    fn ear_clipping_square_gives_two_triangles() {
        let tris = EarClipper.decompose(&square(true));
        assert_eq!(tris.len(), 2);
        let total: f32 = tris.iter().map(triangle_area).sum();
        assert!((total - 4.0).abs() < 1e-5);
    }

    #[test]
    fn concave_outline_is_fully_covered() {
        // "L" shape, area 3
        let outline = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        let tris = decompose_checked(
            &outline,
            &SimplifyPolygon::default(),
            &EarClipper,
            DegeneracyPolicy::Safe,
        )
        .unwrap();
        assert_eq!(tris.len(), 4);
        assert!(tris.iter().all(|t| triangle_area(t) > 0.0));
        let total: f32 = tris.iter().map(triangle_area).sum();
        assert!((total - 3.0).abs() < 1e-5);
    }

    #[test]
    fn clockwise_outline_recovers_by_reversing() {
        let tris = decompose_checked(
            &square(false),
            &SimplifyPolygon::default(),
            &EarClipper,
            DegeneracyPolicy::Safe,
        )
        .unwrap();
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().all(|t| triangle_area(t) > 0.0));
    }

    /// Always produces the same sliver, whatever the winding.
    struct SliverDecomposer;

    impl Decompose for SliverDecomposer {
        fn decompose(&self, outline: &[Vec2]) -> Vec<Triangle> {
            vec![[outline[0], outline[0] + Vec2::new(1.0, 0.0), outline[0] + Vec2::new(2.0, 1e-7)]]
        }
    }

    #[test]
    fn safe_policy_rejects_persistent_degeneracy() {
        let err = decompose_checked(
            &square(true),
            &SimplifyPolygon::default(),
            &SliverDecomposer,
            DegeneracyPolicy::Safe,
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::DegenerateGeometry { .. }));
    }

    #[test]
    fn permissive_policy_accepts_persistent_degeneracy() {
        let tris = decompose_checked(
            &square(true),
            &SimplifyPolygon::default(),
            &SliverDecomposer,
            DegeneracyPolicy::Permissive,
        )
        .unwrap();
        assert_eq!(tris.len(), 1);
    }
}
