use glam::Vec2;

use crate::core::WorldError;

/// Repairs an input outline so it can be decomposed.
pub trait PolygonRepair {
    fn repair(&self, outline: &[Vec2]) -> Result<Vec<Vec2>, WorldError>;
}

/// Default repair: drops repeated and collinear vertices.
///
/// Winding is left untouched; the decomposition retry handles clockwise input.
#[derive(Clone, Copy, Debug)]
pub struct SimplifyPolygon {
    /// Vertices closer than this are merged
    pub epsilon: f32,
}

impl Default for SimplifyPolygon {
    fn default() -> Self {
        Self { epsilon: 1e-4 }
    }
}

impl PolygonRepair for SimplifyPolygon {
    fn repair(&self, outline: &[Vec2]) -> Result<Vec<Vec2>, WorldError> {
        let eps2 = self.epsilon * self.epsilon;

        let mut points: Vec<Vec2> = Vec::with_capacity(outline.len());
        for &p in outline {
            if !p.is_finite() {
                return Err(WorldError::InvalidShape(format!("non-finite vertex {p}")));
            }
            if points.last().map_or(true, |last| last.distance_squared(p) > eps2) {
                points.push(p);
            }
        }
        // Closing vertex equal to the first one.
        while points.len() > 1 && points[0].distance_squared(points[points.len() - 1]) <= eps2 {
            points.pop();
        }

        // Remove collinear vertices until stable.
        let mut changed = true;
        while changed && points.len() >= 3 {
            changed = false;
            let n = points.len();
            for i in 0..n {
                let prev = points[(i + n - 1) % n];
                let cur = points[i];
                let next = points[(i + 1) % n];
                let cross = (cur - prev).perp_dot(next - cur);
                let scale = (cur - prev).length().max((next - cur).length()).max(1.0);
                if cross.abs() <= self.epsilon * scale {
                    points.remove(i);
                    changed = true;
                    break;
                }
            }
        }

        if points.len() < 3 {
            return Err(WorldError::InvalidPolygon(points.len()));
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_duplicates_and_collinear_points() {
        let outline = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(0.0, 0.0),
        ];
        let repaired = SimplifyPolygon::default().repair(&outline).unwrap();
        assert_eq!(repaired.len(), 4);
        assert!(!repaired.contains(&Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn rejects_flat_outline() {
        let outline = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        let err = SimplifyPolygon::default().repair(&outline).unwrap_err();
        assert!(matches!(err, WorldError::InvalidPolygon(_)));
    }

    #[test]
    fn keeps_clockwise_winding() {
        let cw = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ];
        let repaired = SimplifyPolygon::default().repair(&cw).unwrap();
        assert!(super::super::signed_area(&repaired) < 0.0);
    }
}
