use glam::Vec2;

/// Even-odd ray casting. O(vertex count).
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = polygon[i];
        let vj = polygon[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Closest-point distance from the circle center to segment `a..b`.
pub fn circle_intersects_segment(center: Vec2, radius: f32, a: Vec2, b: Vec2) -> bool {
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 > 0.0 {
        ((center - a).dot(ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + ab * t;
    radius >= 0.0 && closest.distance_squared(center) <= radius * radius
}

/// Any boundary segment within reach, or the circle fully inside the polygon.
pub fn circle_intersects_polygon(center: Vec2, radius: f32, polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    let touches_edge = (0..n).any(|i| circle_intersects_segment(center, radius, polygon[i], polygon[(i + 1) % n]));
    touches_edge || point_in_polygon(center, polygon)
}

pub fn circle_intersects_circle(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    if r1 < 0.0 || r2 < 0.0 {
        return false;
    }
    let reach = r1 + r2;
    c1.distance_squared(c2) <= reach * reach
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ]
    }

    #[test]
    fn point_in_polygon_even_odd() {
        let poly = square();
        assert!(point_in_polygon(Vec2::new(2.0, 2.0), &poly));
        assert!(!point_in_polygon(Vec2::new(5.0, 2.0), &poly));
        assert!(!point_in_polygon(Vec2::new(2.0, -0.1), &poly));
    }

    #[test]
    fn point_in_concave_polygon() {
        // "U" opening upwards
        let poly = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(2.0, 3.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(0.0, 3.0),
        ];
        assert!(point_in_polygon(Vec2::new(0.5, 2.0), &poly));
        assert!(!point_in_polygon(Vec2::new(1.5, 2.0), &poly));
    }

    #[test]
    fn circle_vs_polygon_edge_and_containment() {
        let poly = square();
        // touching the right edge from outside
        assert!(circle_intersects_polygon(Vec2::new(4.5, 2.0), 0.6, &poly));
        assert!(!circle_intersects_polygon(Vec2::new(4.5, 2.0), 0.4, &poly));
        // tiny circle fully inside
        assert!(circle_intersects_polygon(Vec2::new(2.0, 2.0), 0.1, &poly));
        // polygon fully inside a large circle
        assert!(circle_intersects_polygon(Vec2::new(2.0, 2.0), 10.0, &poly));
    }

    #[test]
    fn circle_vs_circle_uses_summed_radii() {
        assert!(circle_intersects_circle(Vec2::ZERO, 1.0, Vec2::new(3.0, 0.0), 2.0));
        assert!(!circle_intersects_circle(Vec2::ZERO, 1.0, Vec2::new(3.1, 0.0), 2.0));
    }

    #[test]
    fn negative_radius_touches_nothing() {
        assert!(!circle_intersects_circle(Vec2::ZERO, -1.0, Vec2::new(0.2, 0.0), 0.5));
        assert!(!circle_intersects_segment(Vec2::ZERO, -1.0, Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)));
    }
}
