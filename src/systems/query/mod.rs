//! Spatial queries over a world's entities.
//!
//! - `shapes`    - point/circle containment primitives
//! - `intersect` - circle scans and the bisection nearest-entity search
//! - `graph`     - connected components of the constraint graph

mod graph;
mod intersect;
mod shapes;

pub use graph::{all_connected_things, split_into_groups_of_connected, ConstraintGraph};
pub use intersect::{
    closest_thing_intersecting_circle, entity_intersects_circle, things_intersecting_circle,
    MAX_BISECTION_ITERATIONS,
};
pub use shapes::{circle_intersects_circle, circle_intersects_polygon, circle_intersects_segment, point_in_polygon};
