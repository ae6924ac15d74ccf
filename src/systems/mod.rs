pub mod geometry;
pub mod query;
pub mod solver;
