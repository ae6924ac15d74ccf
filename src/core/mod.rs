//! Core value types shared by every layer: transforms, bounds, errors.

pub mod aabb;
pub mod error;
pub mod transform;

pub use aabb::Aabb;
pub use error::WorldError;
pub use transform::Transform;
