//! Domain model: entities, shapes, constraints and their flat definitions.

pub mod constraint;
pub mod definition;
pub mod entity;
pub mod interpolation;
pub mod physical;
pub mod shape;

pub use constraint::{ConstraintEntity, JointKind, JointState};
pub use definition::{ConstraintDefinition, EntityDefinition, PhysicalDefinition};
pub use entity::{Entity, EntityId, EntityKind};
pub use interpolation::{Interpolated, Lerp};
pub use physical::{BodyKind, BodyState, PhysicalEntity};
pub use shape::{Material, Shape};
