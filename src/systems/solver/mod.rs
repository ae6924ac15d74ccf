//! Solver - the rigid-body engine behind the world.
//!
//! Everything rapier-specific lives here:
//! - `solver`  - owns the rapier sets, creates/destroys bodies, fixtures, joints
//! - `filter`  - fixture tags packed into collider user data + the pair filter
//! - `events`  - begin-contact collection during a step

mod events;
mod filter;
mod solver;

pub use filter::{should_collide, CollisionFilter, FixtureTag};
pub use solver::{FixtureGeometry, Solver};

pub use rapier2d::prelude::{ColliderHandle, ImpulseJointHandle, RigidBodyHandle};
