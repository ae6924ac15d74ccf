//! Contraption Engine - fixed-step 2D rigid-body world in WASM
//!
//! Architecture:
//! - core/       - transforms, bounds, errors
//! - domain/     - entities, shapes, constraints, definitions
//! - systems/    - solver (rapier2d), polygon services, spatial queries
//! - simulation/ - WorldCore orchestration + wasm facade

pub mod core;
pub mod domain;
pub mod systems;
pub mod simulation;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine: panic hook plus a console-backed `log` sink
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    // a second call keeps the logger installed by the first
    let _ = console_log::init_with_level(level);

    web_sys::console::log_1(&"Contraption engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use crate::core::{Aabb, Transform, WorldError};
pub use domain::{
    BodyKind, ConstraintEntity, Entity, EntityDefinition, EntityId, EntityKind, JointKind, Material,
    PhysicalEntity, Shape,
};
pub use simulation::{ListenerId, PerfStats, World, WorldCore, WorldListener, WorldSettings};
pub use systems::geometry::DegeneracyPolicy;
pub use systems::solver::CollisionFilter;
