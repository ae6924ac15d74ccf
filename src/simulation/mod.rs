//! World - fixed-step scheduler and entity lifecycle.
//!
//! `WorldCore` owns the solver, the insertion-ordered entity collection and
//! the id counter. Each concern lives in its own file and operates on the
//! core through `pub(super)` functions:
//! - `step`        - time budget, solver steps, interpolation
//! - `commands`    - add / remove / clear and per-entity edits
//! - `anchor`      - joint anchor lookup and ad hoc pins
//! - `definitions` - snapshot, restore and copy
//! - `listeners`   - callback registry
//! - `facade`      - the wasm-bindgen surface

use glam::Vec2;

use crate::core::{Transform, WorldError};
use crate::domain::{Entity, EntityDefinition, EntityId, Shape};
use crate::systems::geometry::{Decompose, DegeneracyPolicy, PolygonRepair};
use crate::systems::query;
use crate::systems::solver::{CollisionFilter, Solver};

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "listeners/listeners.rs"]
mod listeners;
#[path = "step/step.rs"]
mod step;
#[path = "commands/commands.rs"]
mod commands;
#[path = "rigid/anchor.rs"]
mod anchor;
#[path = "definitions/definitions.rs"]
mod definitions;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::World;
pub use listeners::{ListenerId, WorldListener};
pub use perf_stats::PerfStats;
pub use settings::WorldSettings;

use listeners::Listeners;
use perf_timer::PerfTimer;

fn find_entity(entities: &[Entity], id: EntityId) -> Option<&Entity> {
    entities.iter().find(|e| e.id() == id)
}

/// The simulation world
pub struct WorldCore {
    settings: WorldSettings,
    solver: Solver,
    entities: Vec<Entity>,

    // State
    next_id: u32,
    accumulator: f32,
    step_count: u64,
    joint_anchor: Option<EntityId>,

    listeners: Listeners,
    repair: Box<dyn PolygonRepair>,
    decomposer: Box<dyn Decompose>,
    contacts: Vec<(EntityId, EntityId)>,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl Default for WorldCore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldCore {
    /// World with default settings and the built-in polygon services.
    pub fn new() -> Self {
        let (repair, decomposer) = init::default_services();
        init::create_world_core(WorldSettings::default(), repair, decomposer)
    }

    pub fn with_settings(settings: WorldSettings) -> Result<Self, WorldError> {
        settings.validate()?;
        let (repair, decomposer) = init::default_services();
        Ok(init::create_world_core(settings, repair, decomposer))
    }

    /// Swap in other polygon repair / decomposition services.
    pub fn with_services(
        settings: WorldSettings,
        repair: Box<dyn PolygonRepair>,
        decomposer: Box<dyn Decompose>,
    ) -> Result<Self, WorldError> {
        settings.validate()?;
        Ok(init::create_world_core(settings, repair, decomposer))
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Unspent simulated time carried to the next call.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Enable or disable per-call perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last `fixed_step` perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        settings::set_gravity(self, x, y);
    }

    pub fn set_degeneracy_policy(&mut self, policy: DegeneracyPolicy) {
        settings::set_degeneracy_policy(self, policy);
    }

    // === SCHEDULER ===

    /// Spend `delta_time` on whole solver steps and interpolate for rendering.
    ///
    /// Returns whether at least one step ran.
    pub fn fixed_step(&mut self, delta_time: f32) -> bool {
        step::fixed_step(self, delta_time)
    }

    // === LIFECYCLE ===

    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId, WorldError> {
        commands::add_entity(self, entity)
    }

    /// Returns `false` (and does nothing) when `id` is not in the world.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        commands::remove_entity(self, id)
    }

    pub fn clear(&mut self) {
        commands::clear(self)
    }

    pub fn set_transform(&mut self, id: EntityId, x: f32, y: f32, angle: f32) -> Result<(), WorldError> {
        commands::set_transform(self, id, Transform::new(x, y, angle))
    }

    pub fn set_shape(&mut self, id: EntityId, shape: Shape) -> Result<(), WorldError> {
        commands::set_shape(self, id, shape)
    }

    pub fn set_fixture_filter(
        &mut self,
        id: EntityId,
        filter: CollisionFilter,
        anti_collision_group: u32,
    ) -> Result<(), WorldError> {
        commands::set_fixture_filter(self, id, filter, anti_collision_group)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        find_entity(&self.entities, id)
    }

    /// Live entities in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == id)
    }

    // === JOINT ANCHOR ===

    pub fn joint_anchor(&self) -> Option<EntityId> {
        anchor::joint_anchor(self)
    }

    pub fn set_joint_anchor(&mut self, anchor: Option<EntityId>) -> Result<(), WorldError> {
        anchor::set_joint_anchor(self, anchor)
    }

    pub fn pin_to_anchor(&mut self, target: EntityId, world_point: Vec2) -> Result<Option<EntityId>, WorldError> {
        anchor::pin_to_anchor(self, target, world_point)
    }

    // === LISTENERS ===

    pub fn add_listener(&mut self, listener: Box<dyn WorldListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // === QUERIES ===

    pub fn things_intersecting_circle(&self, x: f32, y: f32, radius: f32) -> Vec<EntityId> {
        query::things_intersecting_circle(&self.entities, Vec2::new(x, y), radius)
    }

    pub fn closest_thing_intersecting_circle(&self, x: f32, y: f32, max_distance: f32) -> Option<EntityId> {
        query::closest_thing_intersecting_circle(&self.entities, Vec2::new(x, y), max_distance)
    }

    pub fn all_connected_things(&self, start: EntityId) -> Vec<EntityId> {
        query::all_connected_things(&self.entities, &self.solver, start)
    }

    pub fn split_into_groups_of_connected(&self, ids: &[EntityId]) -> Vec<Vec<EntityId>> {
        query::split_into_groups_of_connected(&self.entities, &self.solver, ids)
    }

    // === DEFINITIONS ===

    pub fn to_definitions(&self) -> Vec<EntityDefinition> {
        definitions::to_definitions(self)
    }

    pub fn definitions_for(&self, ids: &[EntityId]) -> Vec<EntityDefinition> {
        definitions::definitions_for(self, ids)
    }

    pub fn load_definitions(&mut self, definitions: &[EntityDefinition]) -> Result<Vec<EntityId>, WorldError> {
        definitions::load_definitions(self, definitions)
    }

    pub fn copy_entities(&mut self, ids: &[EntityId], offset: Vec2) -> Result<Vec<EntityId>, WorldError> {
        definitions::copy_entities(self, ids, offset)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
