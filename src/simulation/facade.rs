use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::core::WorldError;
use crate::domain::{
    definition, BodyKind, ConstraintEntity, Entity, EntityId, EntityKind, JointKind, PhysicalEntity, Shape,
};
use crate::systems::solver::CollisionFilter;

use super::listeners::WorldListener;
use super::perf_stats::PerfStats;
use super::settings::WorldSettings;
use super::WorldCore;

fn to_js(err: WorldError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn ids_to_js(ids: Vec<EntityId>) -> Vec<u32> {
    ids.into_iter().map(|id| id.0).collect()
}

fn body_kind(is_static: bool) -> BodyKind {
    if is_static {
        BodyKind::Static
    } else {
        BodyKind::Dynamic
    }
}

/// Begin-contact pairs buffered until JS drains them.
struct ContactLog(Rc<RefCell<Vec<u32>>>);

impl WorldListener for ContactLog {
    fn contact_began(&mut self, a: &Entity, b: &Entity) {
        let mut log = self.0.borrow_mut();
        log.push(a.id().0);
        log.push(b.id().0);
    }
}

#[wasm_bindgen]
pub struct World {
    core: WorldCore,
    contacts: Rc<RefCell<Vec<u32>>>,
}

impl World {
    fn from_core(mut core: WorldCore) -> Self {
        let contacts = Rc::new(RefCell::new(Vec::new()));
        core.add_listener(Box::new(ContactLog(Rc::clone(&contacts))));
        Self { core, contacts }
    }

    pub fn core(&self) -> &WorldCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut WorldCore {
        &mut self.core
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl World {
    /// Create a world with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_core(WorldCore::new())
    }

    #[wasm_bindgen(js_name = fromSettingsJson)]
    pub fn from_settings_json(json: &str) -> Result<World, JsValue> {
        let settings = WorldSettings::from_json(json).map_err(to_js)?;
        let core = WorldCore::with_settings(settings).map_err(to_js)?;
        Ok(Self::from_core(core))
    }

    #[wasm_bindgen(getter)]
    pub fn entity_count(&self) -> u32 { self.core.entity_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn step_count(&self) -> f64 { self.core.step_count() as f64 }

    /// Enable or disable per-call perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last `fixed_step` perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.core.set_gravity(x, y);
    }

    /// Advance by a frame delta in seconds; true when the solver stepped
    pub fn fixed_step(&mut self, delta_time: f32) -> bool {
        self.core.fixed_step(delta_time)
    }

    // === ENTITIES ===

    pub fn add_circle(&mut self, x: f32, y: f32, radius: f32, is_static: bool) -> Result<u32, JsValue> {
        let physical = PhysicalEntity::new(Shape::circle(radius), body_kind(is_static)).at(x, y, 0.0);
        self.core.add_entity(Entity::physical(physical)).map(|id| id.0).map_err(to_js)
    }

    pub fn add_rect(&mut self, x: f32, y: f32, w: f32, h: f32, angle: f32, is_static: bool) -> Result<u32, JsValue> {
        let physical = PhysicalEntity::new(Shape::rect(w, h), body_kind(is_static)).at(x, y, angle);
        self.core.add_entity(Entity::physical(physical)).map(|id| id.0).map_err(to_js)
    }

    /// Polygon from flat local `[x0, y0, x1, y1, ...]` vertices
    pub fn add_polygon(&mut self, x: f32, y: f32, vertices: Vec<f32>, is_static: bool) -> Result<u32, JsValue> {
        let outline: Vec<Vec2> = vertices.chunks_exact(2).map(|v| Vec2::new(v[0], v[1])).collect();
        let physical = PhysicalEntity::new(Shape::polygon(outline), body_kind(is_static)).at(x, y, 0.0);
        self.core.add_entity(Entity::physical(physical)).map(|id| id.0).map_err(to_js)
    }

    /// Revolute pin between two entities, anchors in each body's local frame
    pub fn add_pin(&mut self, a: u32, b: u32, ax: f32, ay: f32, bx: f32, by: f32) -> Result<u32, JsValue> {
        let constraint = ConstraintEntity::new(EntityId(a), EntityId(b), JointKind::Revolute)
            .with_anchors(Vec2::new(ax, ay), Vec2::new(bx, by));
        self.core.add_entity(Entity::constraint(constraint)).map(|id| id.0).map_err(to_js)
    }

    pub fn add_weld(&mut self, a: u32, b: u32) -> Result<u32, JsValue> {
        let constraint = ConstraintEntity::new(EntityId(a), EntityId(b), JointKind::Weld);
        self.core.add_entity(Entity::constraint(constraint)).map(|id| id.0).map_err(to_js)
    }

    pub fn add_spring(&mut self, a: u32, b: u32, rest_length: f32, stiffness: f32, damping: f32) -> Result<u32, JsValue> {
        let kind = JointKind::Spring {
            rest_length,
            stiffness,
            damping,
        };
        let constraint = ConstraintEntity::new(EntityId(a), EntityId(b), kind);
        self.core.add_entity(Entity::constraint(constraint)).map(|id| id.0).map_err(to_js)
    }

    /// Remove an entity (and any constraint attached to it)
    pub fn remove(&mut self, id: u32) -> bool {
        self.core.remove_entity(EntityId(id))
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn set_transform(&mut self, id: u32, x: f32, y: f32, angle: f32) -> Result<(), JsValue> {
        self.core.set_transform(EntityId(id), x, y, angle).map_err(to_js)
    }

    pub fn set_collision_filter(
        &mut self,
        id: u32,
        category_bits: u16,
        mask_bits: u16,
        group_index: i16,
        anti_collision_group: u32,
    ) -> Result<(), JsValue> {
        let filter = CollisionFilter {
            category_bits,
            mask_bits,
            group_index,
        };
        self.core
            .set_fixture_filter(EntityId(id), filter, anti_collision_group)
            .map_err(to_js)
    }

    // === JOINT ANCHOR ===

    pub fn joint_anchor(&self) -> Option<u32> {
        self.core.joint_anchor().map(|id| id.0)
    }

    pub fn set_joint_anchor(&mut self, id: Option<u32>) -> Result<(), JsValue> {
        self.core.set_joint_anchor(id.map(EntityId)).map_err(to_js)
    }

    /// Pin an entity to the joint anchor; `undefined` when no anchor exists
    pub fn pin_to_anchor(&mut self, target: u32, x: f32, y: f32) -> Result<Option<u32>, JsValue> {
        self.core
            .pin_to_anchor(EntityId(target), Vec2::new(x, y))
            .map(|id| id.map(|id| id.0))
            .map_err(to_js)
    }

    // === RENDER READBACK ===

    /// Interpolated `[x, y, angle]` of a physical entity
    pub fn transform(&self, id: u32) -> Option<Vec<f32>> {
        let t = self.core.entity(EntityId(id))?.interpolated_transform()?;
        Some(vec![t.position.x, t.position.y, t.angle])
    }

    /// Interpolated `[ax, ay, bx, by]` of a constraint
    pub fn constraint_anchors(&self, id: u32) -> Option<Vec<f32>> {
        let [a, b] = self.core.entity(EntityId(id))?.as_constraint()?.interpolated_anchors();
        Some(vec![a.x, a.y, b.x, b.y])
    }

    /// `[id, x, y, angle]` per physical entity, insertion order
    pub fn interpolated_transforms(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.core.entity_count() * 4);
        for entity in self.core.entities() {
            if let EntityKind::Physical(p) = entity.kind() {
                let t = p.interpolated_transform();
                out.extend_from_slice(&[entity.id().0 as f32, t.position.x, t.position.y, t.angle]);
            }
        }
        out
    }

    /// Drain `[a0, b0, a1, b1, ...]` begin-contact pairs since the last call
    pub fn take_contacts(&mut self) -> Vec<u32> {
        std::mem::take(&mut *self.contacts.borrow_mut())
    }

    // === QUERIES ===

    pub fn query_circle(&self, x: f32, y: f32, radius: f32) -> Vec<u32> {
        ids_to_js(self.core.things_intersecting_circle(x, y, radius))
    }

    pub fn closest(&self, x: f32, y: f32, max_distance: f32) -> Option<u32> {
        self.core.closest_thing_intersecting_circle(x, y, max_distance).map(|id| id.0)
    }

    pub fn connected(&self, id: u32) -> Vec<u32> {
        ids_to_js(self.core.all_connected_things(EntityId(id)))
    }

    // === DEFINITIONS ===

    pub fn save_definitions(&self) -> Result<String, JsValue> {
        definition::definitions_to_json(&self.core.to_definitions()).map_err(to_js)
    }

    /// Restore a snapshot next to the current entities; returns the new ids
    pub fn load_definitions(&mut self, json: &str) -> Result<Vec<u32>, JsValue> {
        let definitions = definition::definitions_from_json(json).map_err(to_js)?;
        self.core.load_definitions(&definitions).map(ids_to_js).map_err(to_js)
    }

    pub fn copy_entities(&mut self, ids: Vec<u32>, dx: f32, dy: f32) -> Result<Vec<u32>, JsValue> {
        let ids: Vec<EntityId> = ids.into_iter().map(EntityId).collect();
        self.core
            .copy_entities(&ids, Vec2::new(dx, dy))
            .map(ids_to_js)
            .map_err(to_js)
    }
}
