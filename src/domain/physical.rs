use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::{Aabb, Transform, WorldError};
use crate::systems::geometry::{decompose_checked, Decompose, DegeneracyPolicy, PolygonRepair, Triangle};
use crate::systems::solver::{
    ColliderHandle, CollisionFilter, FixtureGeometry, FixtureTag, RigidBodyHandle, Solver,
};

use super::entity::EntityId;
use super::interpolation::Interpolated;
use super::shape::{Material, Shape};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// Immovable; candidates for the joint anchor
    Static,
    #[default]
    Dynamic,
    Kinematic,
}

/// Solver-side lifecycle of a physical entity.
#[derive(Clone, Debug, PartialEq)]
pub enum BodyState {
    /// No body yet; transform requests are queued here and flushed on creation.
    Pending { transform: Transform },
    Live {
        body: RigidBodyHandle,
        fixtures: Vec<ColliderHandle>,
    },
    Destroyed,
}

/// An entity bound to one solver body and its fixtures.
#[derive(Clone, Debug)]
pub struct PhysicalEntity {
    shape: Shape,
    body_kind: BodyKind,
    material: Material,
    filter: CollisionFilter,
    anti_collision_group: u32,
    /// Local-space decomposition of a polygon shape (empty for circles)
    triangles: Vec<Triangle>,
    state: BodyState,
    pub(crate) pose: Interpolated<Transform>,
}

impl PhysicalEntity {
    pub fn new(shape: Shape, body_kind: BodyKind) -> Self {
        Self {
            shape,
            body_kind,
            material: Material::default(),
            filter: CollisionFilter::default(),
            anti_collision_group: 0,
            triangles: Vec::new(),
            state: BodyState::Pending {
                transform: Transform::default(),
            },
            pose: Interpolated::default(),
        }
    }

    pub fn at(mut self, x: f32, y: f32, angle: f32) -> Self {
        let transform = Transform::new(x, y, angle);
        self.state = BodyState::Pending { transform };
        self.pose.reset(transform);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_anti_collision_group(mut self, group: u32) -> Self {
        self.anti_collision_group = group;
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn body_kind(&self) -> BodyKind {
        self.body_kind
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn filter(&self) -> CollisionFilter {
        self.filter
    }

    pub fn anti_collision_group(&self) -> u32 {
        self.anti_collision_group
    }

    pub fn state(&self) -> &BodyState {
        &self.state
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn body_handle(&self) -> Option<RigidBodyHandle> {
        match self.state {
            BodyState::Live { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn fixture_count(&self) -> usize {
        match &self.state {
            BodyState::Live { fixtures, .. } => fixtures.len(),
            _ => 0,
        }
    }

    pub fn is_static(&self) -> bool {
        self.body_kind == BodyKind::Static
    }

    /// Interpolated transform for rendering.
    pub fn interpolated_transform(&self) -> Transform {
        self.pose.value
    }

    /// Latest solver transform as of the last interpolation or teleport.
    pub fn current_transform(&self) -> Transform {
        self.pose.current
    }

    /// Transform straight from the solver (or the queued one while pending).
    pub fn transform(&self, solver: &Solver) -> Transform {
        match &self.state {
            BodyState::Pending { transform } => *transform,
            BodyState::Live { body, .. } => solver.body_transform(*body).unwrap_or(self.pose.current),
            BodyState::Destroyed => self.pose.current,
        }
    }

    /// World-space outline at the latest solver transform. Empty for circles.
    pub fn world_vertices(&self) -> Vec<Vec2> {
        self.shape.world_vertices(&self.pose.current)
    }

    /// Bounds at the latest solver transform, recomputed on every call.
    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(&self.pose.current)
    }

    /// Validate the shape and decompose polygons, before any solver work.
    pub(crate) fn prepare(
        &mut self,
        repair: &dyn PolygonRepair,
        decomposer: &dyn Decompose,
        policy: DegeneracyPolicy,
    ) -> Result<(), WorldError> {
        self.triangles = decompose_shape(&self.shape, repair, decomposer, policy)?;
        Ok(())
    }

    /// Pending -> Live: create the body at the queued transform and its fixtures.
    pub(crate) fn create(&mut self, id: EntityId, solver: &mut Solver) {
        let BodyState::Pending { transform } = self.state else {
            return;
        };
        let body = solver.create_body(id, self.body_kind, transform);
        self.state = BodyState::Live {
            body,
            fixtures: Vec::new(),
        };
        self.build_fixtures(id, solver);
        self.pose.reset(transform);
    }

    /// Live -> Destroyed. Pending entities just become inert.
    ///
    /// Returns `true` only when solver resources were actually released.
    pub(crate) fn destroy(&mut self, solver: &mut Solver) -> bool {
        match std::mem::replace(&mut self.state, BodyState::Destroyed) {
            BodyState::Live { body, .. } => solver.destroy_body(body),
            BodyState::Pending { .. } | BodyState::Destroyed => false,
        }
    }

    pub(crate) fn set_transform(&mut self, solver: &mut Solver, transform: Transform) {
        match &mut self.state {
            BodyState::Pending { transform: queued } => *queued = transform,
            BodyState::Live { body, .. } => solver.set_body_transform(*body, transform),
            BodyState::Destroyed => return,
        }
        self.pose.reset(transform);
    }

    /// Swap the shape; live bodies get all fixtures destroyed and rebuilt.
    pub(crate) fn set_shape(
        &mut self,
        id: EntityId,
        shape: Shape,
        solver: &mut Solver,
        repair: &dyn PolygonRepair,
        decomposer: &dyn Decompose,
        policy: DegeneracyPolicy,
    ) -> Result<(), WorldError> {
        let triangles = decompose_shape(&shape, repair, decomposer, policy)?;
        self.shape = shape;
        self.triangles = triangles;
        if matches!(self.state, BodyState::Live { .. }) {
            self.build_fixtures(id, solver);
        }
        Ok(())
    }

    pub(crate) fn set_filter(
        &mut self,
        id: EntityId,
        solver: &mut Solver,
        filter: CollisionFilter,
        anti_collision_group: u32,
    ) {
        self.filter = filter;
        self.anti_collision_group = anti_collision_group;
        let tag = self.fixture_tag(id);
        if let BodyState::Live { fixtures, .. } = &self.state {
            for &fixture in fixtures {
                solver.set_fixture_tag(fixture, tag);
            }
        }
    }

    fn fixture_tag(&self, id: EntityId) -> FixtureTag {
        FixtureTag {
            entity: id,
            filter: self.filter,
            anti_collision_group: self.anti_collision_group,
        }
    }

    /// One fixture per triangle (or a single ball). Existing fixtures are dropped first.
    fn build_fixtures(&mut self, id: EntityId, solver: &mut Solver) {
        let tag = self.fixture_tag(id);
        let geometry: Vec<FixtureGeometry> = match &self.shape {
            Shape::Circle { radius } => vec![FixtureGeometry::Ball { radius: *radius }],
            Shape::Polygon { .. } => self.triangles.iter().map(|t| FixtureGeometry::Triangle(*t)).collect(),
        };
        let material = self.material;

        let BodyState::Live { body, fixtures } = &mut self.state else {
            return;
        };
        for fixture in fixtures.drain(..) {
            solver.detach_fixture(fixture);
        }
        for g in geometry {
            fixtures.push(solver.attach_fixture(*body, g, material, tag));
        }
    }
}

fn decompose_shape(
    shape: &Shape,
    repair: &dyn PolygonRepair,
    decomposer: &dyn Decompose,
    policy: DegeneracyPolicy,
) -> Result<Vec<Triangle>, WorldError> {
    match shape {
        Shape::Circle { .. } => {
            shape.validate_radius()?;
            Ok(Vec::new())
        }
        Shape::Polygon { vertices } => decompose_checked(vertices, repair, decomposer, policy),
    }
}
