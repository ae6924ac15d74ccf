use std::num::NonZeroUsize;

use glam::Vec2;
use rapier2d::prelude::*;

use crate::core::Transform;
use crate::domain::{BodyKind, EntityId, JointKind, Material};

use super::events::ContactCollector;
use super::filter::{FixtureTag, PairFilter};

#[inline]
fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

#[inline]
fn to_point(v: Vec2) -> Point<Real> {
    point![v.x, v.y]
}

fn to_transform(iso: &Isometry<Real>) -> Transform {
    Transform::new(iso.translation.vector.x, iso.translation.vector.y, iso.rotation.angle())
}

impl BodyKind {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
        }
    }
}

/// Geometry of a single fixture, in body-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FixtureGeometry {
    Ball { radius: f32 },
    Triangle([Vec2; 3]),
}

/// The rigid-body solver: every rapier set plus the pipeline that steps them.
///
/// Not thread-safe by contract; the world drives it from a single thread.
pub struct Solver {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    collector: ContactCollector,
}

impl Solver {
    pub fn new(gravity: Vec2, velocity_iterations: usize, position_iterations: usize) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        integration_parameters.num_internal_pgs_iterations = position_iterations.max(1);

        Self {
            gravity: to_vector(gravity),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collector: ContactCollector::new(),
        }
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_vector(gravity);
    }

    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    // -- bodies --

    pub fn create_body(&mut self, entity: EntityId, kind: BodyKind, transform: Transform) -> RigidBodyHandle {
        let body = RigidBodyBuilder::new(kind.to_rapier())
            .translation(to_vector(transform.position))
            .rotation(transform.angle)
            .user_data(entity.0 as u128)
            .build();
        self.bodies.insert(body)
    }

    /// Remove a body together with its fixtures and attached joints.
    ///
    /// Returns `false` if the body was already gone.
    pub fn destroy_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn body_exists(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.bodies.get(handle).map(|rb| to_transform(rb.position()))
    }

    pub fn set_body_transform(&mut self, handle: RigidBodyHandle, transform: Transform) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_position(Isometry::new(to_vector(transform.position), transform.angle), true);
        }
    }

    pub fn is_static(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.get(handle).is_some_and(|rb| rb.is_fixed())
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Vec2 {
        self.bodies
            .get(handle)
            .map(|rb| Vec2::new(rb.linvel().x, rb.linvel().y))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_linvel(to_vector(velocity), true);
        }
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, velocity: f32) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_angvel(velocity, true);
        }
    }

    // -- fixtures --

    pub fn attach_fixture(
        &mut self,
        body: RigidBodyHandle,
        geometry: FixtureGeometry,
        material: Material,
        tag: FixtureTag,
    ) -> ColliderHandle {
        let builder = match geometry {
            FixtureGeometry::Ball { radius } => ColliderBuilder::ball(radius),
            FixtureGeometry::Triangle([a, b, c]) => ColliderBuilder::triangle(to_point(a), to_point(b), to_point(c)),
        };
        let collider = builder
            .friction(material.friction)
            .density(material.density)
            .restitution(material.restitution)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS)
            .user_data(tag.pack())
            .build();
        self.colliders.insert_with_parent(collider, body, &mut self.bodies)
    }

    pub fn detach_fixture(&mut self, handle: ColliderHandle) -> bool {
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, true)
            .is_some()
    }

    pub fn set_fixture_tag(&mut self, handle: ColliderHandle, tag: FixtureTag) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.user_data = tag.pack();
        }
    }

    pub fn fixture_tag(&self, handle: ColliderHandle) -> Option<FixtureTag> {
        self.colliders.get(handle).map(|c| FixtureTag::unpack(c.user_data))
    }

    // -- joints --

    pub fn create_joint(
        &mut self,
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        kind: &JointKind,
        anchor_a: Vec2,
        anchor_b: Vec2,
    ) -> ImpulseJointHandle {
        let (a, b) = (to_point(anchor_a), to_point(anchor_b));
        let joint: GenericJoint = match *kind {
            JointKind::Revolute => RevoluteJointBuilder::new()
                .local_anchor1(a)
                .local_anchor2(b)
                .build()
                .into(),
            JointKind::Weld => FixedJointBuilder::new()
                .local_anchor1(a)
                .local_anchor2(b)
                .build()
                .into(),
            JointKind::Spring {
                rest_length,
                stiffness,
                damping,
            } => SpringJointBuilder::new(rest_length, stiffness, damping)
                .local_anchor1(a)
                .local_anchor2(b)
                .build()
                .into(),
        };
        self.impulse_joints.insert(body_a, body_b, joint, true)
    }

    /// Returns `false` if the joint was already gone (e.g. removed with a body).
    pub fn destroy_joint(&mut self, handle: ImpulseJointHandle) -> bool {
        self.impulse_joints.remove(handle, true).is_some()
    }

    pub fn joint_exists(&self, handle: ImpulseJointHandle) -> bool {
        self.impulse_joints.get(handle).is_some()
    }

    /// Live joints of a body, each with the body on the other end.
    pub fn attached_joints(&self, body: RigidBodyHandle) -> Vec<(ImpulseJointHandle, RigidBodyHandle)> {
        self.impulse_joints
            .attached_joints(body)
            .map(|(b1, b2, handle, _)| (handle, if b1 == body { b2 } else { b1 }))
            .collect()
    }

    // -- stepping --

    /// Advance exactly one step of `dt` seconds.
    ///
    /// Begin-contact pairs are appended to `contacts` as owning entity ids;
    /// end-contact events are dropped.
    pub fn advance(&mut self, dt: f32, contacts: &mut Vec<(EntityId, EntityId)>) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &PairFilter,
            &self.collector,
        );

        for event in self.collector.drain() {
            let CollisionEvent::Started(h1, h2, _) = event else {
                continue;
            };
            if let (Some(a), Some(b)) = (self.fixture_tag(h1), self.fixture_tag(h2)) {
                contacts.push((a.entity, b.entity));
            }
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::solver::CollisionFilter;

    fn tag(id: u32) -> FixtureTag {
        FixtureTag {
            entity: EntityId(id),
            filter: CollisionFilter::default(),
            anti_collision_group: 0,
        }
    }

    fn ball(solver: &mut Solver, id: u32, kind: BodyKind, x: f32, y: f32) -> RigidBodyHandle {
        let body = solver.create_body(EntityId(id), kind, Transform::new(x, y, 0.0));
        solver.attach_fixture(body, FixtureGeometry::Ball { radius: 0.5 }, Material::default(), tag(id));
        body
    }

    #[test]
    fn destroy_body_is_idempotent() {
        let mut solver = Solver::new(Vec2::ZERO, 8, 1);
        let body = ball(&mut solver, 1, BodyKind::Dynamic, 0.0, 0.0);
        assert_eq!(solver.body_count(), 1);
        assert_eq!(solver.collider_count(), 1);
        assert!(solver.destroy_body(body));
        assert!(!solver.destroy_body(body));
        assert_eq!(solver.collider_count(), 0);
    }

    #[test]
    fn destroying_body_drops_attached_joints() {
        let mut solver = Solver::new(Vec2::ZERO, 8, 1);
        let a = ball(&mut solver, 1, BodyKind::Dynamic, 0.0, 0.0);
        let b = ball(&mut solver, 2, BodyKind::Dynamic, 2.0, 0.0);
        let joint = solver.create_joint(a, b, &JointKind::Revolute, Vec2::ZERO, Vec2::new(-2.0, 0.0));

        assert_eq!(solver.attached_joints(a), vec![(joint, b)]);
        assert_eq!(solver.attached_joints(b), vec![(joint, a)]);

        solver.destroy_body(a);
        assert!(!solver.joint_exists(joint));
        assert!(!solver.destroy_joint(joint));
    }

    #[test]
    fn gravity_moves_dynamic_bodies_only() {
        let mut solver = Solver::new(Vec2::new(0.0, -10.0), 8, 1);
        let dynamic = ball(&mut solver, 1, BodyKind::Dynamic, 0.0, 10.0);
        let fixed = ball(&mut solver, 2, BodyKind::Static, 5.0, 10.0);
        let mut contacts = Vec::new();
        for _ in 0..30 {
            solver.advance(1.0 / 60.0, &mut contacts);
        }
        assert!(solver.body_transform(dynamic).unwrap().position.y < 9.0);
        assert_eq!(solver.body_transform(fixed).unwrap().position.y, 10.0);
        assert!(solver.is_static(fixed));
        assert!(!solver.is_static(dynamic));
    }

    #[test]
    fn begin_contacts_report_owning_entities() {
        let mut solver = Solver::new(Vec2::ZERO, 8, 1);
        let a = ball(&mut solver, 10, BodyKind::Dynamic, 0.0, 0.0);
        ball(&mut solver, 20, BodyKind::Dynamic, 3.0, 0.0);
        solver.set_linear_velocity(a, Vec2::new(10.0, 0.0));

        let mut contacts = Vec::new();
        for _ in 0..60 {
            solver.advance(1.0 / 60.0, &mut contacts);
        }
        assert!(!contacts.is_empty());
        let (x, y) = contacts[0];
        let mut ids = [x.0, y.0];
        ids.sort_unstable();
        assert_eq!(ids, [10, 20]);
    }
}
