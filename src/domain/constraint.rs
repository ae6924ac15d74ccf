use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::systems::solver::{ImpulseJointHandle, RigidBodyHandle, Solver};

use super::entity::EntityId;
use super::interpolation::Interpolated;

/// Joint flavours a constraint can use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JointKind {
    /// Pin: free rotation around the shared anchor
    Revolute,
    /// Rigid lock of both bodies
    Weld,
    Spring {
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum JointState {
    /// Endpoints not resolved yet.
    Pending,
    Live {
        joint: ImpulseJointHandle,
        bodies: [RigidBodyHandle; 2],
    },
    Destroyed,
}

/// Connects two physical entities through a solver joint. Has no body of its own.
///
/// Endpoints are stored by id and resolved against the world when the
/// constraint is added, so a constraint can be described before its
/// endpoints exist.
#[derive(Clone, Debug)]
pub struct ConstraintEntity {
    endpoints: [EntityId; 2],
    local_anchors: [Vec2; 2],
    joint_kind: JointKind,
    state: JointState,
    pub(crate) anchors: Interpolated<[Vec2; 2]>,
}

impl ConstraintEntity {
    pub fn new(a: EntityId, b: EntityId, joint_kind: JointKind) -> Self {
        Self {
            endpoints: [a, b],
            local_anchors: [Vec2::ZERO; 2],
            joint_kind,
            state: JointState::Pending,
            anchors: Interpolated::default(),
        }
    }

    /// Anchor offsets in each endpoint's local frame.
    pub fn with_anchors(mut self, anchor_a: Vec2, anchor_b: Vec2) -> Self {
        self.local_anchors = [anchor_a, anchor_b];
        self
    }

    pub fn endpoints(&self) -> [EntityId; 2] {
        self.endpoints
    }

    /// The endpoint that is not `id`, if `id` is one of them.
    pub fn other_endpoint(&self, id: EntityId) -> Option<EntityId> {
        match self.endpoints {
            [a, b] if a == id => Some(b),
            [a, b] if b == id => Some(a),
            _ => None,
        }
    }

    pub fn local_anchors(&self) -> [Vec2; 2] {
        self.local_anchors
    }

    pub fn joint_kind(&self) -> JointKind {
        self.joint_kind
    }

    pub fn state(&self) -> &JointState {
        &self.state
    }

    pub fn joint_handle(&self) -> Option<ImpulseJointHandle> {
        match self.state {
            JointState::Live { joint, .. } => Some(joint),
            _ => None,
        }
    }

    pub fn interpolated_anchors(&self) -> [Vec2; 2] {
        self.anchors.value
    }

    pub fn current_anchors(&self) -> [Vec2; 2] {
        self.anchors.current
    }

    /// World-space anchors straight from the endpoint bodies.
    pub fn anchor_positions(&self, solver: &Solver) -> Option<[Vec2; 2]> {
        let JointState::Live { bodies, .. } = &self.state else {
            return None;
        };
        let a = solver.body_transform(bodies[0])?;
        let b = solver.body_transform(bodies[1])?;
        Some([a.apply(self.local_anchors[0]), b.apply(self.local_anchors[1])])
    }

    /// Pending -> Live with the endpoint bodies resolved by the world.
    pub(crate) fn create(&mut self, solver: &mut Solver, bodies: [RigidBodyHandle; 2]) {
        if self.state != JointState::Pending {
            return;
        }
        let joint = solver.create_joint(
            bodies[0],
            bodies[1],
            &self.joint_kind,
            self.local_anchors[0],
            self.local_anchors[1],
        );
        self.state = JointState::Live { joint, bodies };
        if let Some(anchors) = self.anchor_positions(solver) {
            self.anchors.reset(anchors);
        }
    }

    /// Returns `true` only when the joint was still alive in the solver.
    pub(crate) fn destroy(&mut self, solver: &mut Solver) -> bool {
        match std::mem::replace(&mut self.state, JointState::Destroyed) {
            JointState::Live { joint, .. } => solver.destroy_joint(joint),
            JointState::Pending | JointState::Destroyed => false,
        }
    }
}
