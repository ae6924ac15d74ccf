use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Transform;
use crate::systems::solver::Solver;

use super::constraint::ConstraintEntity;
use super::physical::PhysicalEntity;

/// World-assigned identity. `0` means "not added yet"; real ids start at 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const UNASSIGNED: EntityId = EntityId(0);
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of entity kinds.
#[derive(Clone, Debug)]
pub enum EntityKind {
    Physical(PhysicalEntity),
    Constraint(ConstraintEntity),
}

/// A simulated object tracked by the world.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    payload: Option<serde_json::Value>,
    disposed: bool,
    kind: EntityKind,
}

impl Entity {
    pub fn physical(physical: PhysicalEntity) -> Self {
        Self::from_kind(EntityKind::Physical(physical))
    }

    pub fn constraint(constraint: ConstraintEntity) -> Self {
        Self::from_kind(EntityKind::Constraint(constraint))
    }

    fn from_kind(kind: EntityKind) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            payload: None,
            disposed: false,
            kind,
        }
    }

    /// Attach an opaque user payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }

    pub fn as_physical(&self) -> Option<&PhysicalEntity> {
        match &self.kind {
            EntityKind::Physical(p) => Some(p),
            EntityKind::Constraint(_) => None,
        }
    }

    pub fn as_constraint(&self) -> Option<&ConstraintEntity> {
        match &self.kind {
            EntityKind::Constraint(c) => Some(c),
            EntityKind::Physical(_) => None,
        }
    }

    /// Constraints occupy no space.
    pub fn has_body(&self) -> bool {
        matches!(self.kind, EntityKind::Physical(_))
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Interpolated transform of a physical entity.
    pub fn interpolated_transform(&self) -> Option<Transform> {
        self.as_physical().map(PhysicalEntity::interpolated_transform)
    }

    /// Snapshot the solver state; called by the world before the last step of a frame.
    pub fn store_previous_state(&mut self, solver: &Solver) {
        match &mut self.kind {
            EntityKind::Physical(p) => {
                let t = p.transform(solver);
                p.pose.store_previous(t);
            }
            EntityKind::Constraint(c) => {
                if let Some(anchors) = c.anchor_positions(solver) {
                    c.anchors.store_previous(anchors);
                }
            }
        }
    }

    /// Blend previous and latest solver state (`alpha = 0` is the previous snapshot).
    pub fn interpolate(&mut self, solver: &Solver, alpha: f32) {
        match &mut self.kind {
            EntityKind::Physical(p) => {
                let t = p.transform(solver);
                p.pose.blend(t, alpha);
            }
            EntityKind::Constraint(c) => {
                if let Some(anchors) = c.anchor_positions(solver) {
                    c.anchors.blend(anchors, alpha);
                }
            }
        }
    }

    /// Release solver resources. Safe to call any number of times.
    pub fn dispose(&mut self, solver: &mut Solver) {
        if self.disposed {
            return;
        }
        match &mut self.kind {
            EntityKind::Physical(p) => {
                p.destroy(solver);
            }
            EntityKind::Constraint(c) => {
                c.destroy(solver);
            }
        }
        self.disposed = true;
    }
}
