//! Flat snapshot form of entities, used for save/load and copy.
//!
//! Constraint definitions point at their endpoints through the small
//! integer `id` of other definitions in the same snapshot, never through
//! live world ids.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::{Transform, WorldError};
use crate::systems::solver::CollisionFilter;

use super::constraint::{ConstraintEntity, JointKind};
use super::entity::{Entity, EntityId};
use super::physical::{BodyKind, PhysicalEntity};
use super::shape::{Material, Shape};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityDefinition {
    Physical(PhysicalDefinition),
    Constraint(ConstraintDefinition),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalDefinition {
    pub id: u32,
    pub shape: Shape,
    #[serde(default)]
    pub body: BodyKind,
    pub position: Vec2,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub material: Material,
    #[serde(default)]
    pub filter: CollisionFilter,
    #[serde(default)]
    pub anti_collision_group: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    pub id: u32,
    /// Definition id of the first endpoint
    pub a: u32,
    /// Definition id of the second endpoint
    pub b: u32,
    #[serde(default)]
    pub anchor_a: Vec2,
    #[serde(default)]
    pub anchor_b: Vec2,
    pub joint: JointKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl EntityDefinition {
    pub fn id(&self) -> u32 {
        match self {
            EntityDefinition::Physical(d) => d.id,
            EntityDefinition::Constraint(d) => d.id,
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, EntityDefinition::Constraint(_))
    }

    pub(crate) fn physical(
        id: u32,
        entity: &Entity,
        physical: &PhysicalEntity,
        transform: Transform,
    ) -> Self {
        EntityDefinition::Physical(PhysicalDefinition {
            id,
            shape: physical.shape().clone(),
            body: physical.body_kind(),
            position: transform.position,
            angle: transform.angle,
            material: physical.material(),
            filter: physical.filter(),
            anti_collision_group: physical.anti_collision_group(),
            payload: entity.payload().cloned(),
        })
    }

    pub(crate) fn constraint(id: u32, a: u32, b: u32, entity: &Entity, constraint: &ConstraintEntity) -> Self {
        let [anchor_a, anchor_b] = constraint.local_anchors();
        EntityDefinition::Constraint(ConstraintDefinition {
            id,
            a,
            b,
            anchor_a,
            anchor_b,
            joint: constraint.joint_kind(),
            payload: entity.payload().cloned(),
        })
    }
}

impl PhysicalDefinition {
    pub fn to_entity(&self) -> Entity {
        let physical = PhysicalEntity::new(self.shape.clone(), self.body)
            .at(self.position.x, self.position.y, self.angle)
            .with_material(self.material)
            .with_filter(self.filter)
            .with_anti_collision_group(self.anti_collision_group);
        let entity = Entity::physical(physical);
        match &self.payload {
            Some(payload) => entity.with_payload(payload.clone()),
            None => entity,
        }
    }
}

impl ConstraintDefinition {
    /// Build the entity once both endpoint definitions have live world ids.
    pub fn to_entity(&self, a: EntityId, b: EntityId) -> Entity {
        let constraint = ConstraintEntity::new(a, b, self.joint).with_anchors(self.anchor_a, self.anchor_b);
        let entity = Entity::constraint(constraint);
        match &self.payload {
            Some(payload) => entity.with_payload(payload.clone()),
            None => entity,
        }
    }
}

pub fn definitions_to_json(definitions: &[EntityDefinition]) -> Result<String, WorldError> {
    Ok(serde_json::to_string(definitions)?)
}

/// Parse a snapshot. Unknown `type` tags are rejected.
pub fn definitions_from_json(json: &str) -> Result<Vec<EntityDefinition>, WorldError> {
    Ok(serde_json::from_str(json)?)
}
