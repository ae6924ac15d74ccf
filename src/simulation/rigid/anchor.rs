use glam::Vec2;
use log::warn;

use crate::core::WorldError;
use crate::domain::{ConstraintEntity, Entity, EntityId, JointKind};

use super::{commands, WorldCore};

/// The designated anchor if still present, else the first static body.
pub(super) fn joint_anchor(world: &WorldCore) -> Option<EntityId> {
    if let Some(id) = world.joint_anchor {
        if world.index_of(id).is_some() {
            return Some(id);
        }
    }
    world
        .entities
        .iter()
        .find(|e| e.as_physical().is_some_and(|p| p.is_static()))
        .map(Entity::id)
}

pub(super) fn set_joint_anchor(world: &mut WorldCore, anchor: Option<EntityId>) -> Result<(), WorldError> {
    if let Some(id) = anchor {
        let entity = world.entity(id).ok_or(WorldError::UnknownEntity(id))?;
        if !entity.has_body() {
            return Err(WorldError::NotPhysical(id));
        }
    }
    world.joint_anchor = anchor;
    Ok(())
}

/// Pin `target` to the joint anchor at `world_point` with a revolute joint.
///
/// Returns `Ok(None)` when there is nothing to pin to; the world is untouched.
pub(super) fn pin_to_anchor(
    world: &mut WorldCore,
    target: EntityId,
    world_point: Vec2,
) -> Result<Option<EntityId>, WorldError> {
    let target_pose = {
        let entity = world.entity(target).ok_or(WorldError::UnknownEntity(target))?;
        let physical = entity.as_physical().ok_or(WorldError::NotPhysical(target))?;
        physical.transform(&world.solver)
    };

    let Some(anchor) = joint_anchor(world) else {
        warn!("pin_to_anchor: no joint anchor available, pin of {target} aborted");
        return Ok(None);
    };
    if anchor == target {
        warn!("pin_to_anchor: {target} is the joint anchor itself, pin aborted");
        return Ok(None);
    }

    let anchor_pose = world
        .entity(anchor)
        .and_then(Entity::as_physical)
        .map(|p| p.transform(&world.solver))
        .ok_or(WorldError::UnresolvedEndpoint(anchor))?;

    let constraint = ConstraintEntity::new(target, anchor, JointKind::Revolute).with_anchors(
        target_pose.inverse_apply(world_point),
        anchor_pose.inverse_apply(world_point),
    );
    commands::add_entity(world, Entity::constraint(constraint)).map(Some)
}
