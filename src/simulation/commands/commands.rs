use log::debug;

use crate::core::{Transform, WorldError};
use crate::domain::{Entity, EntityId, EntityKind, Shape};
use crate::systems::solver::{CollisionFilter, RigidBodyHandle};

use super::{find_entity, WorldCore};

/// Validate, register, notify, then create solver resources.
///
/// Everything that can fail runs before the id is assigned, so a refused
/// entity never shows up in the collection or in a listener callback.
pub(super) fn add_entity(world: &mut WorldCore, mut entity: Entity) -> Result<EntityId, WorldError> {
    if entity.id() != EntityId::UNASSIGNED || entity.is_disposed() {
        return Err(WorldError::AlreadyAdded(entity.id()));
    }

    let bodies = match entity.kind_mut() {
        EntityKind::Physical(p) => {
            p.prepare(world.repair.as_ref(), world.decomposer.as_ref(), world.settings.degeneracy)?;
            None
        }
        EntityKind::Constraint(c) => {
            let [a, b] = c.endpoints();
            if a == b {
                return Err(WorldError::SelfConstraint(a));
            }
            Some([resolve_endpoint(&world.entities, a)?, resolve_endpoint(&world.entities, b)?])
        }
    };

    let next_id = world.next_id.checked_add(1).ok_or(WorldError::IdsExhausted)?;
    let id = EntityId(world.next_id);
    world.next_id = next_id;
    entity.assign_id(id);

    let index = world.entities.len();
    world.entities.push(entity);
    world.listeners.entity_added(&world.entities[index]);

    match (world.entities[index].kind_mut(), bodies) {
        (EntityKind::Physical(p), _) => p.create(id, &mut world.solver),
        (EntityKind::Constraint(c), Some(bodies)) => c.create(&mut world.solver, bodies),
        (EntityKind::Constraint(_), None) => {}
    }

    debug!("added entity {id}");
    Ok(id)
}

/// Live body of a constraint endpoint.
fn resolve_endpoint(entities: &[Entity], id: EntityId) -> Result<RigidBodyHandle, WorldError> {
    let entity = find_entity(entities, id).ok_or(WorldError::UnresolvedEndpoint(id))?;
    let physical = entity.as_physical().ok_or(WorldError::NotPhysical(id))?;
    physical.body_handle().ok_or(WorldError::UnresolvedEndpoint(id))
}

/// Remove and dispose. Absent ids are ignored.
///
/// A physical entity takes its attached constraints with it; each of them
/// is removed (and reported) first.
pub(super) fn remove_entity(world: &mut WorldCore, id: EntityId) -> bool {
    let Some(index) = world.index_of(id) else {
        return false;
    };

    if world.entities[index].has_body() {
        let attached: Vec<EntityId> = world
            .entities
            .iter()
            .filter(|e| e.as_constraint().is_some_and(|c| c.other_endpoint(id).is_some()))
            .map(Entity::id)
            .collect();
        for constraint in attached {
            remove_entity(world, constraint);
        }
    }

    let Some(index) = world.index_of(id) else {
        return false;
    };
    let mut entity = world.entities.remove(index);
    entity.dispose(&mut world.solver);
    if world.joint_anchor == Some(id) {
        world.joint_anchor = None;
    }
    world.listeners.entity_removed(&entity);

    debug!("removed entity {id}");
    true
}

/// Joints first, then bodies, then the cleared notification.
pub(super) fn clear(world: &mut WorldCore) {
    for entity in world.entities.iter_mut().filter(|e| !e.has_body()) {
        entity.dispose(&mut world.solver);
    }
    for entity in world.entities.iter_mut().filter(|e| e.has_body()) {
        entity.dispose(&mut world.solver);
    }

    let count = world.entities.len();
    world.entities.clear();
    world.joint_anchor = None;
    world.accumulator = 0.0;
    world.listeners.world_cleared();

    debug!("cleared world ({count} entities)");
}

pub(super) fn set_transform(world: &mut WorldCore, id: EntityId, transform: Transform) -> Result<(), WorldError> {
    let index = world.index_of(id).ok_or(WorldError::UnknownEntity(id))?;
    let EntityKind::Physical(p) = world.entities[index].kind_mut() else {
        return Err(WorldError::NotPhysical(id));
    };
    p.set_transform(&mut world.solver, transform);

    // Attached anchors jump along with the body.
    for entity in world.entities.iter_mut() {
        if let EntityKind::Constraint(c) = entity.kind_mut() {
            if c.other_endpoint(id).is_some() {
                if let Some(anchors) = c.anchor_positions(&world.solver) {
                    c.anchors.reset(anchors);
                }
            }
        }
    }
    Ok(())
}

pub(super) fn set_shape(world: &mut WorldCore, id: EntityId, shape: Shape) -> Result<(), WorldError> {
    let index = world.index_of(id).ok_or(WorldError::UnknownEntity(id))?;
    let EntityKind::Physical(p) = world.entities[index].kind_mut() else {
        return Err(WorldError::NotPhysical(id));
    };
    p.set_shape(
        id,
        shape,
        &mut world.solver,
        world.repair.as_ref(),
        world.decomposer.as_ref(),
        world.settings.degeneracy,
    )
}

pub(super) fn set_fixture_filter(
    world: &mut WorldCore,
    id: EntityId,
    filter: CollisionFilter,
    anti_collision_group: u32,
) -> Result<(), WorldError> {
    let index = world.index_of(id).ok_or(WorldError::UnknownEntity(id))?;
    let EntityKind::Physical(p) = world.entities[index].kind_mut() else {
        return Err(WorldError::NotPhysical(id));
    };
    p.set_filter(id, &mut world.solver, filter, anti_collision_group);
    Ok(())
}
