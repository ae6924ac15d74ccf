use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::core::WorldError;
use crate::domain::{EntityDefinition, EntityId, EntityKind};

use super::{commands, WorldCore};

/// Snapshot of the listed entities, physical ones first.
///
/// Definition ids are dense indices into the snapshot. A constraint is kept
/// only when both of its endpoints are part of it.
pub(super) fn definitions_for(world: &WorldCore, ids: &[EntityId]) -> Vec<EntityDefinition> {
    let wanted: HashSet<EntityId> = ids.iter().copied().collect();
    let mut local: HashMap<EntityId, u32> = HashMap::new();
    let mut out = Vec::new();

    for entity in world.entities.iter().filter(|e| wanted.contains(&e.id())) {
        if let EntityKind::Physical(p) = entity.kind() {
            let def_id = out.len() as u32;
            local.insert(entity.id(), def_id);
            out.push(EntityDefinition::physical(def_id, entity, p, p.transform(&world.solver)));
        }
    }

    for entity in world.entities.iter().filter(|e| wanted.contains(&e.id())) {
        if let EntityKind::Constraint(c) = entity.kind() {
            let [a, b] = c.endpoints();
            if let (Some(&a), Some(&b)) = (local.get(&a), local.get(&b)) {
                out.push(EntityDefinition::constraint(out.len() as u32, a, b, entity, c));
            }
        }
    }
    out
}

pub(super) fn to_definitions(world: &WorldCore) -> Vec<EntityDefinition> {
    let ids: Vec<EntityId> = world.entities.iter().map(|e| e.id()).collect();
    definitions_for(world, &ids)
}

/// Two-pass restore: bodies first, then constraints against the new ids.
///
/// The snapshot is checked up front; if any entity is still refused the
/// ones already created are removed again and the error is returned.
pub(super) fn load_definitions(
    world: &mut WorldCore,
    definitions: &[EntityDefinition],
) -> Result<Vec<EntityId>, WorldError> {
    check_references(definitions)?;

    let mut created: Vec<EntityId> = Vec::with_capacity(definitions.len());
    match restore(world, definitions, &mut created) {
        Ok(()) => Ok(created),
        Err(err) => {
            for id in created.iter().rev() {
                commands::remove_entity(world, *id);
            }
            Err(err)
        }
    }
}

fn restore(
    world: &mut WorldCore,
    definitions: &[EntityDefinition],
    created: &mut Vec<EntityId>,
) -> Result<(), WorldError> {
    let mut live: HashMap<u32, EntityId> = HashMap::new();

    for def in definitions {
        if let EntityDefinition::Physical(p) = def {
            let id = commands::add_entity(world, p.to_entity())?;
            live.insert(p.id, id);
            created.push(id);
        }
    }

    for def in definitions {
        if let EntityDefinition::Constraint(c) = def {
            let (a, b) = match (live.get(&c.a), live.get(&c.b)) {
                (Some(&a), Some(&b)) => (a, b),
                _ => return Err(WorldError::Definition(format!("constraint {} has dangling endpoints", c.id))),
            };
            let id = commands::add_entity(world, c.to_entity(a, b))?;
            created.push(id);
        }
    }
    Ok(())
}

/// Unique ids, and every constraint pointing at physical definitions.
fn check_references(definitions: &[EntityDefinition]) -> Result<(), WorldError> {
    let mut seen = HashSet::new();
    for def in definitions {
        if !seen.insert(def.id()) {
            return Err(WorldError::Definition(format!("duplicate definition id {}", def.id())));
        }
    }

    let physical: HashSet<u32> = definitions
        .iter()
        .filter(|d| !d.is_constraint())
        .map(EntityDefinition::id)
        .collect();
    for def in definitions {
        if let EntityDefinition::Constraint(c) = def {
            for endpoint in [c.a, c.b] {
                if !physical.contains(&endpoint) {
                    return Err(WorldError::Definition(format!(
                        "constraint {} references {endpoint}, which is not a physical definition",
                        c.id
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Duplicate a subset of entities, shifted by `offset`.
pub(super) fn copy_entities(
    world: &mut WorldCore,
    ids: &[EntityId],
    offset: Vec2,
) -> Result<Vec<EntityId>, WorldError> {
    let mut definitions = definitions_for(world, ids);
    for def in definitions.iter_mut() {
        if let EntityDefinition::Physical(p) = def {
            p.position += offset;
        }
    }
    load_definitions(world, &definitions)
}
