use std::collections::{HashMap, HashSet};

use crate::domain::{Entity, EntityId, EntityKind};
use crate::systems::solver::{ImpulseJointHandle, RigidBodyHandle, Solver};

/// Owner lookups for walking the constraint graph through the solver.
///
/// Physical entities are nodes, constraint entities are edges. Edges are
/// discovered from each body's live joint list, so only constraints the
/// solver still knows about connect anything.
pub struct ConstraintGraph<'a> {
    solver: &'a Solver,
    by_id: HashMap<EntityId, &'a Entity>,
    body_owner: HashMap<RigidBodyHandle, EntityId>,
    joint_owner: HashMap<ImpulseJointHandle, EntityId>,
}

impl<'a> ConstraintGraph<'a> {
    pub fn new(entities: &'a [Entity], solver: &'a Solver) -> Self {
        let mut by_id = HashMap::with_capacity(entities.len());
        let mut body_owner = HashMap::new();
        let mut joint_owner = HashMap::new();

        for entity in entities.iter().filter(|e| !e.is_disposed()) {
            by_id.insert(entity.id(), entity);
            match entity.kind() {
                EntityKind::Physical(p) => {
                    if let Some(body) = p.body_handle() {
                        body_owner.insert(body, entity.id());
                    }
                }
                EntityKind::Constraint(c) => {
                    if let Some(joint) = c.joint_handle() {
                        joint_owner.insert(joint, entity.id());
                    }
                }
            }
        }

        Self {
            solver,
            by_id,
            body_owner,
            joint_owner,
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Constraints and bodies adjacent to `id`.
    fn neighbours(&self, id: EntityId) -> Vec<EntityId> {
        let Some(entity) = self.by_id.get(&id) else {
            return Vec::new();
        };
        match entity.kind() {
            EntityKind::Physical(p) => {
                let Some(body) = p.body_handle() else {
                    return Vec::new();
                };
                let mut out = Vec::new();
                for (joint, other) in self.solver.attached_joints(body) {
                    if let Some(&constraint) = self.joint_owner.get(&joint) {
                        out.push(constraint);
                    }
                    if let Some(&owner) = self.body_owner.get(&other) {
                        out.push(owner);
                    }
                }
                out
            }
            EntityKind::Constraint(c) => c
                .endpoints()
                .into_iter()
                .filter(|e| self.by_id.contains_key(e))
                .collect(),
        }
    }

    /// Depth-first walk from `start`; every reachable entity appears once.
    pub fn connected(&self, start: EntityId) -> Vec<EntityId> {
        if !self.contains(start) {
            return Vec::new();
        }

        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            for next in self.neighbours(id) {
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }
        order
    }
}

/// Every entity transitively linked to `start`, constraints included.
pub fn all_connected_things(entities: &[Entity], solver: &Solver, start: EntityId) -> Vec<EntityId> {
    ConstraintGraph::new(entities, solver).connected(start)
}

/// Partition `ids` into connected groups.
///
/// Each group holds only members of `ids`; ids unknown to the world end up
/// in a group of their own so the result still covers the input.
pub fn split_into_groups_of_connected(entities: &[Entity], solver: &Solver, ids: &[EntityId]) -> Vec<Vec<EntityId>> {
    let graph = ConstraintGraph::new(entities, solver);

    let mut remaining: Vec<EntityId> = Vec::with_capacity(ids.len());
    for &id in ids {
        if !remaining.contains(&id) {
            remaining.push(id);
        }
    }

    let mut groups = Vec::new();
    while let Some(&seed) = remaining.first() {
        let component: HashSet<EntityId> = if graph.contains(seed) {
            graph.connected(seed).into_iter().collect()
        } else {
            HashSet::from([seed])
        };
        let (group, rest): (Vec<EntityId>, Vec<EntityId>) =
            remaining.into_iter().partition(|id| component.contains(id));
        groups.push(group);
        remaining = rest;
    }
    groups
}
