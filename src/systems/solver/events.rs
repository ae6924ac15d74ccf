use std::sync::Mutex;

use rapier2d::prelude::*;

/// Collects collision events raised during a step.
pub(super) struct ContactCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl ContactCollector {
    pub(super) fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn drain(&mut self) -> Vec<CollisionEvent> {
        self.events.get_mut().map(std::mem::take).unwrap_or_default()
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}
