use crate::domain::Entity;

/// Handle returned by listener registration, used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Callbacks fired synchronously by the world.
///
/// Listeners only see entities by shared reference and cannot reach the world,
/// so they never mutate the collection while it is being walked.
pub trait WorldListener {
    /// Fired after the id is assigned, before solver resources exist.
    fn entity_added(&mut self, _entity: &Entity) {}

    /// Fired after the entity left the collection and was disposed.
    fn entity_removed(&mut self, _entity: &Entity) {}

    fn world_cleared(&mut self) {}

    /// Contact begin between two physical entities.
    fn contact_began(&mut self, _a: &Entity, _b: &Entity) {}

    /// Fired after every solver step with the running step count.
    fn post_step(&mut self, _step: u64) {}
}

#[derive(Default)]
pub(super) struct Listeners {
    next_id: u32,
    entries: Vec<(ListenerId, Box<dyn WorldListener>)>,
}

impl Listeners {
    pub(super) fn add(&mut self, listener: Box<dyn WorldListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push((id, listener));
        id
    }

    pub(super) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn entity_added(&mut self, entity: &Entity) {
        for (_, l) in self.entries.iter_mut() {
            l.entity_added(entity);
        }
    }

    pub(super) fn entity_removed(&mut self, entity: &Entity) {
        for (_, l) in self.entries.iter_mut() {
            l.entity_removed(entity);
        }
    }

    pub(super) fn world_cleared(&mut self) {
        for (_, l) in self.entries.iter_mut() {
            l.world_cleared();
        }
    }

    pub(super) fn contact_began(&mut self, a: &Entity, b: &Entity) {
        for (_, l) in self.entries.iter_mut() {
            l.contact_began(a, b);
        }
    }

    pub(super) fn post_step(&mut self, step: u64) {
        for (_, l) in self.entries.iter_mut() {
            l.post_step(step);
        }
    }
}
