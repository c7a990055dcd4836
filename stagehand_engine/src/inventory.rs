//! The player's inventory: actors carried between scenes.

use serde::{Deserialize, Serialize};

use crate::actor::Actor;

/// Methods common to things that own actors (scenes and the inventory).
pub trait ActorHolder {
    fn actor(&self, id: &str) -> Option<&Actor>;
    fn actor_mut(&mut self, id: &str) -> Option<&mut Actor>;
    /// Insert an actor, replacing any actor with the same id.
    fn add_actor(&mut self, actor: Actor);
    /// Detach an actor and hand it back to the caller.
    fn remove_actor(&mut self, id: &str) -> Option<Actor>;

    fn contains_actor(&self, id: &str) -> bool {
        self.actor(id).is_some()
    }
}

/// Carried items, in pick-up order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Actor>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|a| a.id.as_str())
    }
}

impl ActorHolder for Inventory {
    fn actor(&self, id: &str) -> Option<&Actor> {
        self.items.iter().find(|a| a.id == id)
    }

    fn actor_mut(&mut self, id: &str) -> Option<&mut Actor> {
        self.items.iter_mut().find(|a| a.id == id)
    }

    fn add_actor(&mut self, actor: Actor) {
        match self.items.iter_mut().find(|a| a.id == actor.id) {
            Some(existing) => *existing = actor,
            None => self.items.push(actor),
        }
    }

    fn remove_actor(&mut self, id: &str) -> Option<Actor> {
        let idx = self.items.iter().position(|a| a.id == id)?;
        Some(self.items.remove(idx))
    }
}
