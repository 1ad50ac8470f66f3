//! Destruction events and the listener list that receives them
//!
//! Events are delivered synchronously, in the order they happen, to every
//! subscribed listener. Listeners cannot reach back into the manager; they
//! record, log or forward.

use crate::core_types::{GridOffset, GridPos};
use crate::explosion::ExplosionDescriptor;
use std::fmt;

/// What hurt an entity outside of fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityDamageCause {
    /// Direct blast damage
    Explosion,
    /// Knockback slammed it into something solid
    Collision,
    /// A collapsing tile fell on it
    Debris,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DestructionEvent {
    TileDamaged { position: GridPos, damage: i32 },
    TileDestroyed { position: GridPos },
    TileIgnited { position: GridPos },
    FireExtinguished { position: GridPos },
    TileCollapsed { position: GridPos, debris_damage: i32 },
    ExplosionTriggered { position: GridPos, descriptor: ExplosionDescriptor },
    EntityBurned { entity_id: u64, name: String, damage: i32 },
    EntityKnocked { entity_id: u64, name: String, offset: GridOffset },
    EntityDamaged {
        entity_id: u64,
        name: String,
        damage: i32,
        cause: EntityDamageCause,
    },
}

pub type EventListener = Box<dyn FnMut(&DestructionEvent)>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, EventListener)>,
    next_id: u32,
    emitted: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("emitted", &self.emitted)
            .finish()
    }
}

impl EventBus {
    pub fn subscribe(&mut self, listener: impl FnMut(&DestructionEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Events emitted since creation, listened to or not
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn emit(&mut self, event: &DestructionEvent) {
        self.emitted += 1;
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
