//! Entities the engine pushes around and hurts
//!
//! The engine never owns entities. Callers pass a mutable slice into every
//! manager call that can affect them, and the manager only uses what this
//! trait exposes.

use crate::core_types::GridPos;

/// Something standing on the grid that explosions, collapses and fire can hurt
pub trait TrackedEntity {
    fn id(&self) -> u64;
    fn name(&self) -> &str;
    fn position(&self) -> GridPos;
    /// Move the entity; used by knockback
    fn set_position(&mut self, position: GridPos);
    fn health(&self) -> i32;
    fn take_damage(&mut self, amount: i32);

    /// Dead entities are skipped by every effect pass
    fn is_alive(&self) -> bool {
        self.health() > 0
    }
}

impl<T: TrackedEntity + ?Sized> TrackedEntity for Box<T> {
    fn id(&self) -> u64 {
        (**self).id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn position(&self) -> GridPos {
        (**self).position()
    }

    fn set_position(&mut self, position: GridPos) {
        (**self).set_position(position);
    }

    fn health(&self) -> i32 {
        (**self).health()
    }

    fn take_damage(&mut self, amount: i32) {
        (**self).take_damage(amount);
    }

    fn is_alive(&self) -> bool {
        (**self).is_alive()
    }
}

/// Minimal entity: a name, a position and a pool of hit points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicEntity {
    pub id: u64,
    pub name: String,
    pub position: GridPos,
    pub health: i32,
}

impl BasicEntity {
    pub fn new(id: u64, name: impl Into<String>, position: GridPos, health: i32) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            health,
        }
    }
}

impl TrackedEntity for BasicEntity {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> GridPos {
        self.position
    }

    fn set_position(&mut self, position: GridPos) {
        self.position = position;
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn take_damage(&mut self, amount: i32) {
        self.health = self.health.saturating_sub(amount.max(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_entity_delegates() {
        let mut boxed: Box<dyn TrackedEntity> = Box::new(BasicEntity::new(7, "Goblin", GridPos::new(1, 2), 10));
        assert_eq!(boxed.id(), 7);
        assert_eq!(boxed.name(), "Goblin");
        boxed.set_position(GridPos::new(3, 3));
        assert_eq!(boxed.position(), GridPos::new(3, 3));
        boxed.take_damage(4);
        assert_eq!(boxed.health(), 6);
        boxed.take_damage(-5);
        assert_eq!(boxed.health(), 6);
        boxed.take_damage(6);
        assert!(!boxed.is_alive());
    }
}
