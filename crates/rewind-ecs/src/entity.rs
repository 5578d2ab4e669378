//! Entity handles and the slot allocator behind them.
//!
//! History actions hold on to entity handles for as long as the entry stays in
//! the log. A slot that is freed and handed out again therefore gets a new
//! generation, so an old handle can never address the entity that replaced it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How many times a slot has been recycled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(u32);

impl Generation {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Slot index of an entity.
pub type EntityId = u32;

/// Handle to one lifetime of an entity slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    generation: Generation,
}

impl Entity {
    #[must_use]
    pub const fn new(id: EntityId, generation: Generation) -> Self {
        Self { id, generation }
    }

    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }

    #[must_use]
    pub const fn generation(self) -> Generation {
        self.generation
    }

    const fn slot(self) -> usize {
        self.id as usize
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({self})")
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.id, self.generation.0)
    }
}

#[derive(Clone, Copy, Default)]
struct Slot {
    generation: Generation,
    occupied: bool,
}

/// Hands out entity handles and recycles freed slots.
#[derive(Default)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    free: Vec<EntityId>,
    live: u32,
}

impl EntityAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Take a free slot, or grow by one.
    pub fn allocate(&mut self) -> Entity {
        self.live += 1;

        let id = self.free.pop().unwrap_or_else(|| {
            self.slots.push(Slot::default());
            (self.slots.len() - 1) as EntityId
        });
        let slot = &mut self.slots[id as usize];
        slot.occupied = true;
        Entity::new(id, slot.generation)
    }

    /// Free the slot of `entity`. Returns `false` for stale or unknown handles.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = &mut self.slots[entity.slot()];
        slot.generation = slot.generation.next();
        slot.occupied = false;
        self.free.push(entity.id);
        self.live -= 1;
        true
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.slot())
            .is_some_and(|slot| slot.occupied && slot.generation == entity.generation)
    }

    #[must_use]
    pub const fn alive_count(&self) -> u32 {
        self.live
    }

    /// Live entities in slot order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.occupied)
            .map(|(id, slot)| Entity::new(id as EntityId, slot.generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_grows_slots() {
        let mut allocator = EntityAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();

        assert_eq!((a.id(), b.id()), (0, 1));
        assert!(allocator.is_alive(a) && allocator.is_alive(b));
        assert_eq!(allocator.alive_count(), 2);
    }

    #[test]
    fn test_recycled_slot_gets_new_generation() {
        let mut allocator = EntityAllocator::new();
        let old = allocator.allocate();
        assert!(allocator.deallocate(old));
        assert!(!allocator.deallocate(old));

        let new = allocator.allocate();
        assert_eq!(new.id(), old.id());
        assert_eq!(new.generation(), old.generation().next());
        assert!(!allocator.is_alive(old));
        assert!(allocator.is_alive(new));
    }

    #[test]
    fn test_iter_alive_skips_freed_slots() {
        let mut allocator = EntityAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();
        let c = allocator.allocate();
        allocator.deallocate(b);

        assert_eq!(allocator.iter_alive().collect::<Vec<_>>(), vec![a, c]);
    }

    #[test]
    fn test_display() {
        let entity = Entity::new(7, Generation::new().next());
        assert_eq!(entity.to_string(), "7v1");
        assert_eq!(format!("{entity:?}"), "Entity(7v1)");
    }
}
