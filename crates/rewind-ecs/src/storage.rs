//! Component storage - one sparse set per component type.
//!
//! Values live in a dense array next to the entity that owns them, with a
//! sparse index for O(1) lookup. Iteration follows the dense order, which is
//! stable between calls as long as nothing is removed.

use std::any::Any;

use hashbrown::HashMap;

use crate::{component::Component, entity::Entity};

/// Dense storage for all components of a single type.
pub struct ComponentStorage<T> {
    entities: Vec<Entity>,
    values: Vec<T>,
    /// Entity -> index into `entities`/`values`.
    index: HashMap<Entity, usize>,
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            values: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Component> ComponentStorage<T> {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the component of `entity`.
    ///
    /// Returns the previous value when one was replaced.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(&row) = self.index.get(&entity) {
            return Some(std::mem::replace(&mut self.values[row], value));
        }

        self.index.insert(entity, self.entities.len());
        self.entities.push(entity);
        self.values.push(value);
        None
    }

    /// Remove the component of `entity`, swapping the last row into its place.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let row = self.index.remove(&entity)?;
        self.entities.swap_remove(row);
        let value = self.values.swap_remove(row);

        if let Some(&moved) = self.entities.get(row) {
            self.index.insert(moved, row);
        }

        Some(value)
    }

    /// Get a reference to the component of `entity`.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.index.get(&entity).map(|&row| &self.values[row])
    }

    /// Get a mutable reference to the component of `entity`.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let row = *self.index.get(&entity)?;
        self.values.get_mut(row)
    }

    /// Iterate over `(entity, value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }
}

/// Type-erased view over a [`ComponentStorage`], used where the world
/// handles storages without knowing their component type.
pub trait ErasedStorage: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Whether `entity` has a value in this storage.
    fn contains(&self, entity: Entity) -> bool;

    /// Drop the value of `entity`, if any.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Entities with a value, in dense order.
    fn entities(&self) -> &[Entity];

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Component> ErasedStorage for ComponentStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn len(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Generation;

    fn entity(id: u32) -> Entity {
        Entity::new(id, Generation::new())
    }

    #[test]
    fn test_insert_get_replace() {
        let mut storage = ComponentStorage::<u32>::new();

        assert_eq!(storage.insert(entity(1), 10), None);
        assert_eq!(storage.get(entity(1)), Some(&10));
        assert_eq!(storage.insert(entity(1), 11), Some(10));
        assert_eq!(storage.get(entity(1)), Some(&11));
        assert_eq!(ErasedStorage::len(&storage), 1);
    }

    #[test]
    fn test_swap_remove_keeps_index_valid() {
        let mut storage = ComponentStorage::<&'static str>::new();
        storage.insert(entity(0), "a");
        storage.insert(entity(1), "b");
        storage.insert(entity(2), "c");

        assert_eq!(storage.remove(entity(0)), Some("a"));
        assert_eq!(storage.get(entity(2)), Some(&"c"));
        assert_eq!(storage.get(entity(1)), Some(&"b"));
        assert_eq!(storage.entities(), &[entity(2), entity(1)]);
        assert_eq!(storage.remove(entity(0)), None);
    }

    #[test]
    fn test_erased_downcast() {
        let mut storage: Box<dyn ErasedStorage> = Box::new(ComponentStorage::<u8>::new());
        storage
            .as_any_mut()
            .downcast_mut::<ComponentStorage<u8>>()
            .unwrap()
            .insert(entity(3), 7);

        assert!(storage.contains(entity(3)));
        assert!(storage.remove_entity(entity(3)));
        assert!(storage.is_empty());
        assert!(storage.as_any().downcast_ref::<ComponentStorage<u16>>().is_none());
    }
}
