//! Resources - global state that exists once per world.
//!
//! Unlike regular components which are attached to entities,
//! resources exist independently and are accessed by type.
//!
//! Examples: event systems, history coordinators, configuration.

use std::any::{Any, TypeId};

use hashbrown::HashMap;

/// Marker trait for resource types.
pub trait Resource: Send + Sync + 'static {}

// Blanket implementation
impl<T: Send + Sync + 'static> Resource for T {}

/// Storage for world resources, keyed by type.
#[derive(Default)]
pub struct Resources {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Resources {
    /// Create new empty resource storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, replacing (and returning) any existing value of the same type.
    pub fn insert<R: Resource>(&mut self, value: R) -> Option<R> {
        let old = self.entries.insert(TypeId::of::<R>(), Box::new(value));
        old.and_then(|entry| entry.downcast().ok().map(|b| *b))
    }

    #[must_use]
    pub fn get<R: Resource>(&self) -> Option<&R> {
        self.entries.get(&TypeId::of::<R>())?.downcast_ref()
    }

    pub fn get_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.entries.get_mut(&TypeId::of::<R>())?.downcast_mut()
    }

    /// Remove a resource, returning it if it existed.
    pub fn remove<R: Resource>(&mut self) -> Option<R> {
        self.entries
            .remove(&TypeId::of::<R>())
            .and_then(|entry| entry.downcast().ok().map(|b| *b))
    }

    #[must_use]
    pub fn contains<R: Resource>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<R>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct TickRate(u32);

    #[derive(Debug, Default, PartialEq)]
    struct Paused(bool);

    #[test]
    fn test_insert_get_replace() {
        let mut resources = Resources::new();

        assert_eq!(resources.insert(TickRate(20)), None);
        assert_eq!(resources.get::<TickRate>(), Some(&TickRate(20)));
        assert_eq!(resources.insert(TickRate(30)), Some(TickRate(20)));
        assert_eq!(resources.len(), 1);
    }

    #[test]
    fn test_get_mut_and_remove() {
        let mut resources = Resources::new();
        resources.insert(Paused(false));

        resources.get_mut::<Paused>().unwrap().0 = true;
        assert_eq!(resources.remove::<Paused>(), Some(Paused(true)));
        assert!(!resources.contains::<Paused>());
        assert!(resources.is_empty());
    }
}
