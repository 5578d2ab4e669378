//! Component type registration and metadata.
//!
//! Components are data types that can be attached to entities.
//! Each component type gets a stable [`ComponentId`] within its registry,
//! plus a `tracked` flag that decides whether mutations of that type feed
//! the per-entity change marks.

use std::{any::TypeId, fmt};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Anything `Send + Sync + 'static` can be attached to an entity.
pub trait Component: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Component for T {}

/// Identifier of a component type within one world.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(u32);

impl ComponentId {
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Metadata about one registered type.
#[derive(Clone)]
pub struct ComponentInfo {
    id: ComponentId,
    name: &'static str,
    type_id: TypeId,
    tracked: bool,
}

impl ComponentInfo {
    #[must_use]
    pub fn of<T: Component>(id: ComponentId) -> Self {
        Self {
            id,
            name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            tracked: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Get the type name without its module path.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }

    /// Whether mutations of this type are recorded in the change marks.
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        self.tracked
    }

    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tracked", &self.tracked)
            .finish()
    }
}

/// Strip the module path from a type name.
#[must_use]
pub fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Per-world table of component types.
///
/// IDs are handed out sequentially per registry, so two worlds never share
/// hidden global state. `infos[id]` describes the type with that id.
#[derive(Default)]
pub struct ComponentRegistry {
    type_to_id: HashMap<TypeId, ComponentId>,
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; a known type keeps its id.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        let type_id = TypeId::of::<T>();

        if let Some(&id) = self.type_to_id.get(&type_id) {
            return id;
        }

        let id = ComponentId(self.infos.len() as u32);
        self.type_to_id.insert(type_id, id);
        self.infos.push(ComponentInfo::of::<T>(id));
        id
    }

    #[must_use]
    pub fn get_id<T: Component>(&self) -> Option<ComponentId> {
        self.type_to_id.get(&TypeId::of::<T>()).copied()
    }

    #[must_use]
    pub fn get_info(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.infos.get(id.as_raw() as usize)
    }

    /// Mark a registered type as tracked (or untracked).
    ///
    /// Returns `false` if the ID is unknown.
    pub fn set_tracked(&mut self, id: ComponentId, tracked: bool) -> bool {
        match self.infos.get_mut(id.as_raw() as usize) {
            Some(info) => {
                info.tracked = tracked;
                true
            }
            None => false,
        }
    }

    /// Whether the type behind `id` is tracked.
    #[must_use]
    pub fn is_tracked(&self, id: ComponentId) -> bool {
        self.get_info(id).is_some_and(ComponentInfo::is_tracked)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.infos.iter()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("count", &self.len())
            .field("components", &self.infos)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    struct Velocity;

    #[test]
    fn test_component_registration() {
        let mut registry = ComponentRegistry::new();

        let pos_id = registry.register::<Position>();
        let vel_id = registry.register::<Velocity>();

        assert_ne!(pos_id, vel_id);
        assert_eq!(registry.get_id::<Position>(), Some(pos_id));
        assert_eq!(registry.get_id::<Velocity>(), Some(vel_id));
        assert!(registry.get_info(pos_id).unwrap().is::<Position>());
    }

    #[test]
    fn test_idempotent_registration() {
        let mut registry = ComponentRegistry::new();

        let id1 = registry.register::<Position>();
        let id2 = registry.register::<Position>();

        assert_eq!(id1, id2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registries_are_independent() {
        let mut a = ComponentRegistry::new();
        let mut b = ComponentRegistry::new();

        a.register::<Velocity>();
        let in_a = a.register::<Position>();
        let in_b = b.register::<Position>();

        assert_eq!(in_a.as_raw(), 1);
        assert_eq!(in_b.as_raw(), 0);
    }

    #[test]
    fn test_tracked_flag() {
        let mut registry = ComponentRegistry::new();
        let id = registry.register::<Position>();

        assert!(!registry.is_tracked(id));
        assert!(registry.set_tracked(id, true));
        assert!(registry.is_tracked(id));
        assert!(!registry.set_tracked(ComponentId::from_raw(99), true));
    }

    #[test]
    fn test_short_name() {
        let mut registry = ComponentRegistry::new();
        let id = registry.register::<Position>();
        assert_eq!(registry.get_info(id).unwrap().short_name(), "Position");
    }
}
