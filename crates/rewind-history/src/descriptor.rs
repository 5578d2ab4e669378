//! Type-erased registry of history-capable component types.
//!
//! The coordinator only sees [`ComponentId`]s coming out of the change
//! marks. A [`TypeDescriptor`] turns such an id back into typed operations
//! on `T` and its [`TypedHistory<T>`].

use std::any::Any;
use std::marker::PhantomData;

use hashbrown::HashMap;
use rewind_ecs::{Component, ComponentId, Entity, World, short_type_name};

use crate::{
    entry::{ActionKind, Direction},
    error::HistoryError,
    typed::TypedHistory,
};

/// A type-erased component value.
pub type ErasedValue = Box<dyn Any + Send + Sync>;

/// Typed operations for one component type, behind a uniform interface.
pub trait TypeDescriptor: Send + Sync {
    fn component_id(&self) -> ComponentId;

    /// Short type name (e.g., "Position").
    fn name(&self) -> &'static str;

    /// Copy the live value out of the world.
    fn snapshot(&self, world: &World, entity: Entity) -> Option<ErasedValue>;

    /// Move `value` into the live slot, inserting the component if absent.
    ///
    /// Returns `false` if the entity is dead or `value` has the wrong type.
    fn assign(&self, world: &mut World, entity: Entity, value: ErasedValue) -> bool;

    /// Whether `entity` has a history for this type.
    fn has_history(&self, world: &World, entity: Entity) -> bool;

    /// Record the live value as a new committed snapshot.
    fn store_current(&self, world: &mut World, entity: Entity) -> bool;

    /// Commit the final value captured when the component was removed.
    fn seal_destruction(&self, world: &mut World, entity: Entity) -> bool;

    /// Apply one recorded action to `entity`.
    fn replay(
        &self,
        world: &mut World,
        entity: Entity,
        kind: ActionKind,
        direction: Direction,
    ) -> Result<(), HistoryError>;
}

/// [`TypeDescriptor`] for a concrete component type.
pub struct TypedDescriptor<T> {
    id: ComponentId,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component + Clone> TypedDescriptor<T> {
    #[must_use]
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            name: short_type_name(std::any::type_name::<T>()),
            _marker: PhantomData,
        }
    }
}

impl<T: Component + Clone> TypeDescriptor for TypedDescriptor<T> {
    fn component_id(&self) -> ComponentId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn snapshot(&self, world: &World, entity: Entity) -> Option<ErasedValue> {
        world
            .get::<T>(entity)
            .map(|value| Box::new(value) as ErasedValue)
    }

    fn assign(&self, world: &mut World, entity: Entity, value: ErasedValue) -> bool {
        let Ok(value) = value.downcast::<T>() else {
            return false;
        };

        if world.has::<T>(entity) {
            world.update(entity, *value) && world.patch::<T>(entity)
        } else {
            world.insert(entity, *value)
        }
    }

    fn has_history(&self, world: &World, entity: Entity) -> bool {
        world.has::<TypedHistory<T>>(entity)
    }

    fn store_current(&self, world: &mut World, entity: Entity) -> bool {
        let Some(value) = world.get::<T>(entity) else {
            return false;
        };
        if !world.has::<TypedHistory<T>>(entity) {
            world.insert(entity, TypedHistory::<T>::new());
        }

        world
            .component_scope::<TypedHistory<T>, _>(entity, |_, history| history.store(value))
            .unwrap_or(false)
    }

    fn seal_destruction(&self, world: &mut World, entity: Entity) -> bool {
        world
            .component_scope::<TypedHistory<T>, _>(entity, |_, history| {
                history.seal_lifetime_end()
            })
            .unwrap_or(false)
    }

    fn replay(
        &self,
        world: &mut World,
        entity: Entity,
        kind: ActionKind,
        direction: Direction,
    ) -> Result<(), HistoryError> {
        if !world.is_alive(entity) {
            return Err(HistoryError::EntityNotFound(entity));
        }

        world
            .component_scope::<TypedHistory<T>, _>(entity, |world, history| {
                history.replay(world, entity, kind, direction)
            })
            .unwrap_or(Err(HistoryError::MissingHistory {
                entity,
                component: self.id,
            }))
    }
}

/// Maps component ids and names to their descriptors.
#[derive(Default)]
pub struct DescriptorRegistry {
    by_id: HashMap<ComponentId, Box<dyn TypeDescriptor>>,
    by_name: HashMap<&'static str, ComponentId>,
}

impl DescriptorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`, returning its component id. Idempotent.
    pub fn register<T: Component + Clone>(&mut self, world: &mut World) -> ComponentId {
        let id = world.register::<T>();
        if !self.by_id.contains_key(&id) {
            let descriptor = TypedDescriptor::<T>::new(id);
            self.by_name.insert(descriptor.name(), id);
            self.by_id.insert(id, Box::new(descriptor));
        }
        id
    }

    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.by_id.contains_key(&id)
    }

    #[must_use]
    pub fn resolve(&self, id: ComponentId) -> Option<&dyn TypeDescriptor> {
        self.by_id.get(&id).map(|descriptor| &**descriptor)
    }

    /// Like [`Self::resolve`], reporting unknown ids as an error.
    pub fn try_resolve(&self, id: ComponentId) -> Result<&dyn TypeDescriptor, HistoryError> {
        self.resolve(id).ok_or(HistoryError::Unresolved(id))
    }

    /// Resolve by short type name.
    #[must_use]
    pub fn resolve_by_name(&self, name: &str) -> Option<&dyn TypeDescriptor> {
        self.by_name.get(name).and_then(|id| self.resolve(*id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn TypeDescriptor> {
        self.by_id.values().map(|descriptor| &**descriptor)
    }
}

impl std::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("DescriptorRegistry")
            .field("types", &names)
            .finish()
    }
}
