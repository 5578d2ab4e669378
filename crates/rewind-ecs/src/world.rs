//! World - the main container for all ECS data.
//!
//! The World holds all entities, components, and resources. It provides the
//! primary API for spawning entities, adding/removing components, and
//! querying data.
//!
//! Mutations of *tracked* component types leave change marks on the entity
//! ([`ModificationSet`] and [`LifetimeSet`]) until someone calls
//! [`World::clear_all_marks`]. Marks are never recorded inside
//! [`World::untracked`] scopes, so code that restores state does not record
//! itself.
//!
//! The world is `Send + Sync` but takes `&mut self` for every mutation.
//! Hosts that drive it from several threads wrap it in a
//! `parking_lot::Mutex`.

use hashbrown::HashMap;
use tracing::trace;

use crate::{
    component::{Component, ComponentId, ComponentInfo, ComponentRegistry},
    entity::{Entity, EntityAllocator},
    hooks::{ComponentHooks, OnLifetimeEnd, OnLifetimeRestart},
    resource::{Resource, Resources},
    storage::{ComponentStorage, ErasedStorage},
    tracking::{LifetimeSet, ModificationSet},
};

/// The ECS World containing all entities, components, and resources.
pub struct World {
    entities: EntityAllocator,
    components: ComponentRegistry,
    storages: HashMap<ComponentId, Box<dyn ErasedStorage>>,
    resources: Resources,
    hooks: HashMap<ComponentId, ComponentHooks>,
    /// Nesting depth of `untracked` scopes. Tracking is on only at zero.
    untracked_depth: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            components: ComponentRegistry::new(),
            storages: HashMap::new(),
            resources: Resources::new(),
            hooks: HashMap::new(),
            untracked_depth: 0,
        }
    }

    /// Create a world with pre-allocated entity capacity.
    #[must_use]
    pub fn with_capacity(entity_capacity: usize) -> Self {
        Self {
            entities: EntityAllocator::with_capacity(entity_capacity),
            ..Self::new()
        }
    }

    // ==================== Entities ====================

    /// Spawn an entity without components.
    pub fn spawn_empty(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Spawn an entity with a single component.
    pub fn spawn<T: Component>(&mut self, component: T) -> Entity {
        let entity = self.entities.allocate();
        self.insert(entity, component);
        entity
    }

    /// Despawn an entity, removing it and all its components.
    ///
    /// No lifetime hooks run: whatever history the entity had goes with it.
    /// Returns `true` if the entity existed and was removed.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }

        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }

        self.entities.deallocate(entity)
    }

    /// Check if an entity is alive.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Get the number of alive entities.
    #[must_use]
    pub const fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    /// Iterate over all alive entities.
    pub fn entities_iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_alive()
    }

    // ==================== Component types ====================

    /// Register a component type without creating any entities.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.components.register::<T>()
    }

    /// Get the component ID for a type, if registered.
    #[must_use]
    pub fn component_id<T: Component>(&self) -> Option<ComponentId> {
        self.components.get_id::<T>()
    }

    #[must_use]
    pub fn component_info(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.components.get_info(id)
    }

    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Enable or disable change tracking for a component type.
    pub fn set_tracked<T: Component>(&mut self, tracked: bool) -> ComponentId {
        let id = self.components.register::<T>();
        self.components.set_tracked(id, tracked);
        id
    }

    #[must_use]
    pub fn is_tracked<T: Component>(&self) -> bool {
        self.components
            .get_id::<T>()
            .is_some_and(|id| self.components.is_tracked(id))
    }

    // ==================== Component access ====================

    /// Add a component to an entity.
    ///
    /// If the entity already has this component type, it is replaced and the
    /// type is marked modified. Otherwise a creation is recorded.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }

        let id = self.components.register::<T>();
        let Some(storage) = self.storage_or_init::<T>() else {
            return false;
        };
        let replaced = storage.insert(entity, component).is_some();

        if !self.is_tracking(id) {
            return true;
        }

        if replaced {
            self.mark_modified(entity, id);
            return true;
        }

        let restarted = self
            .marks_or_init::<LifetimeSet>(entity)
            .is_some_and(|lifetimes| {
                let pending_destroy = lifetimes.is_destroyed(id);
                lifetimes.add_created(id);
                pending_destroy
            });

        if restarted {
            trace!(%entity, component = %id, "lifetime restarted");
            self.fire_lifetime_restart(&OnLifetimeRestart {
                entity,
                component: id,
            });
            self.mark_modified(entity, id);
        }

        true
    }

    /// Remove a component from an entity.
    ///
    /// For tracked types the lifetime-end hooks run first, while the value is
    /// still readable. Returns the removed component if it existed.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let id = self.components.get_id::<T>()?;
        if !self.has_component(entity, id) {
            return None;
        }

        if self.is_tracking(id) {
            trace!(%entity, component = %id, "lifetime ended");
            self.fire_lifetime_end(&OnLifetimeEnd {
                entity,
                component: id,
            });

            if let Some(modifications) = self.marks_mut::<ModificationSet>(entity) {
                modifications.remove(id);
            }
            if let Some(lifetimes) = self.marks_or_init::<LifetimeSet>(entity) {
                lifetimes.add_destroyed(id);
            }
        }

        self.storage_mut::<T>()?.remove(entity)
    }

    /// Get an owned copy of an entity's component.
    #[must_use]
    pub fn get<T: Component + Clone>(&self, entity: Entity) -> Option<T> {
        self.get_ref::<T>(entity).cloned()
    }

    /// Get a reference to an entity's component.
    #[must_use]
    pub fn get_ref<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Get a mutable reference to an entity's component.
    ///
    /// Writing through this reference does not mark anything; follow up with
    /// [`World::patch`] when the change should be tracked.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Overwrite an existing component and mark it modified.
    ///
    /// Returns `false` if the entity doesn't have the component.
    pub fn update<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        let Some(slot) = self.get_mut::<T>(entity) else {
            return false;
        };
        *slot = component;

        if let Some(id) = self.components.get_id::<T>() {
            if self.is_tracking(id) {
                self.mark_modified(entity, id);
            }
        }
        true
    }

    /// Signal that a component was changed in place.
    ///
    /// Marks the type modified (when tracked) and runs the patch hooks.
    pub fn patch<T: Component>(&mut self, entity: Entity) -> bool {
        let Some(id) = self.components.get_id::<T>() else {
            return false;
        };
        if !self.has_component(entity, id) {
            return false;
        }

        if self.is_tracking(id) {
            self.mark_modified(entity, id);
        }

        let hooks = self
            .hooks
            .get(&id)
            .map(|h| h.on_patch.clone())
            .unwrap_or_default();
        for hook in hooks {
            hook(self, entity);
        }
        true
    }

    /// Check if an entity has a component.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.components
            .get_id::<T>()
            .is_some_and(|id| self.has_component(entity, id))
    }

    /// Check if an entity has a component, by ID.
    #[must_use]
    pub fn has_component(&self, entity: Entity, id: ComponentId) -> bool {
        self.storages
            .get(&id)
            .is_some_and(|storage| storage.contains(entity))
    }

    /// Take a component out of the entity for the duration of `f`.
    ///
    /// The component is detached and reattached without marks or hooks, so
    /// `f` can hold it mutably while also mutating the world. Returns `None`
    /// if the entity doesn't have the component.
    pub fn component_scope<T: Component, U>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut World, &mut T) -> U,
    ) -> Option<U> {
        let mut value = self.storage_mut::<T>()?.remove(entity)?;
        let result = f(self, &mut value);

        if self.entities.is_alive(entity) {
            if let Some(storage) = self.storage_or_init::<T>() {
                storage.insert(entity, value);
            }
        }
        Some(result)
    }

    /// Iterate over all `(entity, component)` pairs of type `T`.
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.storage::<T>()
            .into_iter()
            .flat_map(|storage| storage.iter())
    }

    /// Entities that currently have a `T`.
    #[must_use]
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        self.components
            .get_id::<T>()
            .and_then(|id| self.storages.get(&id))
            .map(|storage| storage.entities().to_vec())
            .unwrap_or_default()
    }

    // ==================== Tracking ====================

    /// Run `f` with change tracking suspended.
    pub fn untracked<U>(&mut self, f: impl FnOnce(&mut World) -> U) -> U {
        self.untracked_depth += 1;
        let result = f(self);
        self.untracked_depth -= 1;
        result
    }

    /// Whether mutations are currently being recorded.
    #[must_use]
    pub const fn is_tracking_enabled(&self) -> bool {
        self.untracked_depth == 0
    }

    /// Modified-type marks of `entity`, if it has any.
    #[must_use]
    pub fn modifications(&self, entity: Entity) -> Option<&ModificationSet> {
        self.get_ref::<ModificationSet>(entity)
    }

    /// Lifetime marks of `entity`, if it has any.
    #[must_use]
    pub fn lifetimes(&self, entity: Entity) -> Option<&LifetimeSet> {
        self.get_ref::<LifetimeSet>(entity)
    }

    /// Entities with at least one modified-type mark.
    #[must_use]
    pub fn modified_entities(&self) -> Vec<Entity> {
        self.query::<ModificationSet>()
            .filter(|(_, set)| !set.is_empty())
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Entities with at least one created or destroyed mark.
    #[must_use]
    pub fn lifetime_entities(&self) -> Vec<Entity> {
        self.query::<LifetimeSet>()
            .filter(|(_, set)| !set.is_empty())
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Whether any entity carries marks not yet consumed.
    #[must_use]
    pub fn has_pending_marks(&self) -> bool {
        self.query::<ModificationSet>().any(|(_, set)| !set.is_empty())
            || self.query::<LifetimeSet>().any(|(_, set)| !set.is_empty())
    }

    /// Drop both mark sets of one entity.
    pub fn clear_marks(&mut self, entity: Entity) {
        if let Some(storage) = self.storage_mut::<ModificationSet>() {
            storage.remove(entity);
        }
        if let Some(storage) = self.storage_mut::<LifetimeSet>() {
            storage.remove(entity);
        }
    }

    /// Drop the marks of every entity.
    pub fn clear_all_marks(&mut self) {
        for id in [
            self.components.get_id::<ModificationSet>(),
            self.components.get_id::<LifetimeSet>(),
        ]
        .into_iter()
        .flatten()
        {
            self.storages.remove(&id);
        }
    }

    // ==================== Hooks ====================

    /// Run `hook` whenever a tracked `T` is about to be removed.
    pub fn on_lifetime_end<T: Component>(
        &mut self,
        hook: impl Fn(&mut World, &OnLifetimeEnd) + Send + Sync + 'static,
    ) -> ComponentId {
        let id = self.components.register::<T>();
        self.hooks
            .entry(id)
            .or_default()
            .on_lifetime_end
            .push(std::sync::Arc::new(hook));
        id
    }

    /// Run `hook` whenever a tracked `T` comes back while its removal is
    /// still pending.
    pub fn on_lifetime_restart<T: Component>(
        &mut self,
        hook: impl Fn(&mut World, &OnLifetimeRestart) + Send + Sync + 'static,
    ) -> ComponentId {
        let id = self.components.register::<T>();
        self.hooks
            .entry(id)
            .or_default()
            .on_lifetime_restart
            .push(std::sync::Arc::new(hook));
        id
    }

    /// Run `hook` after every [`World::patch`] of a `T`.
    pub fn on_patch<T: Component>(
        &mut self,
        hook: impl Fn(&mut World, Entity) + Send + Sync + 'static,
    ) -> ComponentId {
        let id = self.components.register::<T>();
        self.hooks
            .entry(id)
            .or_default()
            .on_patch
            .push(std::sync::Arc::new(hook));
        id
    }

    // ==================== Resources ====================

    /// Insert a resource, returning the previous value of the same type.
    pub fn insert_resource<R: Resource>(&mut self, value: R) -> Option<R> {
        self.resources.insert(value)
    }

    #[must_use]
    pub fn resource<R: Resource>(&self) -> Option<&R> {
        self.resources.get()
    }

    pub fn resource_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.resources.get_mut()
    }

    pub fn remove_resource<R: Resource>(&mut self) -> Option<R> {
        self.resources.remove()
    }

    #[must_use]
    pub fn has_resource<R: Resource>(&self) -> bool {
        self.resources.contains::<R>()
    }

    /// Take resource `R` out of the world for the duration of `f`.
    ///
    /// While `f` runs the resource is absent from the world. Returns `None`
    /// if there is no such resource.
    pub fn resource_scope<R: Resource, U>(
        &mut self,
        f: impl FnOnce(&mut World, &mut R) -> U,
    ) -> Option<U> {
        let mut value = self.resources.remove::<R>()?;
        let result = f(self, &mut value);
        self.resources.insert(value);
        Some(result)
    }

    // ==================== Internals ====================

    fn is_tracking(&self, id: ComponentId) -> bool {
        self.untracked_depth == 0 && self.components.is_tracked(id)
    }

    fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        let id = self.components.get_id::<T>()?;
        self.storages.get(&id)?.as_any().downcast_ref()
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        let id = self.components.get_id::<T>()?;
        self.storages.get_mut(&id)?.as_any_mut().downcast_mut()
    }

    fn storage_or_init<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        let id = self.components.register::<T>();
        self.storages
            .entry(id)
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut()
    }

    fn marks_mut<M: Component>(&mut self, entity: Entity) -> Option<&mut M> {
        self.storage_mut::<M>()?.get_mut(entity)
    }

    fn marks_or_init<M: Component + Default>(&mut self, entity: Entity) -> Option<&mut M> {
        let storage = self.storage_or_init::<M>()?;
        if storage.get(entity).is_none() {
            storage.insert(entity, M::default());
        }
        storage.get_mut(entity)
    }

    /// A pending creation already covers later changes in the same window.
    fn mark_modified(&mut self, entity: Entity, id: ComponentId) {
        if self
            .lifetimes(entity)
            .is_some_and(|lifetimes| lifetimes.is_created(id))
        {
            return;
        }
        if let Some(modifications) = self.marks_or_init::<ModificationSet>(entity) {
            modifications.add(id);
        }
    }

    fn fire_lifetime_end(&mut self, event: &OnLifetimeEnd) {
        let hooks = self
            .hooks
            .get(&event.component)
            .map(|h| h.on_lifetime_end.clone())
            .unwrap_or_default();
        for hook in hooks {
            hook(self, event);
        }
    }

    fn fire_lifetime_restart(&mut self, event: &OnLifetimeRestart) {
        let hooks = self
            .hooks
            .get(&event.component)
            .map(|h| h.on_lifetime_restart.clone())
            .unwrap_or_default();
        for hook in hooks {
            hook(self, event);
        }
    }
}

/// A plugin that can be added to a World to register components, hooks,
/// and initial state.
///
/// # Example
///
/// ```ignore
/// struct PhysicsPlugin;
///
/// impl Plugin for PhysicsPlugin {
///     fn build(&self, world: &mut World) {
///         world.set_tracked::<Velocity>(true);
///         world.insert_resource(PhysicsConfig::default());
///     }
/// }
///
/// let mut world = World::new();
/// world.add_plugin(PhysicsPlugin);
/// ```
pub trait Plugin {
    /// Build/configure the world with this plugin's components and state.
    fn build(&self, world: &mut World);
}

impl World {
    /// Add a plugin to this world.
    pub fn add_plugin<P: Plugin>(&mut self, plugin: P) -> &mut Self {
        plugin.build(self);
        self
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.entities.alive_count())
            .field("component_types", &self.components.len())
            .field("resources", &self.resources.len())
            .field("tracking", &self.is_tracking_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Health(u32);

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct GameTime {
        tick: u64,
    }

    fn tracked_world() -> (World, ComponentId) {
        let mut world = World::new();
        let id = world.set_tracked::<Health>(true);
        (world, id)
    }

    #[test]
    fn test_spawn_and_get() {
        let mut world = World::new();
        let entity = world.spawn(Position { x: 1.0, y: 2.0 });

        assert!(world.is_alive(entity));
        assert_eq!(world.get::<Position>(entity), Some(Position { x: 1.0, y: 2.0 }));
        assert!(world.has::<Position>(entity));
        assert!(!world.has::<Health>(entity));
    }

    #[test]
    fn test_update_requires_existing_component() {
        let mut world = World::new();
        let entity = world.spawn_empty();

        assert!(!world.update(entity, Health(1)));
        world.insert(entity, Health(1));
        assert!(world.update(entity, Health(2)));
        assert_eq!(world.get::<Health>(entity), Some(Health(2)));
    }

    #[test]
    fn test_despawn_removes_everything() {
        let mut world = World::new();
        let entity = world.spawn(Position { x: 0.0, y: 0.0 });
        world.insert(entity, Health(5));

        assert!(world.despawn(entity));
        assert!(!world.is_alive(entity));
        assert!(!world.has::<Health>(entity));
        assert!(!world.insert(entity, Health(1)));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_untracked_types_leave_no_marks() {
        let mut world = World::new();
        let entity = world.spawn(Position { x: 0.0, y: 0.0 });
        world.update(entity, Position { x: 1.0, y: 0.0 });

        assert!(!world.has_pending_marks());
        assert!(world.modifications(entity).is_none());
    }

    #[test]
    fn test_insert_records_creation_then_modification() {
        let (mut world, id) = tracked_world();
        let entity = world.spawn(Health(10));

        assert!(world.lifetimes(entity).unwrap().is_created(id));
        assert!(world.modified_entities().is_empty());

        world.clear_all_marks();
        world.insert(entity, Health(9));
        assert!(world.modifications(entity).unwrap().contains(id));
        assert_eq!(world.modified_entities(), vec![entity]);
    }

    #[test]
    fn test_pending_creation_absorbs_modification() {
        let (mut world, id) = tracked_world();
        let entity = world.spawn(Health(10));
        world.update(entity, Health(11));

        assert!(world.lifetimes(entity).unwrap().is_created(id));
        assert!(world.modified_entities().is_empty());
    }

    #[test]
    fn test_get_mut_does_not_mark_but_patch_does() {
        let (mut world, id) = tracked_world();
        let entity = world.spawn(Health(10));
        world.clear_all_marks();

        world.get_mut::<Health>(entity).unwrap().0 = 3;
        assert!(!world.has_pending_marks());

        assert!(world.patch::<Health>(entity));
        assert!(world.modifications(entity).unwrap().contains(id));
    }

    #[test]
    fn test_untracked_scope_suppresses_marks() {
        let (mut world, _) = tracked_world();
        let entity = world.untracked(|world| {
            assert!(!world.is_tracking_enabled());
            let entity = world.spawn(Health(1));
            world.update(entity, Health(2));
            entity
        });

        assert!(world.is_tracking_enabled());
        assert!(!world.has_pending_marks());
        assert_eq!(world.get::<Health>(entity), Some(Health(2)));
    }

    #[test]
    fn test_remove_fires_end_hook_with_value_present() {
        let (mut world, id) = tracked_world();
        let seen = Arc::new(AtomicU32::new(0));
        let seen_hook = Arc::clone(&seen);
        world.on_lifetime_end::<Health>(move |world, event| {
            let health = world.get::<Health>(event.entity).unwrap();
            seen_hook.store(health.0, Ordering::SeqCst);
        });

        let entity = world.spawn(Health(42));
        world.clear_all_marks();
        world.update(entity, Health(43));

        assert_eq!(world.remove::<Health>(entity), Some(Health(43)));
        assert_eq!(seen.load(Ordering::SeqCst), 43);

        let lifetimes = world.lifetimes(entity).unwrap();
        assert!(lifetimes.is_destroyed(id));
        assert!(!world.modifications(entity).unwrap().contains(id));
    }

    #[test]
    fn test_reinsert_after_remove_is_a_restart() {
        let (mut world, id) = tracked_world();
        let restarts = Arc::new(AtomicU32::new(0));
        let restarts_hook = Arc::clone(&restarts);
        world.on_lifetime_restart::<Health>(move |_, _| {
            restarts_hook.fetch_add(1, Ordering::SeqCst);
        });

        let entity = world.spawn(Health(1));
        world.clear_all_marks();
        world.remove::<Health>(entity);
        world.insert(entity, Health(2));

        assert_eq!(restarts.load(Ordering::SeqCst), 1);
        let lifetimes = world.lifetimes(entity).unwrap();
        assert!(!lifetimes.is_created(id));
        assert!(!lifetimes.is_destroyed(id));
        assert!(world.modifications(entity).unwrap().contains(id));
    }

    #[test]
    fn test_despawn_runs_no_hooks() {
        let (mut world, _) = tracked_world();
        let ended = Arc::new(AtomicU32::new(0));
        let ended_hook = Arc::clone(&ended);
        world.on_lifetime_end::<Health>(move |_, _| {
            ended_hook.fetch_add(1, Ordering::SeqCst);
        });

        let entity = world.spawn(Health(1));
        world.despawn(entity);
        assert_eq!(ended.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_patch_hook_runs_even_untracked() {
        let mut world = World::new();
        let patched = Arc::new(AtomicU32::new(0));
        let patched_hook = Arc::clone(&patched);
        world.on_patch::<Position>(move |_, _| {
            patched_hook.fetch_add(1, Ordering::SeqCst);
        });

        let entity = world.spawn(Position { x: 0.0, y: 0.0 });
        world.untracked(|world| world.patch::<Position>(entity));
        assert_eq!(patched.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_marks() {
        let (mut world, _) = tracked_world();
        let a = world.spawn(Health(1));
        let b = world.spawn(Health(2));

        world.clear_marks(a);
        assert_eq!(world.lifetime_entities(), vec![b]);

        world.clear_all_marks();
        assert!(!world.has_pending_marks());
        assert!(world.lifetime_entities().is_empty());
    }

    #[test]
    fn test_component_scope_detaches_silently() {
        let (mut world, _) = tracked_world();
        let entity = world.spawn(Health(7));
        world.clear_all_marks();

        let result = world.component_scope::<Health, _>(entity, |world, health| {
            assert!(!world.has::<Health>(entity));
            health.0 += 1;
            health.0
        });

        assert_eq!(result, Some(8));
        assert_eq!(world.get::<Health>(entity), Some(Health(8)));
        assert!(!world.has_pending_marks());
    }

    #[test]
    fn test_resources() {
        let mut world = World::new();
        world.insert_resource(GameTime { tick: 0 });

        world.resource_mut::<GameTime>().unwrap().tick = 5;
        assert_eq!(world.resource::<GameTime>(), Some(&GameTime { tick: 5 }));

        let inner = world.resource_scope::<GameTime, _>(|world, time| {
            assert!(!world.has_resource::<GameTime>());
            time.tick += 1;
            time.tick
        });
        assert_eq!(inner, Some(6));
        assert_eq!(world.remove_resource::<GameTime>(), Some(GameTime { tick: 6 }));
        assert!(world.resource_scope::<GameTime, _>(|_, _| ()).is_none());
    }

    #[test]
    fn test_query_and_entities_with() {
        let mut world = World::new();
        let a = world.spawn(Health(1));
        let _ = world.spawn(Position { x: 0.0, y: 0.0 });
        let c = world.spawn(Health(3));

        let total: u32 = world.query::<Health>().map(|(_, h)| h.0).sum();
        assert_eq!(total, 4);
        assert_eq!(world.entities_with::<Health>(), vec![a, c]);
    }

    #[test]
    fn test_plugin() {
        struct TrackHealth;

        impl Plugin for TrackHealth {
            fn build(&self, world: &mut World) {
                world.set_tracked::<Health>(true);
            }
        }

        let mut world = World::new();
        world.add_plugin(TrackHealth);
        assert!(world.is_tracked::<Health>());
        assert!(!world.is_tracked::<Position>());
    }
}
