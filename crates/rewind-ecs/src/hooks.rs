//! Signals the world raises synchronously for tracked components.
//!
//! Lifetime signals cannot wait for the next event flush: by then the
//! component value they refer to is gone. They are delivered as hooks
//! while the world is still in the middle of the mutation.

use std::sync::Arc;

use crate::{component::ComponentId, entity::Entity, world::World};

/// A tracked component is about to be removed. Its value is still readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnLifetimeEnd {
    pub entity: Entity,
    pub component: ComponentId,
}

/// A tracked component was re-created while its destruction was still
/// pending in the current tracking window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnLifetimeRestart {
    pub entity: Entity,
    pub component: ComponentId,
}

pub type LifetimeEndHook = Arc<dyn Fn(&mut World, &OnLifetimeEnd) + Send + Sync>;
pub type LifetimeRestartHook = Arc<dyn Fn(&mut World, &OnLifetimeRestart) + Send + Sync>;
pub type PatchHook = Arc<dyn Fn(&mut World, Entity) + Send + Sync>;

/// Hooks registered for one component type.
#[derive(Default, Clone)]
pub(crate) struct ComponentHooks {
    pub(crate) on_lifetime_end: Vec<LifetimeEndHook>,
    pub(crate) on_lifetime_restart: Vec<LifetimeRestartHook>,
    pub(crate) on_patch: Vec<PatchHook>,
}
