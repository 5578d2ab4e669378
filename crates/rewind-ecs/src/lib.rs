#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_fields_in_debug)]

//! Rewind ECS - sparse-set Entity Component System with change tracking
//!
//! # Key Concepts
//!
//! - **Entity**: A generational identifier for a game object
//! - **Component**: Data attached to entities (e.g., Position, Health)
//! - **Resource**: Global state stored once per world, keyed by type
//! - **Tracked component**: A type whose mutations leave change marks
//!
//! # Change marks
//!
//! Every entity may carry two mark sets between tracking boundaries:
//!
//! - [`ModificationSet`] - tracked types modified in place
//! - [`LifetimeSet`] - tracked types created or destroyed
//!
//! ```ignore
//! let mut world = World::new();
//! world.set_tracked::<Health>(true);
//!
//! let e = world.spawn(Health(20));     // creation mark
//! world.clear_all_marks();
//! world.update(e, Health(19));         // modification mark
//! assert_eq!(world.modified_entities(), vec![e]);
//! ```
//!
//! Lifetime changes additionally run hooks synchronously
//! ([`World::on_lifetime_end`], [`World::on_lifetime_restart`]) so that
//! observers can capture a value before it disappears.

mod component;
mod entity;
mod hooks;
mod resource;
mod storage;
mod tracking;
mod world;

pub use component::{Component, ComponentId, ComponentInfo, ComponentRegistry, short_type_name};
pub use entity::{Entity, EntityAllocator, EntityId, Generation};
pub use hooks::{
    LifetimeEndHook, LifetimeRestartHook, OnLifetimeEnd, OnLifetimeRestart, PatchHook,
};
pub use resource::{Resource, Resources};
pub use storage::{ComponentStorage, ErasedStorage};
pub use tracking::{LifetimeSet, ModificationSet};
pub use world::{Plugin, World};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Component, ComponentId, Entity, LifetimeSet, ModificationSet, OnLifetimeEnd,
        OnLifetimeRestart, Plugin, World,
    };
}
