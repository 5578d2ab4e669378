#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_fields_in_debug)]

//! # rewind-history
//!
//! Undo/redo and delta tracking for a [`rewind_ecs::World`].
//!
//! This crate provides:
//! - [`SnapshotLog`]: a cursor-addressed log of values with undo/redo
//! - [`TypedHistory`]: the snapshot history of one component on one entity
//! - [`HistoryCoordinator`]: turns per-entity change marks into one
//!   [`HistoryEntry`] per boundary and replays entries on undo/redo
//! - [`HistoryPlugin`]: hooks the coordinator up to the event bus
//!
//! # Design
//!
//! Tracked component types leave marks on the entity whenever they are
//! created, modified or destroyed. At each boundary the coordinator drains
//! those marks: every flagged component gets its current value stored in its
//! [`TypedHistory`], and the ids of everything that changed are committed as
//! one entry to the global log. Undo and redo walk that global log and let
//! each touched component step its own history back or forth.
//!
//! # Example
//!
//! ```ignore
//! use rewind_ecs::World;
//! use rewind_history::prelude::*;
//!
//! let mut world = World::new();
//! world.add_plugin(HistoryPlugin::default());
//! world.track_history::<Position>();
//!
//! let e = world.spawn(Position { x: 0.0, y: 0.0 });
//! world.history_boundary(now_millis());
//!
//! world.update(e, Position { x: 5.0, y: 0.0 });
//! world.history_boundary(now_millis());
//!
//! world.history_undo(); // back to x = 0.0
//! world.history_redo(); // forward to x = 5.0
//! ```

mod config;
mod coordinator;
mod descriptor;
mod entry;
mod error;
mod events;
mod plugin;
mod snapshot;
mod typed;

pub use config::{DEFAULT_MAX_ENTRIES, HistoryConfig};
pub use coordinator::{BoundaryState, HistoryCoordinator};
pub use descriptor::{DescriptorRegistry, ErasedValue, TypeDescriptor, TypedDescriptor};
pub use entry::{Action, ActionKind, Direction, HistoryEntry, now_millis};
pub use error::HistoryError;
pub use events::{OnDeltaSnapshot, RedoCommand, StoreSnapshotCommand, UndoCommand};
pub use plugin::{HistoryPlugin, HistoryWorldExt};
pub use snapshot::SnapshotLog;
pub use typed::TypedHistory;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        HistoryConfig, HistoryCoordinator, HistoryEntry, HistoryPlugin, HistoryWorldExt,
        OnDeltaSnapshot, RedoCommand, SnapshotLog, StoreSnapshotCommand, UndoCommand, now_millis,
    };
}
