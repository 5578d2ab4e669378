//! Wiring between the world, its event bus, and the history coordinator.

use rewind_ecs::{Component, ComponentId, Entity, Plugin, World};
use rewind_event::{EventWorldExt, ObserverId};
use tracing::debug;

use crate::{
    config::HistoryConfig,
    coordinator::HistoryCoordinator,
    entry::HistoryEntry,
    events::{OnDeltaSnapshot, RedoCommand, StoreSnapshotCommand, UndoCommand},
    typed::TypedHistory,
};

/// Installs the history coordinator and its event observers.
///
/// # Example
///
/// ```ignore
/// let mut world = World::new();
/// world.add_plugin(HistoryPlugin::default());
/// world.track_history::<Position>();
///
/// world.send(OnDeltaSnapshot { timestamp: now_millis() });
/// world.send(UndoCommand);
/// world.flush_events();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryPlugin {
    pub config: HistoryConfig,
}

impl HistoryPlugin {
    #[must_use]
    pub const fn new(config: HistoryConfig) -> Self {
        Self { config }
    }
}

/// Observers installed by [`HistoryPlugin`]; present once they exist.
#[derive(Debug)]
struct HistoryObservers([ObserverId; 4]);

impl Plugin for HistoryPlugin {
    fn build(&self, world: &mut World) {
        world.init_events();

        match world.resource_mut::<HistoryCoordinator>() {
            Some(coordinator) => coordinator.set_config(self.config),
            None => {
                world.insert_resource(HistoryCoordinator::new(self.config));
            }
        }

        if world.has_resource::<HistoryObservers>() {
            debug!("history observers already installed");
            return;
        }
        let observers = [
            world.observe(|world: &mut World, event: &OnDeltaSnapshot| {
                world.history_boundary(event.timestamp);
            }),
            world.observe(|world: &mut World, _: &UndoCommand| {
                world.history_undo();
            }),
            world.observe(|world: &mut World, _: &RedoCommand| {
                world.history_redo();
            }),
            world.observe(|world: &mut World, command: &StoreSnapshotCommand| {
                world.history_store(command.entry.clone());
            }),
        ];
        world.insert_resource(HistoryObservers(observers));
    }
}

/// Extension trait for World to drive history directly.
pub trait HistoryWorldExt {
    /// Record history for `T`: mark it tracked, register its descriptor and
    /// install its lifetime hooks. Idempotent.
    ///
    /// Components of type `T` that already exist get their current value as
    /// the baseline, so the first recorded change to them can be undone.
    fn track_history<T: Component + Clone>(&mut self) -> ComponentId;

    /// Run a tracking boundary. Returns `true` if an entry was committed.
    fn history_boundary(&mut self, timestamp: u64) -> bool;

    fn history_undo(&mut self) -> bool;

    fn history_redo(&mut self) -> bool;

    fn history_store(&mut self, entry: HistoryEntry) -> bool;

    /// Run `f` with the coordinator taken out of the world.
    fn with_history<U>(&mut self, f: impl FnOnce(&mut World, &mut HistoryCoordinator) -> U)
    -> Option<U>;

    fn history(&self) -> Option<&HistoryCoordinator>;
}

impl HistoryWorldExt for World {
    fn track_history<T: Component + Clone>(&mut self) -> ComponentId {
        let id = self.set_tracked::<T>(true);
        if !self.has_resource::<HistoryCoordinator>() {
            self.insert_resource(HistoryCoordinator::default());
        }
        if self.history().is_some_and(|h| h.registry().contains(id)) {
            return id;
        }

        self.with_history(|world, history| history.register::<T>(world));
        install_lifetime_hooks::<T>(self);
        seed_baselines::<T>(self, id);
        debug!(component = std::any::type_name::<T>(), %id, "tracking history");
        id
    }

    fn history_boundary(&mut self, timestamp: u64) -> bool {
        self.with_history(|world, history| history.on_delta_snapshot(world, timestamp))
            .unwrap_or(false)
    }

    fn history_undo(&mut self) -> bool {
        self.with_history(|world, history| history.undo(world))
            .unwrap_or(false)
    }

    fn history_redo(&mut self) -> bool {
        self.with_history(|world, history| history.redo(world))
            .unwrap_or(false)
    }

    fn history_store(&mut self, entry: HistoryEntry) -> bool {
        self.with_history(|_, history| history.store_snapshot(entry))
            .unwrap_or(false)
    }

    fn with_history<U>(
        &mut self,
        f: impl FnOnce(&mut World, &mut HistoryCoordinator) -> U,
    ) -> Option<U> {
        self.resource_scope::<HistoryCoordinator, U>(f)
    }

    fn history(&self) -> Option<&HistoryCoordinator> {
        self.resource::<HistoryCoordinator>()
    }
}

fn seed_baselines<T: Component + Clone>(world: &mut World, id: ComponentId) {
    let existing: Vec<(Entity, T)> = world
        .query::<T>()
        .filter(|&(entity, _)| {
            !world.has::<TypedHistory<T>>(entity)
                && !world
                    .lifetimes(entity)
                    .is_some_and(|lifetimes| lifetimes.is_created(id))
        })
        .map(|(entity, value)| (entity, value.clone()))
        .collect();

    if !existing.is_empty() {
        debug!(
            component = std::any::type_name::<T>(),
            count = existing.len(),
            "seeding history baselines"
        );
    }
    for (entity, value) in existing {
        let mut history = TypedHistory::new();
        history.store(value);
        world.insert(entity, history);
    }
}

/// Capture final values on removal and drop them again on restart.
fn install_lifetime_hooks<T: Component + Clone>(world: &mut World) {
    world.on_lifetime_end::<T>(|world, event| {
        // Not committed yet: the creation and destruction cancel out
        if world
            .lifetimes(event.entity)
            .is_some_and(|lifetimes| lifetimes.is_created(event.component))
        {
            return;
        }
        let Some(final_value) = world.get::<T>(event.entity) else {
            return;
        };
        world.component_scope::<TypedHistory<T>, _>(event.entity, |_, history| {
            history.end_lifetime(final_value)
        });
    });

    world.on_lifetime_restart::<T>(|world, event| {
        world.component_scope::<TypedHistory<T>, _>(event.entity, |_, history| {
            history.restart_lifetime()
        });
    });
}
