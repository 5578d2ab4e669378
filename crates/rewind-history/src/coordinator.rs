//! The history coordinator - turns change marks into history entries and
//! replays them.
//!
//! # Boundary
//!
//! ```text
//!   Idle ──on_delta_snapshot──▶ Draining ──▶ Committing ──▶ Idle
//!            (scan marks, store snapshots)   (push entry, trim)
//! ```
//!
//! One boundary drains every entity's [`ModificationSet`] and
//! [`LifetimeSet`] into a single [`HistoryEntry`] and stores it in the global
//! log. Undo and redo take an entry back out of that log and replay its
//! actions, in stored order, with change tracking suspended.
//!
//! [`ModificationSet`]: rewind_ecs::ModificationSet
//! [`LifetimeSet`]: rewind_ecs::LifetimeSet

use rewind_ecs::{Component, ComponentId, Entity, World};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{
    config::HistoryConfig,
    descriptor::{DescriptorRegistry, TypeDescriptor},
    entry::{ActionKind, Direction, HistoryEntry, now_millis},
    snapshot::SnapshotLog,
};

type Ids = SmallVec<[ComponentId; 8]>;

/// Where the coordinator is within a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryState {
    #[default]
    Idle,
    Draining,
    Committing,
}

/// Owner of the global history log. Lives in the world as a resource.
#[derive(Debug, Default)]
pub struct HistoryCoordinator {
    log: SnapshotLog<HistoryEntry>,
    registry: DescriptorRegistry,
    config: HistoryConfig,
    state: BoundaryState,
}

impl HistoryCoordinator {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Replace the configuration. A smaller capacity applies at the next commit.
    pub fn set_config(&mut self, config: HistoryConfig) {
        self.config = config;
    }

    #[must_use]
    pub const fn state(&self) -> BoundaryState {
        self.state
    }

    /// The global log of committed entries.
    #[must_use]
    pub const fn log(&self) -> &SnapshotLog<HistoryEntry> {
        &self.log
    }

    #[must_use]
    pub const fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    /// Make `T` resolvable by the coordinator.
    pub fn register<T: Component + Clone>(&mut self, world: &mut World) -> ComponentId {
        self.registry.register::<T>(world)
    }

    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    // ==================== Boundary ====================

    /// Drain all change marks into one entry and commit it.
    ///
    /// Returns `true` if an entry was committed. Boundaries without any
    /// recordable change commit nothing.
    pub fn on_delta_snapshot(&mut self, world: &mut World, timestamp: u64) -> bool {
        self.state = BoundaryState::Draining;
        let mut entry = HistoryEntry::new(timestamp);

        for entity in world.modified_entities() {
            let flagged: Ids = world
                .modifications(entity)
                .map(|set| set.iter().collect())
                .unwrap_or_default();

            let stored = flagged
                .into_iter()
                .filter(|&id| {
                    self.resolve_or_warn(id, entity)
                        .is_some_and(|descriptor| Self::store_modified(descriptor, world, entity))
                })
                .collect();
            entry.push(ActionKind::Modifications, entity, stored);
        }

        for entity in world.lifetime_entities() {
            let (created, destroyed): (Ids, Ids) = world
                .lifetimes(entity)
                .map(|set| (set.created().collect(), set.destroyed().collect()))
                .unwrap_or_default();

            let creations = created
                .into_iter()
                .filter(|&id| {
                    self.resolve_or_warn(id, entity)
                        .is_some_and(|descriptor| descriptor.store_current(world, entity))
                })
                .collect();
            entry.push(ActionKind::Creations, entity, creations);

            let destructions = destroyed
                .into_iter()
                .filter(|&id| {
                    self.resolve_or_warn(id, entity)
                        .is_some_and(|descriptor| descriptor.seal_destruction(world, entity))
                })
                .collect();
            entry.push(ActionKind::Destructions, entity, destructions);
        }

        world.clear_all_marks();

        self.state = BoundaryState::Committing;
        let committed = !entry.is_empty() && self.commit(entry);
        self.state = BoundaryState::Idle;
        committed
    }

    /// Record a modified value. A component whose creation was never
    /// recorded (inserted untracked) only gets a baseline; there is no earlier
    /// state to return to, so no action is recorded for it.
    fn store_modified(descriptor: &dyn TypeDescriptor, world: &mut World, entity: Entity) -> bool {
        let has_history = descriptor.has_history(world, entity);
        let stored = descriptor.store_current(world, entity);
        if stored && !has_history {
            debug!(
                %entity,
                component = descriptor.name(),
                "recorded baseline for untracked component"
            );
        }
        stored && has_history
    }

    /// Store an externally assembled entry as the newest history step.
    pub fn store_snapshot(&mut self, entry: HistoryEntry) -> bool {
        self.commit(entry)
    }

    fn commit(&mut self, entry: HistoryEntry) -> bool {
        debug!(
            timestamp = entry.timestamp,
            actions = entry.actions.len(),
            "committing history entry"
        );
        if !self.log.store(entry) {
            return false;
        }

        let max = self.config.max_entries;
        if max > 0 && self.log.len() > max {
            let dropped = self.log.trim_front(self.log.len() - max);
            trace!(dropped, "trimmed oldest history entries");
        }
        true
    }

    // ==================== Undo / Redo ====================

    /// Revert the newest committed entry.
    ///
    /// Pending marks are committed first when `commit_before_undo` is set.
    /// Otherwise undo refuses to leave the live state while marks are pending.
    pub fn undo(&mut self, world: &mut World) -> bool {
        if self.config.commit_before_undo && world.has_pending_marks() {
            self.on_delta_snapshot(world, now_millis());
        }

        let pending = world.has_pending_marks();
        let mut delivered = None;
        if !self.log.undo(|entry| delivered = Some(entry.clone()), || !pending) {
            debug!(pending, "nothing to undo");
            return false;
        }

        match delivered {
            Some(entry) => {
                self.replay(world, &entry, Direction::Undo);
                true
            }
            None => false,
        }
    }

    /// Re-apply the entry after the cursor.
    ///
    /// Pending marks are changes made after an undo: they are committed when
    /// `commit_before_undo` is set, which discards the redo states. Otherwise
    /// redo refuses to overwrite them.
    pub fn redo(&mut self, world: &mut World) -> bool {
        if world.has_pending_marks() {
            if !self.config.commit_before_undo {
                debug!("pending changes, redo declined");
                return false;
            }
            self.on_delta_snapshot(world, now_millis());
        }

        let mut delivered = None;
        if !self.log.redo(|entry| delivered = Some(entry.clone()), || true) {
            debug!("nothing to redo");
            return false;
        }

        match delivered {
            Some(entry) => {
                self.replay(world, &entry, Direction::Redo);
                true
            }
            None => false,
        }
    }

    fn replay(&self, world: &mut World, entry: &HistoryEntry, direction: Direction) {
        debug!(timestamp = entry.timestamp, ?direction, "replaying history entry");

        world.untracked(|world| {
            for action in &entry.actions {
                let entity = action.entity();
                if !world.is_alive(entity) {
                    debug!(%entity, "skipping action for dead entity");
                    continue;
                }

                for &id in action.components() {
                    let Some(descriptor) = self.resolve_or_warn(id, entity) else {
                        continue;
                    };
                    if let Err(err) = descriptor.replay(world, entity, action.kind(), direction) {
                        debug!(%entity, component = descriptor.name(), %err, "replay skipped");
                    }
                }
            }
        });
    }

    fn resolve_or_warn(&self, id: ComponentId, entity: Entity) -> Option<&dyn TypeDescriptor> {
        match self.registry.try_resolve(id) {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                warn!(%entity, %err, "skipping component");
                None
            }
        }
    }
}
