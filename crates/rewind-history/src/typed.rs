//! Per-entity, per-type history of component values.
//!
//! A [`TypedHistory<T>`] lives on the entity next to the `T` it records and
//! owns one [`SnapshotLog<T>`]. Every committed boundary that touched the
//! component pushes exactly one snapshot, so the per-type cursor moves in
//! lockstep with the global history.
//!
//! While the component is alive its value equals `snapshots[cursor - 1]`.
//! A destruction pushes the value the component had when it was removed, so
//! while it is dead `snapshots[cursor - 1]` is that final value and
//! `snapshots[cursor - 2]` the state committed before the removal. Undoing a
//! destruction restores the latter: an edit made in the same window as the
//! removal was never committed and goes with the entry.

use rewind_ecs::{Component, Entity, World};
use tracing::trace;

use crate::{
    entry::{ActionKind, Direction},
    error::HistoryError,
    snapshot::SnapshotLog,
};

/// Snapshot history of one component type on one entity.
#[derive(Debug, Clone)]
pub struct TypedHistory<T> {
    log: SnapshotLog<T>,
    /// A final value captured at removal sits above the cursor.
    final_pending: bool,
}

impl<T> Default for TypedHistory<T> {
    fn default() -> Self {
        Self {
            log: SnapshotLog::new(),
            final_pending: false,
        }
    }
}

impl<T: Component + Clone> TypedHistory<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn log(&self) -> &SnapshotLog<T> {
        &self.log
    }

    #[must_use]
    pub const fn has_pending_final(&self) -> bool {
        self.final_pending
    }

    /// Record a committed value, discarding any redo states.
    pub fn store(&mut self, value: T) -> bool {
        self.final_pending = false;
        self.log.store(value)
    }

    /// Append a value above the cursor without committing it.
    pub fn store_back(&mut self, value: T) -> bool {
        self.log.store_back(value)
    }

    /// Remove the most recently appended value.
    pub fn truncate_back(&mut self, update_cursor: bool) -> bool {
        self.log.pop_back(update_cursor).is_some()
    }

    // ==================== Replay ====================

    /// Step back one committed state and write it into the live component.
    ///
    /// Declines to leave the live cursor while the component carries an
    /// uncommitted modification.
    pub fn undo(&mut self, world: &mut World, entity: Entity) -> Result<(), HistoryError> {
        Self::require_present(world, entity)?;
        if self.log.cursor() < 2 {
            return Err(HistoryError::CursorViolation("no earlier state to restore"));
        }

        let dirty = world.component_id::<T>().is_some_and(|id| {
            world
                .modifications(entity)
                .is_some_and(|modifications| modifications.contains(id))
        });
        if !self.log.undo(|_| {}, || !dirty) {
            return Err(HistoryError::CursorViolation("undo declined"));
        }

        let restored = self
            .log
            .cursor()
            .checked_sub(1)
            .and_then(|index| self.log.get_snapshot(index))
            .ok_or(HistoryError::CursorViolation("undo"))?;
        Self::write_back(world, entity, restored)
    }

    /// Step forward one committed state and write it into the live component.
    pub fn redo(&mut self, world: &mut World, entity: Entity) -> Result<(), HistoryError> {
        Self::require_present(world, entity)?;

        let index = self.log.cursor();
        if !self.log.redo(|_| {}, || true) {
            return Err(HistoryError::CursorViolation("redo"));
        }

        let restored = self
            .log
            .get_snapshot(index)
            .ok_or(HistoryError::CursorViolation("redo"))?;
        Self::write_back(world, entity, restored)
    }

    /// Bring the component back as its next life begins (redo of a creation).
    pub fn revive(&mut self, world: &mut World, entity: Entity) -> Result<(), HistoryError> {
        Self::require_absent(world, entity)?;

        let index = self.log.cursor();
        if !self.log.redo(|_| {}, || true) {
            return Err(HistoryError::CursorViolation("revive"));
        }

        let value = self
            .log
            .get_snapshot(index)
            .cloned()
            .ok_or(HistoryError::CursorViolation("revive"))?;
        Self::reattach(world, entity, value);
        Ok(())
    }

    /// Remove the component as if it was never created (undo of a creation).
    pub fn retire(&mut self, world: &mut World, entity: Entity) -> Result<(), HistoryError> {
        Self::require_present(world, entity)?;
        if !self.log.can_undo() {
            return Err(HistoryError::CursorViolation("retire"));
        }

        world.remove::<T>(entity);
        self.log.undo(|_| {}, || true);
        Ok(())
    }

    /// Bring the component back with the state committed before its removal
    /// (undo of a destruction).
    pub fn reinstate(&mut self, world: &mut World, entity: Entity) -> Result<(), HistoryError> {
        Self::require_absent(world, entity)?;
        if self.log.cursor() < 2 {
            return Err(HistoryError::CursorViolation("no state to reinstate"));
        }

        self.log.undo(|_| {}, || true);
        let value = self
            .log
            .cursor()
            .checked_sub(1)
            .and_then(|index| self.log.get_snapshot(index))
            .cloned()
            .ok_or(HistoryError::CursorViolation("reinstate"))?;
        Self::reattach(world, entity, value);
        Ok(())
    }

    /// Remove the component again (redo of a destruction).
    pub fn dismiss(&mut self, world: &mut World, entity: Entity) -> Result<(), HistoryError> {
        Self::require_present(world, entity)?;
        if !self.log.redo(|_| {}, || true) {
            return Err(HistoryError::CursorViolation("dismiss"));
        }

        world.remove::<T>(entity);
        Ok(())
    }

    /// Apply one action of the given kind in the given direction.
    pub fn replay(
        &mut self,
        world: &mut World,
        entity: Entity,
        kind: ActionKind,
        direction: Direction,
    ) -> Result<(), HistoryError> {
        trace!(%entity, ?kind, ?direction, component = std::any::type_name::<T>(), "replay");
        match (kind, direction) {
            (ActionKind::Modifications, Direction::Undo) => self.undo(world, entity),
            (ActionKind::Modifications, Direction::Redo) => self.redo(world, entity),
            (ActionKind::Creations, Direction::Undo) => self.retire(world, entity),
            (ActionKind::Creations, Direction::Redo) => self.revive(world, entity),
            (ActionKind::Destructions, Direction::Undo) => self.reinstate(world, entity),
            (ActionKind::Destructions, Direction::Redo) => self.dismiss(world, entity),
        }
    }

    // ==================== Lifetime ====================

    /// Capture the value a component had when it was removed.
    ///
    /// Nothing is captured for a component that was never committed. A
    /// removal after undos abandons the redo states.
    pub fn end_lifetime(&mut self, final_value: T) -> bool {
        if self.final_pending || self.log.has_default_cursor() {
            return false;
        }
        if !self.log.has_live_value_cursor() {
            self.log.truncate();
        }

        self.final_pending = self.log.store_back(final_value);
        self.final_pending
    }

    /// Forget the captured final value; the component came back before the
    /// boundary.
    pub fn restart_lifetime(&mut self) -> bool {
        if !self.final_pending {
            return false;
        }
        self.final_pending = false;
        self.truncate_back(false)
    }

    /// Commit a destruction at the boundary: the captured final value becomes
    /// the newest snapshot. Earlier committed states are left untouched.
    pub fn seal_lifetime_end(&mut self) -> bool {
        if !self.final_pending {
            return false;
        }
        self.final_pending = false;
        self.log.redo(|_| {}, || true)
    }

    // ==================== Helpers ====================

    fn require_present(world: &World, entity: Entity) -> Result<(), HistoryError> {
        if world.has::<T>(entity) {
            Ok(())
        } else {
            Err(HistoryError::ComponentMissing {
                entity,
                component: std::any::type_name::<T>(),
            })
        }
    }

    fn require_absent(world: &World, entity: Entity) -> Result<(), HistoryError> {
        if world.has::<T>(entity) {
            Err(HistoryError::ComponentMissing {
                entity,
                component: std::any::type_name::<T>(),
            })
        } else {
            Ok(())
        }
    }

    fn write_back(world: &mut World, entity: Entity, value: &T) -> Result<(), HistoryError> {
        let Some(slot) = world.get_mut::<T>(entity) else {
            return Err(HistoryError::ComponentMissing {
                entity,
                component: std::any::type_name::<T>(),
            });
        };
        slot.clone_from(value);
        world.patch::<T>(entity);
        Ok(())
    }

    fn reattach(world: &mut World, entity: Entity, value: T) {
        world.insert(entity, value);
        world.patch::<T>(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Health(u32);

    fn committed(values: &[u32]) -> TypedHistory<Health> {
        let mut history = TypedHistory::new();
        for &value in values {
            history.store(Health(value));
        }
        history
    }

    fn values(history: &TypedHistory<Health>) -> Vec<u32> {
        history.log().iter().map(|h| h.0).collect()
    }

    #[test]
    fn test_undo_redo_modifications() {
        let mut world = World::new();
        let entity = world.spawn(Health(3));
        let mut history = committed(&[1, 2, 3]);

        history.undo(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(2)));
        history.undo(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(1)));
        assert!(history.undo(&mut world, entity).is_err());

        history.redo(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(2)));
        history.redo(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(3)));
        assert!(history.redo(&mut world, entity).is_err());
    }

    #[test]
    fn test_undo_declines_with_uncommitted_change() {
        let mut world = World::new();
        world.set_tracked::<Health>(true);
        let entity = world.spawn(Health(2));
        world.clear_all_marks();
        world.update(entity, Health(5));

        let mut history = committed(&[1, 2]);
        assert_eq!(
            history.undo(&mut world, entity),
            Err(HistoryError::CursorViolation("undo declined"))
        );
        assert!(history.log().has_live_value_cursor());
        assert_eq!(world.get::<Health>(entity), Some(Health(5)));
    }

    #[test]
    fn test_retire_and_revive() {
        let mut world = World::new();
        let entity = world.spawn(Health(7));
        let mut history = committed(&[7]);

        history.retire(&mut world, entity).unwrap();
        assert!(!world.has::<Health>(entity));
        assert!(history.log().has_default_cursor());

        history.revive(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(7)));
        assert!(history.log().has_live_value_cursor());

        // Reviving twice is refused
        assert!(history.revive(&mut world, entity).is_err());
    }

    #[test]
    fn test_final_value_capture_and_seal() {
        let mut history = committed(&[1, 2]);

        assert!(history.end_lifetime(Health(9)));
        assert!(history.has_pending_final());
        assert_eq!(history.log().cursor(), 2);

        assert!(history.seal_lifetime_end());
        assert_eq!(values(&history), vec![1, 2, 9]);
        assert_eq!(history.log().cursor(), 3);
        assert!(!history.has_pending_final());
    }

    #[test]
    fn test_restart_drops_captured_final() {
        let mut history = committed(&[1, 2]);
        history.end_lifetime(Health(9));

        assert!(history.restart_lifetime());
        assert_eq!(values(&history), vec![1, 2]);
        assert!(history.log().has_live_value_cursor());
        assert!(!history.seal_lifetime_end());
    }

    #[test]
    fn test_end_lifetime_without_committed_state() {
        let mut history = TypedHistory::<Health>::new();
        assert!(!history.end_lifetime(Health(1)));
        assert!(history.log().is_empty());
    }

    #[test]
    fn test_end_lifetime_after_undo_abandons_redo() {
        let mut world = World::new();
        let entity = world.spawn(Health(3));
        let mut history = committed(&[1, 2, 3]);
        history.undo(&mut world, entity).unwrap();

        assert!(history.end_lifetime(Health(2)));
        assert!(history.seal_lifetime_end());
        assert_eq!(values(&history), vec![1, 2, 2]);
    }

    #[test]
    fn test_reinstate_and_dismiss() {
        let mut world = World::new();
        let entity = world.spawn_empty();
        let mut history = committed(&[4, 5]);
        history.end_lifetime(Health(6));
        history.seal_lifetime_end();

        history.reinstate(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(5)));
        assert_eq!(history.log().cursor(), 2);

        history.undo(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(4)));
        history.redo(&mut world, entity).unwrap();

        history.dismiss(&mut world, entity).unwrap();
        assert!(!world.has::<Health>(entity));
        assert!(history.dismiss(&mut world, entity).is_err());
    }

    #[test]
    fn test_edit_before_removal_leaves_committed_states() {
        let mut world = World::new();
        let entity = world.spawn_empty();
        let mut history = committed(&[5]);
        history.end_lifetime(Health(6));
        history.seal_lifetime_end();
        assert_eq!(values(&history), vec![5, 6]);

        history.reinstate(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(5)));

        history.retire(&mut world, entity).unwrap();
        history.revive(&mut world, entity).unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(5)));
    }

    #[test]
    fn test_new_life_keeps_previous_final() {
        let mut world = World::new();
        let entity = world.spawn_empty();
        let mut history = committed(&[1]);
        history.end_lifetime(Health(1));
        history.seal_lifetime_end();

        // Second life
        history.store(Health(20));
        world.insert(entity, Health(20));

        history
            .replay(&mut world, entity, ActionKind::Creations, Direction::Undo)
            .unwrap();
        assert!(!world.has::<Health>(entity));

        history
            .replay(&mut world, entity, ActionKind::Destructions, Direction::Undo)
            .unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(1)));

        history
            .replay(&mut world, entity, ActionKind::Destructions, Direction::Redo)
            .unwrap();
        history
            .replay(&mut world, entity, ActionKind::Creations, Direction::Redo)
            .unwrap();
        assert_eq!(world.get::<Health>(entity), Some(Health(20)));
    }
}
