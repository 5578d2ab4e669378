//! Per-entity change marks accumulated between two tracking boundaries.
//!
//! Both sets are stored as ordinary (untracked) components on the entity
//! they describe. They keep their ids sorted so that draining them yields a
//! deterministic order regardless of the order in which marks were added.

use smallvec::SmallVec;

use crate::component::ComponentId;

type IdSet = SmallVec<[ComponentId; 4]>;

/// Insert `id` keeping the set sorted. Returns `false` if already present.
fn insert_sorted(set: &mut IdSet, id: ComponentId) -> bool {
    match set.binary_search(&id) {
        Ok(_) => false,
        Err(pos) => {
            set.insert(pos, id);
            true
        }
    }
}

fn remove_sorted(set: &mut IdSet, id: ComponentId) -> bool {
    match set.binary_search(&id) {
        Ok(pos) => {
            set.remove(pos);
            true
        }
        Err(_) => false,
    }
}

/// Component types of one entity modified since the last boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationSet {
    ids: IdSet,
}

impl ModificationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `id` as modified. Returns `false` if it already was.
    pub fn add(&mut self, id: ComponentId) -> bool {
        insert_sorted(&mut self.ids, id)
    }

    /// Unflag `id`. Returns `false` if it was not flagged.
    pub fn remove(&mut self, id: ComponentId) -> bool {
        remove_sorted(&mut self.ids, id)
    }

    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Flagged ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Component types of one entity created or destroyed since the last boundary.
///
/// A type is never in both sets: creating a type with a pending destruction
/// (or the reverse) cancels the pending mark instead of recording a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifetimeSet {
    created: IdSet,
    destroyed: IdSet,
}

impl LifetimeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a creation of `id`.
    ///
    /// Returns `false` when this cancelled a pending destruction, or when the
    /// creation was already recorded.
    pub fn add_created(&mut self, id: ComponentId) -> bool {
        if remove_sorted(&mut self.destroyed, id) {
            return false;
        }
        insert_sorted(&mut self.created, id)
    }

    /// Record a destruction of `id`.
    ///
    /// Returns `false` when this cancelled a pending creation, or when the
    /// destruction was already recorded.
    pub fn add_destroyed(&mut self, id: ComponentId) -> bool {
        if remove_sorted(&mut self.created, id) {
            return false;
        }
        insert_sorted(&mut self.destroyed, id)
    }

    #[must_use]
    pub fn is_created(&self, id: ComponentId) -> bool {
        self.created.binary_search(&id).is_ok()
    }

    #[must_use]
    pub fn is_destroyed(&self, id: ComponentId) -> bool {
        self.destroyed.binary_search(&id).is_ok()
    }

    /// Created ids in ascending order.
    pub fn created(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.created.iter().copied()
    }

    /// Destroyed ids in ascending order.
    pub fn destroyed(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.destroyed.iter().copied()
    }

    /// Clear both sets together.
    pub fn clear(&mut self) {
        self.created.clear();
        self.destroyed.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty()
    }
}
