//! History entries - one per tracking boundary.

use std::time::{SystemTime, UNIX_EPOCH};

use rewind_ecs::{ComponentId, Entity};
use serde::{Deserialize, Serialize};

/// Get current Unix timestamp in milliseconds.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Which lifetime category an [`Action`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Modifications,
    Creations,
    Destructions,
}

/// Direction of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Undo,
    Redo,
}

/// Changes to one entity in one category, component ids ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Modifications {
        entity: Entity,
        components: Vec<ComponentId>,
    },
    Creations {
        entity: Entity,
        components: Vec<ComponentId>,
    },
    Destructions {
        entity: Entity,
        components: Vec<ComponentId>,
    },
}

impl Action {
    #[must_use]
    pub fn new(kind: ActionKind, entity: Entity, components: Vec<ComponentId>) -> Self {
        match kind {
            ActionKind::Modifications => Self::Modifications { entity, components },
            ActionKind::Creations => Self::Creations { entity, components },
            ActionKind::Destructions => Self::Destructions { entity, components },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Modifications { .. } => ActionKind::Modifications,
            Self::Creations { .. } => ActionKind::Creations,
            Self::Destructions { .. } => ActionKind::Destructions,
        }
    }

    #[must_use]
    pub const fn entity(&self) -> Entity {
        match self {
            Self::Modifications { entity, .. }
            | Self::Creations { entity, .. }
            | Self::Destructions { entity, .. } => *entity,
        }
    }

    #[must_use]
    pub fn components(&self) -> &[ComponentId] {
        match self {
            Self::Modifications { components, .. }
            | Self::Creations { components, .. }
            | Self::Destructions { components, .. } => components,
        }
    }
}

/// Everything that changed between two boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    pub actions: Vec<Action>,
}

impl HistoryEntry {
    #[must_use]
    pub const fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            actions: Vec::new(),
        }
    }

    /// Append an action unless it names no components.
    pub fn push(&mut self, kind: ActionKind, entity: Entity, components: Vec<ComponentId>) {
        if !components.is_empty() {
            self.actions.push(Action::new(kind, entity, components));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions of one category.
    pub fn actions_of(&self, kind: ActionKind) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.kind() == kind)
    }

    /// Render as JSON for logs and debugging.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_ecs::Generation;

    fn entity(id: u32) -> Entity {
        Entity::new(id, Generation::new())
    }

    #[test]
    fn test_push_skips_empty_actions() {
        let mut entry = HistoryEntry::new(1);
        entry.push(ActionKind::Creations, entity(0), Vec::new());
        assert!(entry.is_empty());

        entry.push(
            ActionKind::Modifications,
            entity(0),
            vec![ComponentId::from_raw(2)],
        );
        assert_eq!(entry.actions.len(), 1);
        assert_eq!(entry.actions[0].kind(), ActionKind::Modifications);
        assert_eq!(entry.actions[0].entity(), entity(0));
        assert_eq!(entry.actions[0].components(), &[ComponentId::from_raw(2)]);
    }

    #[test]
    fn test_actions_of() {
        let mut entry = HistoryEntry::new(1);
        entry.push(ActionKind::Creations, entity(0), vec![ComponentId::from_raw(1)]);
        entry.push(ActionKind::Destructions, entity(1), vec![ComponentId::from_raw(1)]);
        entry.push(ActionKind::Creations, entity(2), vec![ComponentId::from_raw(1)]);

        assert_eq!(entry.actions_of(ActionKind::Creations).count(), 2);
        assert_eq!(entry.actions_of(ActionKind::Modifications).count(), 0);
    }

    #[test]
    fn test_json_shape() {
        let mut entry = HistoryEntry::new(42);
        entry.push(ActionKind::Destructions, entity(5), vec![ComponentId::from_raw(3)]);

        let json = entry.to_json().unwrap();
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["actions"][0]["kind"], "destructions");
        assert_eq!(json["actions"][0]["components"][0], 3);
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2020-01-01 in millis
        assert!(now_millis() > 1_577_836_800_000);
    }
}
