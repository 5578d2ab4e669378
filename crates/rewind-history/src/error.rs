//! Error types for history replay.

use rewind_ecs::{ComponentId, Entity};
use thiserror::Error;

/// Errors that can occur while replaying history.
///
/// Command handlers never surface these to callers; they are logged and the
/// affected action is skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Component type id has no registered descriptor.
    #[error("Unresolved component type: {0}")]
    Unresolved(ComponentId),

    /// Entity has no history for the component type yet.
    #[error("No history for {component} on entity {entity}")]
    MissingHistory {
        entity: Entity,
        component: ComponentId,
    },

    /// Entity was not found in the world.
    #[error("Entity not found: {0}")]
    EntityNotFound(Entity),

    /// Replay expected the live component to be present (or absent).
    #[error("Component {component} in unexpected state on entity {entity}")]
    ComponentMissing {
        entity: Entity,
        component: &'static str,
    },

    /// The snapshot log refused to move its cursor.
    #[error("Cursor violation: {0}")]
    CursorViolation(&'static str),
}
