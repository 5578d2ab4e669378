//! Event marker trait.
//!
//! Events are plain values sent through the world's event system and
//! delivered to every observer of their type on the next flush.

use core::any::TypeId;

/// Marker trait for event types.
///
/// Any type implementing this can be sent as an event via `world.send()`.
pub trait Event: Send + Sync + 'static {
    /// Get the TypeId of this event type.
    fn type_id() -> TypeId {
        TypeId::of::<Self>()
    }

    /// Get the event type name for diagnostics.
    fn name() -> &'static str {
        core::any::type_name::<Self>()
    }
}

// Blanket implementation: any Send + Sync + 'static type can be an event
impl<T: Send + Sync + 'static> Event for T {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Undo;

    struct Boundary {
        timestamp: u64,
    }

    #[test]
    fn test_event_type_id() {
        assert_eq!(<Undo as Event>::type_id(), TypeId::of::<Undo>());
        assert_ne!(<Undo as Event>::type_id(), <Boundary as Event>::type_id());
    }

    #[test]
    fn test_any_type_is_event() {
        fn assert_event<T: Event>() {}

        assert_event::<Undo>();
        assert_event::<Boundary>();
        assert_event::<i32>();
        assert_event::<String>();
    }

    #[test]
    fn test_event_name() {
        assert!(<Boundary as Event>::name().ends_with("Boundary"));
    }
}
