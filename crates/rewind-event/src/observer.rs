//! Observers: callbacks bound to one event type.

use core::any::{Any, TypeId};
use std::sync::Arc;

use rewind_ecs::World;

use crate::Event;

/// Handle returned when an observer is registered; used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u32);

impl ObserverId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Callback with its payload type erased.
///
/// Shared so that a flush can run callbacks without holding the event
/// system lock.
pub(crate) type ObserverFn = Arc<dyn Fn(&mut World, &dyn Any) + Send + Sync>;

/// A registered observer.
pub struct ObserverInfo {
    pub(crate) id: ObserverId,
    event_type_id: TypeId,
    event_name: &'static str,
    pub(crate) callback: ObserverFn,
}

impl ObserverInfo {
    /// Wrap `callback` so it can be stored next to observers of other event
    /// types. The id is assigned on registration.
    pub fn for_event<E, F>(callback: F) -> Self
    where
        E: Event,
        F: Fn(&mut World, &E) + Send + Sync + 'static,
    {
        Self {
            id: ObserverId(u32::MAX),
            event_type_id: TypeId::of::<E>(),
            event_name: E::name(),
            callback: Arc::new(move |world, payload| {
                if let Some(event) = payload.downcast_ref::<E>() {
                    callback(world, event);
                }
            }),
        }
    }

    #[must_use]
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    #[must_use]
    pub const fn event_type_id(&self) -> TypeId {
        self.event_type_id
    }

    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        self.event_name
    }
}

impl core::fmt::Debug for ObserverInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverInfo")
            .field("id", &self.id)
            .field("event", &self.event_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Damage {
        amount: u32,
    }

    #[test]
    fn test_callback_ignores_foreign_payloads() {
        let total = Arc::new(AtomicU32::new(0));
        let sink = Arc::clone(&total);

        let info = ObserverInfo::for_event(move |_: &mut World, event: &Damage| {
            sink.fetch_add(event.amount, Ordering::SeqCst);
        });
        assert_eq!(info.event_type_id(), TypeId::of::<Damage>());

        let mut world = World::new();
        (info.callback)(&mut world, &Damage { amount: 42 });
        (info.callback)(&mut world, &7_u8);

        assert_eq!(total.load(Ordering::SeqCst), 42);
    }
}
