//! World extension for the event system.

use core::any::TypeId;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use rewind_ecs::World;
use tracing::trace;

use crate::Event;
use crate::observer::{ObserverFn, ObserverId, ObserverInfo};
use crate::queue::{EventQueue, QueuedEvent};

/// Inner event system state (behind Arc<RwLock>).
#[derive(Default)]
struct EventSystemInner {
    queue: EventQueue,
    /// Registered observers by event type, in registration order
    observers: HashMap<TypeId, Vec<ObserverInfo>>,
    next_observer_id: u32,
}

/// Event system handle - cloneable wrapper around shared state.
///
/// Stored as a world resource. The Arc<RwLock> allows it to be cloned out of
/// the world while observers (which need `&mut World`) run.
#[derive(Clone, Default)]
pub struct EventSystem {
    inner: Arc<RwLock<EventSystemInner>>,
}

impl EventSystem {
    /// Create a new event system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for an event type.
    pub fn add_observer(&self, mut info: ObserverInfo) -> ObserverId {
        let mut inner = self.inner.write();
        let id = ObserverId(inner.next_observer_id);
        inner.next_observer_id += 1;
        info.id = id;

        inner
            .observers
            .entry(info.event_type_id())
            .or_default()
            .push(info);

        id
    }

    /// Unregister an observer. Returns `false` if it was not registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.write();
        for observers in inner.observers.values_mut() {
            if let Some(pos) = observers.iter().position(|o| o.id == id) {
                observers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Push an event to the queue.
    pub fn push(&self, event: QueuedEvent) {
        self.inner.write().queue.push(event);
    }

    /// Pop the oldest event from the queue.
    pub fn pop(&self) -> Option<QueuedEvent> {
        self.inner.write().queue.pop()
    }

    /// Number of events waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.read().queue.len()
    }

    /// Number of observers registered for `E`.
    #[must_use]
    pub fn observer_count<E: Event>(&self) -> usize {
        self.inner
            .read()
            .observers
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Snapshot of the callbacks for one event type.
    fn callbacks(&self, event_type_id: TypeId) -> Vec<ObserverFn> {
        self.inner
            .read()
            .observers
            .get(&event_type_id)
            .map(|observers| observers.iter().map(|o| Arc::clone(&o.callback)).collect())
            .unwrap_or_default()
    }
}

impl core::fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("EventSystem")
            .field("queue", &inner.queue)
            .field("event_types", &inner.observers.len())
            .finish()
    }
}

/// Extension trait for World to add event functionality.
pub trait EventWorldExt {
    /// Initialize the event system on this world.
    fn init_events(&mut self);

    /// Queue an event for the next flush.
    fn send<E: Event>(&mut self, event: E);

    /// Register an observer for an event type.
    ///
    /// Returns an `ObserverId` that can be used to remove the observer later.
    fn observe<E, F>(&mut self, callback: F) -> ObserverId
    where
        E: Event,
        F: Fn(&mut World, &E) + Send + Sync + 'static;

    /// Remove a previously registered observer.
    fn remove_observer(&mut self, id: ObserverId) -> bool;

    /// Deliver queued events to their observers, oldest first.
    ///
    /// Events sent by observers during the flush are delivered in the same
    /// flush. Returns the number of events processed.
    fn flush_events(&mut self) -> usize;

    /// Get the event system handle.
    fn events(&self) -> Option<EventSystem>;
}

impl EventWorldExt for World {
    fn init_events(&mut self) {
        if !self.has_resource::<EventSystem>() {
            self.insert_resource(EventSystem::new());
        }
    }

    fn send<E: Event>(&mut self, event: E) {
        self.init_events();
        if let Some(sys) = self.resource::<EventSystem>() {
            sys.push(QueuedEvent::new(event));
        }
    }

    fn observe<E, F>(&mut self, callback: F) -> ObserverId
    where
        E: Event,
        F: Fn(&mut World, &E) + Send + Sync + 'static,
    {
        self.init_events();

        let info = ObserverInfo::for_event(callback);
        match self.resource::<EventSystem>() {
            Some(sys) => sys.add_observer(info),
            None => info.id,
        }
    }

    fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.resource::<EventSystem>()
            .is_some_and(|sys| sys.remove_observer(id))
    }

    fn flush_events(&mut self) -> usize {
        let Some(sys) = self.events() else {
            return 0;
        };

        let mut processed = 0;
        while let Some(queued) = sys.pop() {
            process_event(self, &sys, queued);
            processed += 1;
        }
        processed
    }

    fn events(&self) -> Option<EventSystem> {
        self.resource::<EventSystem>().cloned()
    }
}

/// Process a single event: call all observers of its type in order.
fn process_event(world: &mut World, sys: &EventSystem, queued: QueuedEvent) {
    let callbacks = sys.callbacks(queued.event_type_id);
    trace!(event = queued.event_name, observers = callbacks.len(), "dispatch");

    for callback in callbacks {
        callback(world, &*queued.payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Clone)]
    struct TestEvent {
        value: i32,
    }

    struct Chained;

    #[test]
    fn test_init_events() {
        let mut world = World::new();
        world.init_events();

        assert!(world.events().is_some());
    }

    #[test]
    fn test_send_queues_event() {
        let mut world = World::new();
        world.send(TestEvent { value: 42 });

        let sys = world.events().unwrap();
        assert_eq!(sys.pending(), 1);
    }

    #[test]
    fn test_observer_called_on_flush() {
        let mut world = World::new();
        world.init_events();

        let call_count = Arc::new(AtomicI32::new(0));
        let value_sum = Arc::new(AtomicI32::new(0));

        let cc = Arc::clone(&call_count);
        let vs = Arc::clone(&value_sum);

        world.observe(move |_world: &mut World, event: &TestEvent| {
            cc.fetch_add(1, Ordering::SeqCst);
            vs.fetch_add(event.value, Ordering::SeqCst);
        });

        world.send(TestEvent { value: 10 });
        world.send(TestEvent { value: 20 });
        world.send(TestEvent { value: 12 });

        // Observer should not be called yet
        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        assert_eq!(world.flush_events(), 3);

        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert_eq!(value_sum.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_events_sent_during_flush_are_processed() {
        let mut world = World::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let o = Arc::clone(&order);
        world.observe(move |world: &mut World, event: &TestEvent| {
            o.lock().unwrap().push(event.value);
            world.send(Chained);
        });

        let o = Arc::clone(&order);
        world.observe(move |_world: &mut World, _event: &Chained| {
            o.lock().unwrap().push(0);
        });

        world.send(TestEvent { value: 1 });
        world.send(TestEvent { value: 2 });

        assert_eq!(world.flush_events(), 4);
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 0, 0]);
    }

    #[test]
    fn test_remove_observer() {
        let mut world = World::new();
        let calls = Arc::new(AtomicI32::new(0));

        let c = Arc::clone(&calls);
        let id = world.observe(move |_world: &mut World, _event: &TestEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(world.events().unwrap().observer_count::<TestEvent>(), 1);
        assert!(world.remove_observer(id));
        assert!(!world.remove_observer(id));

        world.send(TestEvent { value: 1 });
        world.flush_events();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_observer_can_register_observers() {
        let mut world = World::new();
        let calls = Arc::new(AtomicI32::new(0));

        let c = Arc::clone(&calls);
        world.observe(move |world: &mut World, _event: &Chained| {
            let c = Arc::clone(&c);
            world.observe(move |_world: &mut World, _event: &TestEvent| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        });

        world.send(Chained);
        world.send(TestEvent { value: 1 });
        world.flush_events();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
