//! FIFO queue of pending events.

use std::any::{Any, TypeId};
use std::collections::VecDeque;

/// A queued event waiting to be processed.
pub struct QueuedEvent {
    /// Event type
    pub event_type_id: TypeId,
    /// Event type name for diagnostics
    pub event_name: &'static str,
    /// The event value itself
    pub payload: Box<dyn Any + Send + Sync>,
}

impl QueuedEvent {
    /// Wrap a typed event.
    pub fn new<E: Send + Sync + 'static>(event: E) -> Self {
        Self {
            event_type_id: TypeId::of::<E>(),
            event_name: core::any::type_name::<E>(),
            payload: Box::new(event),
        }
    }
}

impl core::fmt::Debug for QueuedEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueuedEvent")
            .field("event_name", &self.event_name)
            .finish_non_exhaustive()
    }
}

/// Events are delivered in the order they were sent.
#[derive(Default)]
pub struct EventQueue {
    pending: VecDeque<QueuedEvent>,
}

impl EventQueue {
    /// Create a new empty event queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: QueuedEvent) {
        self.pending.push_back(event);
    }

    /// Pop the oldest event.
    pub fn pop(&mut self) -> Option<QueuedEvent> {
        self.pending.pop_front()
    }

    /// Drain all events in send order.
    pub fn drain(&mut self) -> impl Iterator<Item = QueuedEvent> + '_ {
        self.pending.drain(..)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl core::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}
