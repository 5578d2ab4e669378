#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::redundant_pub_crate)]

//! Rewind Event System
//!
//! Deferred, typed events for a [`rewind_ecs::World`].
//!
//! Events are queued with `send` and delivered on `flush_events` to every
//! observer registered for their type, in send order. Observers get
//! `&mut World`, so they can mutate state and send further events; those are
//! delivered within the same flush.
//!
//! # Example
//!
//! ```ignore
//! world.observe(|world: &mut World, event: &Damage| {
//!     if let Some(health) = world.get_mut::<Health>(event.target) {
//!         health.0 -= event.amount;
//!     }
//! });
//!
//! world.send(Damage { target: player, amount: 10 });
//! world.flush_events();
//! ```

mod event;
mod observer;
mod queue;
mod world_ext;

use rewind_ecs::{Plugin, World};

pub use event::Event;
pub use observer::{ObserverId, ObserverInfo};
pub use queue::{EventQueue, QueuedEvent};
pub use world_ext::{EventSystem, EventWorldExt};

/// Plugin to add the event system to a World.
///
/// # Example
///
/// ```ignore
/// use rewind_ecs::World;
/// use rewind_event::EventPlugin;
///
/// let mut world = World::new();
/// world.add_plugin(EventPlugin);
///
/// world.send(MyEvent { value: 42 });
/// world.flush_events();
/// ```
pub struct EventPlugin;

impl Plugin for EventPlugin {
    fn build(&self, world: &mut World) {
        world_ext::EventWorldExt::init_events(world);
    }
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Event, EventPlugin, EventQueue, EventWorldExt, ObserverId};
}
