//! Engine signals and the scene-owned event bus
//!
//! The core never dispatches through a global: operations that raise a signal
//! take an `EventSink` and push into it. A `Vec<EngineEvent>` is a sink, and so
//! is the `EventBus` a scene owns.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// A signal raised by the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// An entity was built and registered
    EntityCreated(EntityId),
    /// An entity could not be built; nothing was registered
    EntityCreationFailed { reason: String },
    /// Two entities' colliders overlap
    Collision { first: EntityId, second: EntityId },
    /// An entity was flagged deleted (hidden, collider disabled)
    MarkedForDeletion(EntityId),
}

/// Discriminant used to subscribe to one kind of signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    EntityCreated,
    EntityCreationFailed,
    Collision,
    MarkedForDeletion,
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::EntityCreated(_) => EventKind::EntityCreated,
            EngineEvent::EntityCreationFailed { .. } => EventKind::EntityCreationFailed,
            EngineEvent::Collision { .. } => EventKind::Collision,
            EngineEvent::MarkedForDeletion(_) => EventKind::MarkedForDeletion,
        }
    }
}

/// Anything that accepts engine signals
pub trait EventSink {
    fn emit(&mut self, event: EngineEvent);
}

impl EventSink for Vec<EngineEvent> {
    fn emit(&mut self, event: EngineEvent) {
        self.push(event);
    }
}

/// Handle returned by `EventBus::on`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

type Callback = Box<dyn FnMut(&EngineEvent)>;

struct Subscriber {
    id: SubscriberId,
    kind: EventKind,
    callback: Callback,
}

/// Explicit publish/subscribe dispatcher.
///
/// Delivery is synchronous, in subscription order.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one kind of signal
    pub fn on<F>(&mut self, kind: EventKind, callback: F) -> SubscriberId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            kind,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn off(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl EventSink for EventBus {
    fn emit(&mut self, event: EngineEvent) {
        let kind = event.kind();
        for sub in self.subscribers.iter_mut().filter(|s| s.kind == kind) {
            (sub.callback)(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_bus_dispatches_by_kind() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        bus.on(EventKind::Collision, move |e| sink.borrow_mut().push(e.clone()));

        bus.emit(EngineEvent::MarkedForDeletion(EntityId(1)));
        bus.emit(EngineEvent::Collision {
            first: EntityId(1),
            second: EntityId(2),
        });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind(), EventKind::Collision);
    }

    #[test]
    fn test_off_removes_subscriber() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let c = Rc::clone(&count);
        let id = bus.on(EventKind::EntityCreated, move |_| *c.borrow_mut() += 1);
        bus.emit(EngineEvent::EntityCreated(EntityId(7)));
        assert!(bus.off(id));
        assert!(!bus.off(id));
        bus.emit(EngineEvent::EntityCreated(EntityId(8)));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_vec_is_a_sink() {
        let mut events: Vec<EngineEvent> = Vec::new();
        events.emit(EngineEvent::MarkedForDeletion(EntityId(3)));
        assert_eq!(events, vec![EngineEvent::MarkedForDeletion(EntityId(3))]);
    }
}
