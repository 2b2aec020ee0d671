//! Synchronous publish/subscribe channel keyed by event kind.

use std::{collections::HashMap, fmt};

use raindrop_core::{Event, EventKind};

/// Callback invoked for every published event of a subscribed kind.
pub type Handler = Box<dyn FnMut(&Event)>;

/// Handle identifying one registration on the [`EventBus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Delivers events to subscribers synchronously, in subscription order.
///
/// Registrations are additive: subscribing the same logic twice yields two
/// handlers and two invocations per publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl EventBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    pub fn subscribe(&mut self, kind: EventKind, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(kind)
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes exactly one registration, returning whether it existed.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        let Some(handlers) = self.subscribers.get_mut(&kind) else {
            return false;
        };
        let Some(position) = handlers.iter().position(|(handle, _)| *handle == id) else {
            return false;
        };

        let _ = handlers.remove(position);
        if handlers.is_empty() {
            let _ = self.subscribers.remove(&kind);
        }
        true
    }

    /// Invokes every handler subscribed to the event's kind.
    pub fn publish(&mut self, event: &Event) {
        if let Some(handlers) = self.subscribers.get_mut(&event.kind()) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    /// Number of registrations for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registrations: usize = self.subscribers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("kinds", &self.subscribers.len())
            .field("registrations", &registrations)
            .finish()
    }
}
