//! Typed publish/subscribe for controllers.
//!
//! Every controller owns one [`EventEmitter`] for its own event enum. Handlers
//! are registered per event kind and run synchronously, in subscription order,
//! inside `emit`. There is no global registry.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// An event that can be routed by kind.
pub trait Notification {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Returned by `subscribe`; hand it back to `unsubscribe` to remove the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

type Handler<E> = Box<dyn FnMut(&E) + Send + 'static>;

/// Per-instance map from event kind to an ordered handler list.
pub struct EventEmitter<E: Notification> {
    handlers: HashMap<E::Kind, Vec<(SubscriptionToken, Handler<E>)>>,
    next_token: u64,
}

impl<E: Notification> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_token: 0,
        }
    }

    /// Register `handler` for every event of `kind`.
    pub fn subscribe(
        &mut self,
        kind: E::Kind,
        handler: impl FnMut(&E) + Send + 'static,
    ) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((token, Box::new(handler)));
        token
    }

    /// Remove a handler. Returns false if the token was already removed.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        for handlers in self.handlers.values_mut() {
            if let Some(index) = handlers.iter().position(|(t, _)| *t == token) {
                handlers.remove(index);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to every handler subscribed to its kind.
    pub fn emit(&mut self, event: &E) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl<E: Notification> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Notification> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<_, _> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (*kind, handlers.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("handlers", &counts)
            .finish()
    }
}
