//! Synchronous publish/subscribe hub for domain events.

use std::fmt;

use crate::{Event, Topic};

/// Handle returned by [`EventBus::subscribe`] that can later cancel the subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    topic: Option<Topic>,
    handler: Box<dyn FnMut(&Event)>,
}

/// Process-wide publish point for domain events.
///
/// Dispatch is synchronous: [`EventBus::publish`] invokes every matching
/// handler, in subscription order, before returning.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler invoked for every event published under `topic`.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.insert(Some(topic), Box::new(handler))
    }

    /// Registers a handler invoked for every published event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.insert(None, Box::new(handler))
    }

    /// Cancels a subscription. Returns `false` when the handle is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    /// Delivers the event to every matching subscriber.
    pub fn publish(&mut self, event: &Event) {
        let topic = event.topic();
        for subscription in &mut self.subscriptions {
            if subscription.topic.map_or(true, |wanted| wanted == topic) {
                (subscription.handler)(event);
            }
        }
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn insert(&mut self, topic: Option<Topic>, handler: Box<dyn FnMut(&Event)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscriptions.push(Subscription { id, topic, handler });
        id
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriptions.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
