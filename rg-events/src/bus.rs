//! Event bus: synchronous typed publish/subscribe, built on the same
//! `log`/`smallvec` stack the rest of the workspace depends on rather
//! than reaching for a new messaging crate.

use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use rg_core::{NodeId, SubscriptionId};

use crate::category::MessageCategory;
use crate::message::Message;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

type Callback = Box<dyn FnMut(&Message) + Send>;

struct Subscription {
    id: SubscriptionId,
    categories: MessageCategory,
    /// The node that registered this subscription during compile, if any
    /// (spec §4.12: "Nodes subscribing during compile unsubscribe on
    /// cleanup"). `None` for subscriptions an embedder owns directly.
    owner: Option<NodeId>,
    callback: Callback,
}

/// "Delivery is synchronous per publish call from the perspective of the
/// publisher" (spec §4.12) — every matching subscriber's callback runs
/// inline before `publish` returns.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        categories: MessageCategory,
        owner: Option<NodeId>,
        callback: impl FnMut(&Message) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.push(Subscription {
            id,
            categories,
            owner,
            callback: Box::new(callback),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|s| s.id != id);
    }

    /// "Nodes subscribing during compile unsubscribe on cleanup" (spec
    /// §4.12) — the compiler's cleanup path calls this for every node it
    /// tears down.
    pub fn unsubscribe_node(&mut self, node: NodeId) {
        self.subscriptions.retain(|s| s.owner != Some(node));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn publish(&mut self, message: Message) {
        let category = message.category();
        // Deliveries run inline per the synchronous contract; a fixed
        // small buffer avoids allocating for the common case of a handful
        // of interested subscribers.
        let mut matched: SmallVec<[usize; 8]> = SmallVec::new();
        for (i, sub) in self.subscriptions.iter().enumerate() {
            if sub.categories.intersects(category) {
                matched.push(i);
            }
        }
        for i in matched {
            (self.subscriptions[i].callback)(&message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CleanupScope, Event};
    use std::sync::atomic::{AtomicUsize, Ordering as MemOrdering};
    use std::sync::Arc;

    #[test]
    fn subscriber_only_receives_matching_category() {
        let mut bus = EventBus::new();
        let cleanup_hits = Arc::new(AtomicUsize::new(0));
        let recompile_hits = Arc::new(AtomicUsize::new(0));

        let c = cleanup_hits.clone();
        bus.subscribe(MessageCategory::CLEANUP, None, move |_| {
            c.fetch_add(1, MemOrdering::Relaxed);
        });
        let r = recompile_hits.clone();
        bus.subscribe(MessageCategory::RECOMPILE, None, move |_| {
            r.fetch_add(1, MemOrdering::Relaxed);
        });

        bus.publish(Message::new(
            Event::CleanupRequested { scope: CleanupScope::Full, reason: "test".into() },
            None,
        ));

        assert_eq!(cleanup_hits.load(MemOrdering::Relaxed), 1);
        assert_eq!(recompile_hits.load(MemOrdering::Relaxed), 0);
    }

    #[test]
    fn unsubscribe_node_removes_only_its_subscriptions() {
        let mut bus = EventBus::new();
        let node_a = NodeId::next();
        let node_b = NodeId::next();
        bus.subscribe(MessageCategory::ALL, Some(node_a), |_| {});
        bus.subscribe(MessageCategory::ALL, Some(node_b), |_| {});
        assert_eq!(bus.subscriber_count(), 2);
        bus.unsubscribe_node(node_a);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn explicit_unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let id = bus.subscribe(MessageCategory::ALL, None, move |_| {
            h.fetch_add(1, MemOrdering::Relaxed);
        });
        bus.unsubscribe(id);
        bus.publish(Message::new(Event::SwapchainInvalidated, None));
        assert_eq!(hits.load(MemOrdering::Relaxed), 0);
    }
}
