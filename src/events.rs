//! Collision broadcast channel
//!
//! Decouples the physical trigger (main object touches a body) from
//! whoever reacts to it. Publish is synchronous and iterates a snapshot
//! of the registrations present when it was called, so a handler that
//! cancels itself mid-publish only drops out on the next publish.

use glam::Vec3;

use crate::pool::Handle;

/// Payload raised when the main object touches another body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// The body that was hit
    pub collider: Handle,
    /// Where the main object was at the time
    pub at: Vec3,
}

/// Returned by a handler to control its own registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Keep,
    Cancel,
}

/// Identifies one registration for `unsubscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type HandlerFn = Box<dyn FnMut(&CollisionEvent) -> Subscription>;

/// One-to-many notification point. Handlers run in subscription order;
/// publishing with zero subscribers is a plain no-op.
#[derive(Default)]
pub struct CollisionChannel {
    subscribers: Vec<(SubscriberId, HandlerFn)>,
    next_id: u64,
}

impl CollisionChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; the returned id can unsubscribe it later.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&CollisionEvent) -> Subscription + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Drop a registration. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Invoke every handler registered at the time of the call, in
    /// subscription order. Cancellations collected during the walk are
    /// applied after the last handler has run.
    pub fn publish(&mut self, event: &CollisionEvent) {
        let snapshot: Vec<SubscriberId> =
            self.subscribers.iter().map(|(id, _)| *id).collect();
        let mut cancelled: Vec<SubscriberId> = Vec::new();
        for id in snapshot {
            if let Some((_, handler)) =
                self.subscribers.iter_mut().find(|(sid, _)| *sid == id)
            {
                if handler(event) == Subscription::Cancel {
                    cancelled.push(id);
                }
            }
        }
        if !cancelled.is_empty() {
            self.subscribers.retain(|(id, _)| !cancelled.contains(id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event() -> CollisionEvent {
        CollisionEvent {
            collider: probe_handle(),
            at: Vec3::ZERO,
        }
    }

    fn probe_handle() -> Handle {
        // Any handle works as a payload; mint one from a throwaway pool.
        let mut pool: crate::pool::Pool<()> = crate::pool::Pool::new();
        pool.acquire(|| (), |_| {})
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let mut channel = CollisionChannel::new();
        channel.publish(&event());
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut channel = CollisionChannel::new();
        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            channel.subscribe(move |_| {
                order.borrow_mut().push(tag);
                Subscription::Keep
            });
        }
        channel.publish(&event());
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hits = Rc::new(RefCell::new(0));
        let mut channel = CollisionChannel::new();
        let id = {
            let hits = Rc::clone(&hits);
            channel.subscribe(move |_| {
                *hits.borrow_mut() += 1;
                Subscription::Keep
            })
        };
        channel.publish(&event());
        channel.unsubscribe(id);
        channel.publish(&event());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_cancel_takes_effect_on_next_publish() {
        let hits = Rc::new(RefCell::new(0));
        let mut channel = CollisionChannel::new();
        {
            let hits = Rc::clone(&hits);
            channel.subscribe(move |_| {
                *hits.borrow_mut() += 1;
                Subscription::Cancel
            });
        }
        // The cancelling handler still runs during the publish it cancels
        // in, and is gone for the one after.
        channel.publish(&event());
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(channel.subscriber_count(), 0);
        channel.publish(&event());
        assert_eq!(*hits.borrow(), 1);
    }
}
