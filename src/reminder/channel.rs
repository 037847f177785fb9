use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Payload published once per triggered reminder.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEvent {
    pub id: String,
    pub title: String,
    /// Plain-text excerpt of the note content.
    pub content: String,
    pub url: String,
}

type Subscriber = Arc<dyn Fn(&ReminderEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    subscribers: Mutex<Vec<(u64, Subscriber)>>,
    next_id: AtomicU64,
}

/// In-process publish/subscribe channel connecting the reminder trigger to
/// UI consumers.
///
/// Constructed once at startup and passed by handle to producer and
/// consumer; tests build their own, so there is no process-wide registry to
/// tear down. Events published with no subscribers are dropped, not queued.
#[derive(Clone, Default)]
pub struct EventChannel {
    registry: Arc<Registry>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked synchronously, in registration order, once
    /// per published event. The returned [`Subscription`] removes exactly
    /// this callback; unsubscribing twice is a no-op.
    pub fn subscribe(
        &self,
        callback: impl Fn(&ReminderEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .subscribers
            .lock()
            .expect("subscriber registry lock")
            .push((id, Arc::new(callback)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every currently registered subscriber, in order.
    ///
    /// A panicking subscriber is caught and logged; delivery continues to the
    /// rest and the registry is left intact.
    pub fn publish(&self, event: &ReminderEvent) {
        let snapshot: Vec<Subscriber> = self
            .registry
            .subscribers
            .lock()
            .expect("subscriber registry lock")
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                tracing::error!(note_id = %event.id, "reminder subscriber panicked, continuing delivery");
            }
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.registry
            .subscribers
            .lock()
            .expect("subscriber registry lock")
            .len()
    }
}

/// Handle returned by [`EventChannel::subscribe`].
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the subscribed callback. Idempotent; a no-op once the channel
    /// itself is gone.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .subscribers
                .lock()
                .expect("subscriber registry lock")
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> ReminderEvent {
        ReminderEvent {
            id: id.to_string(),
            title: "Reminder".to_string(),
            content: String::new(),
            url: format!("/dashboard?note={id}"),
        }
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let channel = EventChannel::new();
        channel.publish(&event("n1"));
    }

    #[test]
    fn delivers_in_registration_order() {
        let channel = EventChannel::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            channel.subscribe(move |_| order.lock().unwrap().push(tag));
        }

        channel.publish(&event("n1"));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn panicking_subscriber_does_not_block_later_ones() {
        let channel = EventChannel::new();
        let _boom = channel.subscribe(|_| panic!("subscriber failure"));
        let received = Arc::new(Mutex::new(Vec::new()));
        {
            let received = Arc::clone(&received);
            channel.subscribe(move |ev: &ReminderEvent| {
                received.lock().unwrap().push(ev.id.clone());
            });
        }

        // Keep the panic out of the test output.
        let prev = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        channel.publish(&event("n1"));
        channel.publish(&event("n2"));
        std::panic::set_hook(prev);

        assert_eq!(*received.lock().unwrap(), vec!["n1", "n2"]);
        // Registry is intact, panicking subscriber included.
        assert_eq!(channel.subscriber_count(), 2);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_exact() {
        let channel = EventChannel::new();
        let hits = Arc::new(Mutex::new(0));

        let kept = {
            let hits = Arc::clone(&hits);
            channel.subscribe(move |_| *hits.lock().unwrap() += 1)
        };
        let dropped = channel.subscribe(|_| {});

        dropped.unsubscribe();
        dropped.unsubscribe();
        assert_eq!(channel.subscriber_count(), 1);

        channel.publish(&event("n1"));
        assert_eq!(*hits.lock().unwrap(), 1);

        kept.unsubscribe();
        channel.publish(&event("n2"));
        assert_eq!(*hits.lock().unwrap(), 1);
    }
}
