//! Minimal typed publish/subscribe primitive.
//!
//! An [`EventEmitter`] is an owned, per-instance bus keyed by an event-name
//! string. Handlers for one event are held as a set keyed by handler
//! identity: registering the same `Arc`'d handler twice is a no-op, while
//! distinct closures are independent subscriptions. There is no ordering
//! contract between sibling handlers of one event.
//!
//! Dispatch is synchronous. Handlers run outside the registry lock, so a
//! handler may subscribe, unsubscribe or emit re-entrantly. A panicking
//! handler aborts the remaining dispatch of that `emit` call; the emitter
//! does not isolate handler failures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Routes an event value to its event-name string.
pub trait EventKey {
    fn key(&self) -> &'static str;
}

/// A registered handler. Held by `Arc` so callers can pre-share a handler
/// and rely on same-reference registration being idempotent.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E> {
    id: u64,
    handler: Handler<E>,
    once: bool,
}

struct Registry<E> {
    listeners: HashMap<String, Vec<Entry<E>>>,
    next_id: u64,
}

impl<E> Registry<E> {
    fn subscribe(&mut self, event: &str, handler: Handler<E>, once: bool) -> u64 {
        let entries = self.listeners.entry(event.to_string()).or_default();
        // Same handler reference already registered: keep the original.
        if let Some(existing) = entries
            .iter()
            .find(|e| Arc::ptr_eq(&e.handler, &handler))
        {
            return existing.id;
        }
        let id = self.next_id;
        self.next_id += 1;
        entries.push(Entry { id, handler, once });
        id
    }

    fn unsubscribe(&mut self, event: &str, id: u64) {
        if let Some(entries) = self.listeners.get_mut(event) {
            entries.retain(|e| e.id != id);
        }
    }
}

/// A process-local publish/subscribe bus keyed by event-name strings.
pub struct EventEmitter<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: EventKey> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EventKey> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                listeners: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `handler` for `event`. Returns a capability that removes
    /// exactly that handler. Registering the same `Arc` twice returns a
    /// subscription for the existing registration.
    pub fn on(&self, event: &str, handler: Handler<E>) -> Subscription<E> {
        let id = self.registry.lock().unwrap().subscribe(event, handler, false);
        self.subscription(event, id)
    }

    /// Like [`EventEmitter::on`] but accepts a plain closure.
    pub fn on_fn(
        &self,
        event: &str,
        handler: impl Fn(&E) + Send + Sync + 'static,
    ) -> Subscription<E> {
        self.on(event, Arc::new(handler))
    }

    /// Register `handler` for a single delivery. The subscription can be
    /// cancelled before the first matching emission.
    pub fn once(&self, event: &str, handler: Handler<E>) -> Subscription<E> {
        let id = self.registry.lock().unwrap().subscribe(event, handler, true);
        self.subscription(event, id)
    }

    /// Synchronously deliver `event` to every currently registered handler
    /// for its name. Emitting with zero subscribers is not an error.
    pub fn emit(&self, event: E) {
        let handlers: Vec<Handler<E>> = {
            let mut registry = self.registry.lock().unwrap();
            match registry.listeners.get_mut(event.key()) {
                Some(entries) => {
                    let handlers = entries.iter().map(|e| Arc::clone(&e.handler)).collect();
                    // Once-entries are spent by this emission even if a
                    // handler panics mid-dispatch.
                    entries.retain(|e| !e.once);
                    handlers
                }
                None => return,
            }
        };
        for handler in handlers {
            handler(&event);
        }
    }

    /// Drop all handlers for one event.
    pub fn remove(&self, event: &str) {
        self.registry.lock().unwrap().listeners.remove(event);
    }

    /// Drop all handlers for all events.
    pub fn clear(&self) {
        self.registry.lock().unwrap().listeners.clear();
    }

    /// Number of handlers currently registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        self.registry
            .lock()
            .unwrap()
            .listeners
            .get(event)
            .map_or(0, Vec::len)
    }

    fn subscription(&self, event: &str, id: u64) -> Subscription<E> {
        Subscription {
            registry: Arc::downgrade(&self.registry),
            event: event.to_string(),
            id,
        }
    }
}

/// Capability returned by [`EventEmitter::on`]/[`EventEmitter::once`]:
/// invoking [`Subscription::unsubscribe`] removes exactly the handler it was
/// created for. Dropping a subscription without calling it leaves the
/// handler registered.
pub struct Subscription<E> {
    registry: Weak<Mutex<Registry<E>>>,
    event: String,
    id: u64,
}

impl<E> Subscription<E> {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().unwrap().unsubscribe(&self.event, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    enum TestEvent {
        Ping(u32),
        Pong,
    }

    impl EventKey for TestEvent {
        fn key(&self) -> &'static str {
            match self {
                TestEvent::Ping(_) => "ping",
                TestEvent::Pong => "pong",
            }
        }
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> Handler<TestEvent> {
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn emit_reaches_registered_handler() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        emitter.on("ping", counting_handler(count.clone()));

        emitter.emit(TestEvent::Ping(1));
        emitter.emit(TestEvent::Ping(2));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn emit_does_not_cross_events() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        emitter.on("ping", counting_handler(count.clone()));

        emitter.emit(TestEvent::Pong);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let emitter: EventEmitter<TestEvent> = EventEmitter::new();
        emitter.emit(TestEvent::Pong);
    }

    #[test]
    fn unsubscribe_removes_exactly_that_handler() {
        let emitter = EventEmitter::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let sub = emitter.on("ping", counting_handler(first.clone()));
        emitter.on("ping", counting_handler(second.clone()));

        sub.unsubscribe();
        emitter.emit(TestEvent::Ping(0));

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn same_handler_reference_registers_once() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(count.clone());

        emitter.on("ping", Arc::clone(&handler));
        emitter.on("ping", handler);

        emitter.emit(TestEvent::Ping(0));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.handler_count("ping"), 1);
    }

    #[test]
    fn distinct_closures_are_independent() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        emitter.on("ping", counting_handler(count.clone()));
        emitter.on("ping", counting_handler(count.clone()));

        emitter.emit(TestEvent::Ping(0));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn once_fires_a_single_time() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        emitter.once("ping", counting_handler(count.clone()));

        emitter.emit(TestEvent::Ping(0));
        emitter.emit(TestEvent::Ping(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn once_can_be_cancelled_before_emission() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let sub = emitter.once("ping", counting_handler(count.clone()));

        sub.unsubscribe();
        emitter.emit(TestEvent::Ping(0));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn remove_drops_all_handlers_for_event() {
        let emitter = EventEmitter::new();
        let ping = Arc::new(AtomicUsize::new(0));
        let pong = Arc::new(AtomicUsize::new(0));
        emitter.on("ping", counting_handler(ping.clone()));
        emitter.on("ping", counting_handler(ping.clone()));
        emitter.on("pong", counting_handler(pong.clone()));

        emitter.remove("ping");
        emitter.emit(TestEvent::Ping(0));
        emitter.emit(TestEvent::Pong);

        assert_eq!(ping.load(Ordering::SeqCst), 0);
        assert_eq!(pong.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        emitter.on("ping", counting_handler(count.clone()));
        emitter.on("pong", counting_handler(count.clone()));

        emitter.clear();
        emitter.emit(TestEvent::Ping(0));
        emitter.emit(TestEvent::Pong);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_sees_payload() {
        let emitter = EventEmitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        emitter.on_fn("ping", move |event| {
            if let TestEvent::Ping(n) = event {
                sink.lock().unwrap().push(*n);
            }
        });

        emitter.emit(TestEvent::Ping(7));
        emitter.emit(TestEvent::Ping(9));
        assert_eq!(*seen.lock().unwrap(), vec![7, 9]);
    }

    #[test]
    fn handler_may_unsubscribe_reentrantly() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let sub_slot: Arc<Mutex<Option<Subscription<TestEvent>>>> =
            Arc::new(Mutex::new(None));

        let slot = sub_slot.clone();
        let counter = count.clone();
        let sub = emitter.on_fn("ping", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = slot.lock().unwrap().take() {
                sub.unsubscribe();
            }
        });
        *sub_slot.lock().unwrap() = Some(sub);

        emitter.emit(TestEvent::Ping(0));
        emitter.emit(TestEvent::Ping(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_after_clear_is_noop() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let sub = emitter.on("ping", counting_handler(count.clone()));

        emitter.clear();
        sub.unsubscribe();
        emitter.emit(TestEvent::Ping(0));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
