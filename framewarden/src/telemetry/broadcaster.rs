//! Subscription broadcaster with per-listener failure isolation.
//!
//! Fan-out to observer callbacks is modeled as an explicit broadcaster
//! type rather than implicit event emission, so failure containment is
//! a first-class guarantee: a listener that panics is logged and skipped,
//! and delivery continues to the remaining listeners in registration
//! order.
//!
//! # Thread Safety
//!
//! The listener registry is guarded by a mutex, but delivery happens on
//! a copy of the listener list taken outside the lock. Listeners may
//! therefore subscribe or release from within a callback without
//! deadlocking; notifications already dispatched are not retracted.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

/// Broadcasts values to registered listeners in registration order.
pub struct Broadcaster<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<T> Broadcaster<T> {
    /// Create a broadcaster with no listeners.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::new())),
        }
    }

    /// Register a listener; it is invoked for every subsequent `emit`.
    ///
    /// The returned `Subscription` removes the listener when released
    /// or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        T: 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::new(callback)));
            id
        };

        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Deliver a value to every current listener, in registration order.
    ///
    /// A listener panic is caught, logged at warn level, and does not
    /// abort delivery to the remaining listeners.
    pub fn emit(&self, value: &T) {
        let listeners: Vec<(u64, Listener<T>)> = self.registry.lock().listeners.clone();

        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(value))).is_err() {
                tracing::warn!(subscriber = id, "Subscriber panicked during delivery");
            }
        }
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

type CancelFn = Box<dyn FnOnce() + Send>;

/// Handle for a registered listener.
///
/// Releasing stops further callback delivery immediately; notifications
/// already dispatched are not retracted. Release is idempotent and also
/// fires on drop, so holding the handle in the owning component gives
/// scoped acquisition with guaranteed cleanup on teardown.
pub struct Subscription {
    cancel: Mutex<Option<CancelFn>>,
}

impl Subscription {
    pub(crate) fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Remove the listener. Calling this more than once is a no-op.
    pub fn release(&self) {
        if let Some(cancel) = self.cancel.lock().take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.cancel.lock().is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_all_listeners_in_order() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = Arc::clone(&order);
        let _s1 = broadcaster.subscribe(move |v| o1.lock().push(("first", *v)));
        let o2 = Arc::clone(&order);
        let _s2 = broadcaster.subscribe(move |v| o2.lock().push(("second", *v)));

        broadcaster.emit(&7);

        assert_eq!(*order.lock(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_release_stops_delivery() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        let sub = broadcaster.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        broadcaster.emit(&1);
        sub.release();
        broadcaster.emit(&2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(broadcaster.listener_count(), 0);
    }

    #[test]
    fn test_release_is_idempotent() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        let sub = broadcaster.subscribe(|_| {});

        sub.release();
        sub.release();
        drop(sub); // also a no-op after explicit release

        assert_eq!(broadcaster.listener_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        {
            let _sub = broadcaster.subscribe(|_| {});
            assert_eq!(broadcaster.listener_count(), 1);
        }
        assert_eq!(broadcaster.listener_count(), 0);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        let count = Arc::new(AtomicUsize::new(0));

        let _s1 = broadcaster.subscribe(|_| panic!("listener failure"));
        let c = Arc::clone(&count);
        let _s2 = broadcaster.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        broadcaster.emit(&1);
        broadcaster.emit(&2);

        // The healthy listener still received both deliveries.
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_may_release_during_delivery() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        let count = Arc::new(AtomicUsize::new(0));

        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot_in_cb = Arc::clone(&slot);
        let c = Arc::clone(&count);
        let sub = broadcaster.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            // Self-release on first delivery.
            if let Some(sub) = slot_in_cb.lock().take() {
                sub.release();
            }
        });
        *slot.lock() = Some(sub);

        broadcaster.emit(&1);
        broadcaster.emit(&2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
