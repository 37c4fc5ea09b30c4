//! Synchronous event emitter
//!
//! Listeners are plain callbacks. Firing snapshots the current listener list
//! and releases the lock before invoking them, so listeners can subscribe,
//! unsubscribe or trigger further events without deadlocking.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Callback type for event listeners
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct ListenerList<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
    disposed: bool,
}

/// Fan-out of events of type `E` to registered listeners
///
/// Cloning an emitter yields another handle to the same listener list.
pub struct Emitter<E> {
    inner: Arc<Mutex<ListenerList<E>>>,
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ListenerList {
                next_id: 0,
                listeners: Vec::new(),
                disposed: false,
            })),
        }
    }

    /// Register a listener
    ///
    /// The listener stays registered until the returned subscription is
    /// disposed or dropped. Subscribing to a disposed emitter is a no-op.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut list = self.inner.lock();
        if list.disposed {
            return Subscription::noop();
        }

        let id = list.next_id;
        list.next_id += 1;
        list.listeners.push((id, Arc::new(listener)));

        let weak: Weak<Mutex<ListenerList<E>>> = Arc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Deliver `event` to every listener registered at the time of the call
    pub fn fire(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = {
            let list = self.inner.lock();
            list.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Drop every listener and refuse new ones
    pub fn dispose(&self) {
        let mut list = self.inner.lock();
        list.disposed = true;
        list.listeners.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().disposed
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Handle to a registered listener; unsubscribes on drop
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn noop() -> Self {
        Self { unsubscribe: None }
    }

    /// Unsubscribe now
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
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
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
