//! Reactive value cell with subscription-based change notification.

use std::collections::BTreeMap;
use std::mem;
use std::sync::{Arc, Mutex, Weak};

use crate::storage::{KeyValueStorage, StorageError};

type Listener<T> = Box<dyn FnMut(&T) + Send>;

struct StoreInner<T> {
    data: T,
    next_listener_id: u64,
    listeners: BTreeMap<u64, Listener<T>>,
    /// Ids unsubscribed while their entry was checked out for a broadcast.
    retired: Vec<u64>,
    /// Values assigned from inside a broadcast, awaiting their own broadcast.
    queued: Vec<T>,
    broadcasting: bool,
}

/// A mutable value holder that broadcasts every assignment to its subscribers.
///
/// Cloning a `Store` produces another handle to the same cell, so persistence
/// closures and host code can observe one shared value.
///
/// Listeners run synchronously, in subscription order, once per [`Store::set`]
/// call — including assignments of an equal value. Listeners registered while
/// a broadcast is in flight are not invoked for that broadcast.
///
/// # Examples
///
/// ```
/// use livepen_core::store::Store;
///
/// let store = Store::new(0u32);
/// let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// store.subscribe(move |v| sink.lock().unwrap().push(*v));
/// store.set(7);
/// assert_eq!(store.get(), 7);
/// assert_eq!(*seen.lock().unwrap(), vec![7]);
/// ```
pub struct Store<T> {
    inner: Arc<Mutex<StoreInner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Store<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                data: initial,
                next_listener_id: 1,
                listeners: BTreeMap::new(),
                retired: Vec::new(),
                queued: Vec::new(),
                broadcasting: false,
            })),
        }
    }

    /// Registers `callback` to run on every subsequent assignment.
    ///
    /// The returned [`Subscription`] is the only way to remove the callback;
    /// dropping it leaves the subscription active.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<T>
    where
        F: FnMut(&T) + Send + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_listener_id;
        inner.next_listener_id = inner.next_listener_id.saturating_add(1);
        inner.listeners.insert(id, Box::new(callback));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }
}

impl<T: Clone> Store<T> {
    /// Returns a clone of the current value. No side effects.
    pub fn get(&self) -> T {
        self.inner.lock().unwrap().data.clone()
    }

    /// Replaces the current value and notifies every subscriber registered at
    /// call time, in subscription order, with the new value.
    ///
    /// The listener map is checked out of the lock for the duration of the
    /// broadcast, so listeners may call back into the store. A re-entrant
    /// `set` from inside a listener updates the value immediately and queues
    /// its own broadcast, which the outermost call runs after the current one
    /// completes; every assignment thus notifies every subscriber exactly
    /// once, in assignment order. A listener that assigns unconditionally on
    /// every notification never converges. A panicking listener aborts the
    /// remaining broadcast and drops the checked-out listeners.
    pub fn set(&self, value: T) {
        let mut checked_out = {
            let mut inner = self.inner.lock().unwrap();
            inner.data = value.clone();
            if inner.broadcasting {
                inner.queued.push(value);
                return;
            }
            inner.broadcasting = true;
            mem::take(&mut inner.listeners)
        };
        let mut current = value;
        loop {
            for listener in checked_out.values_mut() {
                listener(&current);
            }
            let mut inner = self.inner.lock().unwrap();
            let retired = mem::take(&mut inner.retired);
            for (id, listener) in checked_out {
                if !retired.contains(&id) {
                    inner.listeners.insert(id, listener);
                }
            }
            if inner.queued.is_empty() {
                inner.broadcasting = false;
                return;
            }
            // each queued assignment broadcasts to a fresh snapshot, so
            // unsubscribes and new subscriptions from earlier rounds apply
            current = inner.queued.remove(0);
            checked_out = mem::take(&mut inner.listeners);
        }
    }
}

impl Store<String> {
    /// Wires write-through persistence: every new value is handed to
    /// `storage.set_item(key, ..)`.
    ///
    /// Sugar over [`Store::subscribe`]. Write failures are not retried and not
    /// surfaced; the store keeps broadcasting regardless.
    pub fn persist(&self, key: &str, storage: Arc<dyn KeyValueStorage>) -> Subscription<String> {
        let key = key.to_string();
        self.subscribe(move |value: &String| {
            let _ = storage.set_item(&key, value);
        })
    }

    /// One-time silent initialization read: assigns the value stored under
    /// `key` directly, without notifying subscribers.
    ///
    /// A missing field leaves the current value untouched. A malformed stored
    /// payload propagates as [`StorageError`].
    pub fn load(&self, key: &str, storage: &dyn KeyValueStorage) -> Result<(), StorageError> {
        if let Some(value) = storage.get_item(key)? {
            self.inner.lock().unwrap().data = value;
        }
        Ok(())
    }
}

/// Capability to remove one subscription from a [`Store`].
///
/// Calling [`Subscription::unsubscribe`] twice is a no-op the second time.
/// Holds only a weak handle, so an outstanding capability does not keep the
/// store alive.
pub struct Subscription<T> {
    inner: Weak<Mutex<StoreInner<T>>>,
    id: u64,
}

impl<T> Subscription<T> {
    /// Removes the subscribed callback. Idempotent.
    ///
    /// When called from inside a broadcast (the entry is checked out), the
    /// removal takes effect once the broadcast completes.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.lock().unwrap();
            if inner.listeners.remove(&self.id).is_none() && inner.broadcasting {
                inner.retired.push(self.id);
            }
        }
    }
}
