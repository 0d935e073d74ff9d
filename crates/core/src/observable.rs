//! Push-based observable state.
//!
//! A minimal stand-in for the reactive property bindings UI surfaces attach
//! to: every mutation notifies all current subscribers synchronously, before
//! the mutating call returns. The internal lock is released before callbacks
//! run, so a callback may read the observable again without deadlocking.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Shared observable value with subscriber notification.
///
/// Cloning an `Observable` clones the handle, not the value; all clones see
/// and mutate the same state.
pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

struct Inner<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// Token returned by [`Observable::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = lock(&self.inner);
        f.debug_struct("Observable")
            .field("value", &guard.value)
            .field("subscribers", &guard.subscribers.len())
            .finish()
    }
}

fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone> Observable<T> {
    /// Create a new observable holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// A snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Replace the value and notify all subscribers synchronously.
    pub fn set(&self, value: T) {
        let (snapshot, subscribers) = {
            let mut guard = lock(&self.inner);
            guard.value = value;
            (guard.value.clone(), guard.subscribers.clone())
        };
        for (_, subscriber) in subscribers {
            subscriber(&snapshot);
        }
    }

    /// Mutate the value in place and notify all subscribers synchronously.
    pub fn update(&self, mutate: impl FnOnce(&mut T)) {
        let (snapshot, subscribers) = {
            let mut guard = lock(&self.inner);
            mutate(&mut guard.value);
            (guard.value.clone(), guard.subscribers.clone())
        };
        for (_, subscriber) in subscribers {
            subscriber(&snapshot);
        }
    }

    /// Register a subscriber for future mutations.
    ///
    /// The subscriber does not fire for the current value; call [`get`] first
    /// when the initial state matters.
    ///
    /// [`get`]: Observable::get
    pub fn subscribe(&self, subscriber: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let mut guard = lock(&self.inner);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.subscribers.push((id, Arc::new(subscriber)));
        Subscription(id)
    }

    /// Remove a subscriber. Unknown tokens are ignored.
    pub fn unsubscribe(&self, subscription: Subscription) {
        lock(&self.inner)
            .subscribers
            .retain(|(id, _)| *id != subscription.0);
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
