use crate::id::IdCreator;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Callback invoked with the state snapshot of a notification pass.
pub(crate) type Callback<S> = Box<dyn Fn(&S) + Send + Sync>;

/// Firing condition, evaluated as `condition(previous, snapshot)`.
pub(crate) type Condition<S> = Arc<dyn Fn(&S, &S) -> bool + Send + Sync>;

pub(crate) fn always<S: 'static>() -> Condition<S> {
    Arc::new(|_: &S, _: &S| true)
}

/// A registered callback plus its firing condition.
pub(crate) struct Subscription<S> {
    id: u64,
    callback: Callback<S>,
    condition: Condition<S>,
    active: AtomicBool,
}

impl<S> Subscription<S> {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn should_fire(&self, previous: &S, snapshot: &S) -> bool {
        (self.condition)(previous, snapshot)
    }

    pub(crate) fn fire(&self, snapshot: &S) {
        (self.callback)(snapshot)
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Removal seam used by [`Unsubscribe`], independent of the state type.
trait SubscriptionRegistry: Send + Sync {
    fn remove(&self, id: u64) -> bool;
}

/// Ordered list of subscriptions owned by one store.
pub(crate) struct SubscriptionList<S> {
    entries: Mutex<Vec<Arc<Subscription<S>>>>,
    ids: Mutex<IdCreator>,
}

impl<S: Send + Sync + 'static> SubscriptionList<S> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            ids: Mutex::new(IdCreator::new()),
        }
    }

    /// Append a subscription and hand back its removal handle.
    pub(crate) fn insert(
        self: &Arc<Self>,
        callback: Callback<S>,
        condition: Condition<S>,
    ) -> Unsubscribe {
        let id = self.ids.lock().create_id();
        let subscription = Arc::new(Subscription {
            id,
            callback,
            condition,
            active: AtomicBool::new(true),
        });
        self.entries.lock().push(subscription);

        let registry: Weak<Self> = Arc::downgrade(self);
        let registry: Weak<dyn SubscriptionRegistry> = registry;
        Unsubscribe { id, registry }
    }

    /// Subscriptions registered right now, in registration order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Subscription<S>>> {
        self.entries.lock().clone()
    }

    pub(crate) fn clear(&self) -> usize {
        let removed: Vec<_> = self.entries.lock().drain(..).collect();
        for subscription in &removed {
            subscription.deactivate();
        }
        removed.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl<S: Send + Sync + 'static> SubscriptionRegistry for SubscriptionList<S> {
    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|subscription| subscription.id == id) {
            Some(index) => {
                entries.remove(index).deactivate();
                true
            }
            None => false,
        }
    }
}

/// Handle returned by `subscribe`. Removes exactly one subscription.
///
/// Dropping the handle keeps the subscription alive; call
/// [`Unsubscribe::unsubscribe`] to stop notifications.
#[derive(Clone)]
pub struct Unsubscribe {
    id: u64,
    registry: Weak<dyn SubscriptionRegistry>,
}

impl Unsubscribe {
    /// Remove the subscription. Calling this again is a no-op, as is calling
    /// it after the store cleared all subscriptions or was dropped.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                debug!(id = self.id, "unsubscribed");
            }
        }
    }

    /// Id of the subscription this handle removes.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}

/// A subscribable view over a derived slice of state, returned by `Store::on`.
///
/// Subscriptions made through it fire only when the selected value differs
/// between the previous snapshot and the current one.
pub struct Subscribable<S> {
    list: Arc<SubscriptionList<S>>,
    condition: Condition<S>,
}

impl<S: Send + Sync + 'static> Subscribable<S> {
    pub(crate) fn new<V, F>(list: Arc<SubscriptionList<S>>, selector: F) -> Self
    where
        V: PartialEq + 'static,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        Self {
            list,
            condition: Arc::new(move |previous: &S, snapshot: &S| {
                selector(previous) != selector(snapshot)
            }),
        }
    }

    /// Register a callback for changes of the selected value.
    pub fn subscribe<F>(&self, callback: F) -> Unsubscribe
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.list.insert(Box::new(callback), Arc::clone(&self.condition))
    }
}
