use super::reducers::{Payload, RawReducer, ReducerSet, Reducers, WrappedReducer};
use super::subscription::{always, Subscribable, SubscriptionList, Unsubscribe};
use crate::error::Result;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// State shared by a store, its clones and its wrapped reducers.
struct Shared<S> {
    initial: S,
    state: RwLock<S>,
    previous: RwLock<S>,
    subscriptions: Arc<SubscriptionList<S>>,
}

impl<S: Clone + Send + Sync + 'static> Shared<S> {
    fn snapshot(&self) -> S {
        self.state.read().clone()
    }

    /// Run one notification pass.
    ///
    /// With `force` set every active subscription fires regardless of its
    /// condition. No lock is held while a callback runs, so callbacks may call
    /// reducers and start nested passes.
    fn notify(&self, force: bool) {
        let snapshot = self.snapshot();
        let subscriptions = self.subscriptions.snapshot();
        trace!(subscriptions = subscriptions.len(), force, "notification pass");

        for subscription in &subscriptions {
            // Removed earlier in this pass.
            if !subscription.is_active() {
                continue;
            }
            if !force {
                let changed = {
                    let previous = self.previous.read();
                    subscription.should_fire(&previous, &snapshot)
                };
                if !changed {
                    continue;
                }
            }
            subscription.fire(&snapshot);
        }

        let current = self.snapshot();
        *self.previous.write() = current;
    }
}

fn intercept<S>(shared: &Arc<Shared<S>>, name: &str, raw: RawReducer<S>) -> WrappedReducer
where
    S: Clone + Send + Sync + 'static,
{
    let shared = Arc::clone(shared);
    let name = name.to_string();
    Box::new(move |payload: Payload| -> Result<()> {
        trace!(reducer = %name, "reducer called");
        {
            let mut state = shared.state.write();
            raw(&mut *state, payload)?;
        }
        shared.notify(false);
        Ok(())
    })
}

/// An observable state container.
///
/// The store owns the state. It changes only through the reducers registered
/// at construction, and every reducer call notifies subscribers once. Reads
/// hand out clones, so nothing outside the store can alias its state.
///
/// Clones of a store share the same state and subscriptions.
///
/// # Examples
///
/// ```
/// use observable_store::Store;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Counter {
///     a: i32,
///     b: i32,
/// }
///
/// let store = Store::new(Counter { a: 0, b: 0 }, |reducers| {
///     reducers
///         .add("increment_a", |state: &mut Counter| state.a += 1)
///         .add("increment_b", |state: &mut Counter| state.b += 1)
/// })
/// .unwrap();
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let calls_clone = calls.clone();
/// store.on(|state: &Counter| state.a).subscribe(move |_| {
///     calls_clone.fetch_add(1, Ordering::SeqCst);
/// });
///
/// store.reducers().call("increment_a").unwrap();
/// store.reducers().call("increment_b").unwrap();
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub struct Store<S> {
    shared: Arc<Shared<S>>,
    reducers: Arc<Reducers>,
}

impl<S: Clone + Send + Sync + 'static> Store<S> {
    /// Create a store from an initial state and a reducer creator.
    ///
    /// The creator runs once, before this returns. Fails if a reducer name is
    /// empty or registered twice.
    pub fn new<C>(initial_state: S, reducer_creator: C) -> Result<Self>
    where
        C: FnOnce(ReducerSet<S>) -> ReducerSet<S>,
    {
        let state = initial_state.clone();
        let previous = state.clone();
        let shared = Arc::new(Shared {
            initial: initial_state,
            state: RwLock::new(state),
            previous: RwLock::new(previous),
            subscriptions: Arc::new(SubscriptionList::new()),
        });

        let reducers =
            reducer_creator(ReducerSet::new()).wrap(|name, raw| intercept(&shared, name, raw))?;
        debug!(reducers = reducers.len(), "store created");

        Ok(Self {
            shared,
            reducers: Arc::new(reducers),
        })
    }

    /// Get a clone of the current state.
    pub fn get_state(&self) -> S {
        self.shared.snapshot()
    }

    /// Read state without cloning it.
    ///
    /// The closure must not call back into this store.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let state = self.shared.state.read();
        f(&*state)
    }

    /// Subscribe to every notification pass.
    pub fn subscribe<F>(&self, callback: F) -> Unsubscribe
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.shared
            .subscriptions
            .insert(Box::new(callback), always())
    }

    /// Subscribe to changes of a derived value.
    ///
    /// Callbacks registered through the returned view fire only when
    /// `selector` yields unequal values for the previous and current state.
    pub fn on<V, F>(&self, selector: F) -> Subscribable<S>
    where
        V: PartialEq + 'static,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        Subscribable::new(Arc::clone(&self.shared.subscriptions), selector)
    }

    /// The wrapped reducers.
    pub fn reducers(&self) -> &Reducers {
        &self.reducers
    }

    /// Notify every subscription once with the current state, ignoring
    /// selector conditions.
    pub fn init(&self) {
        self.shared.notify(true);
    }

    /// Restore the state captured at construction.
    ///
    /// This does not notify subscribers, unlike a reducer call. Call
    /// [`Store::init`] afterwards if they need the restored state.
    pub fn reset_state(&self) {
        *self.shared.state.write() = self.shared.initial.clone();
        debug!("state reset");
    }

    /// Remove every subscription.
    pub fn clear_all_subscriptions(&self) {
        let removed = self.shared.subscriptions.clear();
        debug!(removed, "subscriptions cleared");
    }

    /// Number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.shared.subscriptions.len()
    }

    /// A handle that reads the current state without keeping the store alive.
    pub(crate) fn state_handle(&self) -> StateHandle<S> {
        StateHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

/// Weak reader of a store's current state, held by subscribers that live
/// inside the store's own subscription list.
pub(crate) struct StateHandle<S> {
    shared: Weak<Shared<S>>,
}

impl<S: Clone + Send + Sync + 'static> StateHandle<S> {
    /// A clone of the current state, or `None` once the store is gone.
    pub(crate) fn get(&self) -> Option<S> {
        self.shared.upgrade().map(|shared| shared.snapshot())
    }
}

/// Create a new store. See [`Store::new`].
pub fn create_store<S, C>(initial_state: S, reducer_creator: C) -> Result<Store<S>>
where
    S: Clone + Send + Sync + 'static,
    C: FnOnce(ReducerSet<S>) -> ReducerSet<S>,
{
    Store::new(initial_state, reducer_creator)
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            reducers: Arc::clone(&self.reducers),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.shared.state.read())
            .field("reducers", &self.reducers)
            .finish()
    }
}
