use crate::store::{Store, Unsubscribe};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A value derived from a store that follows the store's changes.
///
/// The binding subscribes through [`Store::on`], so it updates only when the
/// selected value changes. The subscription is removed when the binding is
/// dropped.
///
/// # Examples
///
/// ```
/// use observable_store::{SelectorBinding, Store};
///
/// #[derive(Clone, PartialEq)]
/// struct Counter {
///     count: i32,
///     label: String,
/// }
///
/// let store = Store::new(
///     Counter { count: 0, label: "clicks".to_string() },
///     |reducers| reducers.add("increment", |state: &mut Counter| state.count += 1),
/// )
/// .unwrap();
///
/// let count = SelectorBinding::new(&store, |state: &Counter| state.count);
/// assert_eq!(count.get(), 0);
///
/// store.reducers().call("increment").unwrap();
/// assert_eq!(count.get(), 1);
/// ```
pub struct SelectorBinding<V> {
    value: Arc<RwLock<V>>,
    version: Arc<AtomicU64>,
    unsubscribe: Unsubscribe,
}

impl<V> SelectorBinding<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Bind to the slice of `store` picked by `selector`.
    ///
    /// On each update the selector runs against the store's current state,
    /// not the snapshot of the pass that triggered it, so a reducer called
    /// from another subscriber cannot leave the binding behind the store.
    /// The selector may read the store but must not call its reducers.
    pub fn new<S, F>(store: &Store<S>, selector: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        let selector = Arc::new(selector);
        let value = Arc::new(RwLock::new(selector(&store.get_state())));
        let version = Arc::new(AtomicU64::new(0));

        let unsubscribe = {
            let value = Arc::clone(&value);
            let version = Arc::clone(&version);
            let update = Arc::clone(&selector);
            let current = store.state_handle();
            store
                .on(move |state: &S| selector(state))
                .subscribe(move |snapshot| {
                    let selected = match current.get() {
                        Some(state) => update(&state),
                        None => update(snapshot),
                    };
                    *value.write() = selected;
                    version.fetch_add(1, Ordering::SeqCst);
                })
        };

        Self {
            value,
            version,
            unsubscribe,
        }
    }

    /// Get a clone of the bound value.
    pub fn get(&self) -> V {
        self.value.read().clone()
    }

    /// Read the bound value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&*self.value.read())
    }

    /// Number of updates received since the binding was created.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Stop following the store. The last value stays readable.
    pub fn unbind(&self) {
        self.unsubscribe.unsubscribe();
    }
}

impl<V> Drop for SelectorBinding<V> {
    fn drop(&mut self) {
        self.unsubscribe.unsubscribe();
    }
}
