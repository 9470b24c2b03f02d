//! Integration tests for the observable store

use observable_store::{create_store, IdCreator, Store, StoreError, Unsubscribe};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

#[derive(Clone, Debug, PartialEq)]
struct CounterState {
    counter: i32,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn counter_store() -> Store<CounterState> {
    init_tracing();
    create_store(CounterState { counter: 0 }, |reducers| {
        reducers
            .add("increment", |state: &mut CounterState| state.counter += 1)
            .add("decrement", |state: &mut CounterState| state.counter -= 1)
            .add_with("plus", |state: &mut CounterState, amount: i32| {
                state.counter += amount
            })
            .add_with("minus", |state: &mut CounterState, amount: i32| {
                state.counter -= amount
            })
    })
    .unwrap()
}

fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(&CounterState) + Send + Sync + 'static {
    let counter = counter.clone();
    move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn initial_state_is_structurally_equal() {
    let store = counter_store();
    assert_eq!(store.get_state(), CounterState { counter: 0 });
}

#[test]
fn init_primes_subscribers() {
    let store = counter_store();
    let initialized = Arc::new(AtomicUsize::new(0));

    store.subscribe(counting(&initialized));
    store.init();

    assert_eq!(initialized.load(Ordering::SeqCst), 1);
    assert_eq!(store.get_state().counter, 0);
}

#[test]
fn init_ignores_selector_conditions() {
    let store = counter_store();
    let plain = Arc::new(AtomicUsize::new(0));
    let selected = Arc::new(AtomicUsize::new(0));

    store.subscribe(counting(&plain));
    store
        .on(|state: &CounterState| state.counter)
        .subscribe(counting(&selected));

    store.init();

    assert_eq!(plain.load(Ordering::SeqCst), 1);
    assert_eq!(selected.load(Ordering::SeqCst), 1);
}

#[test]
fn on_fires_only_for_selected_slice() {
    #[derive(Clone, Debug, PartialEq)]
    struct Pair {
        a: i32,
        b: i32,
    }

    let store = Store::new(Pair { a: 0, b: 0 }, |reducers| {
        reducers
            .add("increment_a", |state: &mut Pair| state.a += 1)
            .add("increment_b", |state: &mut Pair| state.b += 1)
    })
    .unwrap();

    let callback_calls = Arc::new(AtomicUsize::new(0));
    let calls = callback_calls.clone();
    store.on(|state: &Pair| state.a).subscribe(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    });

    store.reducers().call("increment_a").unwrap();
    store.reducers().call("increment_a").unwrap();
    store.reducers().call("increment_b").unwrap();

    assert_eq!(callback_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn on_compares_structurally_not_by_identity() {
    #[derive(Clone, Debug, PartialEq)]
    struct Nested {
        items: Vec<Vec<String>>,
        touched: u32,
    }

    let store = Store::new(
        Nested {
            items: vec![vec!["a".to_string()]],
            touched: 0,
        },
        |reducers| {
            reducers
                // Rebuilds the slice with equal contents.
                .add("rebuild", |state: &mut Nested| {
                    state.items = state.items.iter().map(|row| row.to_vec()).collect();
                    state.touched += 1;
                })
                .add_with("push", |state: &mut Nested, item: String| {
                    state.items[0].push(item)
                })
        },
    )
    .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    store
        .on(|state: &Nested| state.items.clone())
        .subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

    store.reducers().call("rebuild").unwrap();
    store.reducers().call("rebuild").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    store.reducers().call_with("push", "b".to_string()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn subscribe_counts_every_call_in_order() {
    let store = counter_store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    store.subscribe(move |state| seen_clone.lock().push(state.counter));

    store.reducers().call("increment").unwrap();
    store.reducers().call_with("plus", 10).unwrap();
    store.reducers().call("decrement").unwrap();
    store.reducers().call_with("minus", 4).unwrap();

    assert_eq!(*seen.lock(), vec![1, 11, 10, 6]);
}

#[test]
fn unsubscribe_stops_notifications() {
    let store = counter_store();
    let calls = Arc::new(AtomicUsize::new(0));

    let unsubscribe = store.subscribe(counting(&calls));

    store.reducers().call("increment").unwrap();
    store.reducers().call("decrement").unwrap();

    unsubscribe.unsubscribe();

    store.reducers().call("increment").unwrap();
    store.reducers().call("decrement").unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Safe to call twice.
    unsubscribe.unsubscribe();
    assert_eq!(store.subscription_count(), 0);
}

#[test]
fn unsubscribe_removes_only_its_subscription() {
    let store = counter_store();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let unsubscribe_first = store.subscribe(counting(&first));
    store.subscribe(counting(&second));

    unsubscribe_first.unsubscribe();
    store.reducers().call("increment").unwrap();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn reset_state_restores_initial_state() {
    let store = counter_store();

    store.reducers().call("increment").unwrap();
    store.reducers().call("increment").unwrap();
    store.reducers().call("increment").unwrap();
    assert_eq!(store.get_state().counter, 3);

    store.reset_state();
    assert_eq!(store.get_state().counter, 0);

    // Reducers keep operating on the restored state.
    store.reducers().call("increment").unwrap();
    assert_eq!(store.get_state().counter, 1);
}

#[test]
fn reset_state_does_not_notify() {
    let store = counter_store();
    let calls = Arc::new(AtomicUsize::new(0));

    store.reducers().call("increment").unwrap();
    store.subscribe(counting(&calls));
    store.reset_state();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn clear_all_subscriptions() {
    let store = counter_store();
    let updates = Arc::new(AtomicUsize::new(0));

    let unsubscribe = store.subscribe(counting(&updates));
    store.subscribe(counting(&updates));

    store.reducers().call("increment").unwrap();
    assert_eq!(updates.load(Ordering::SeqCst), 2);

    store.clear_all_subscriptions();

    store.reducers().call("increment").unwrap();
    store.reducers().call("decrement").unwrap();
    store.init();

    assert_eq!(updates.load(Ordering::SeqCst), 2);

    // Unsubscribing a cleared subscription is a silent no-op.
    unsubscribe.unsubscribe();
    assert_eq!(store.subscription_count(), 0);
}

#[test]
fn subscription_removed_mid_pass_is_skipped() {
    let store = counter_store();
    let later_calls = Arc::new(AtomicUsize::new(0));
    let handle: Arc<Mutex<Option<Unsubscribe>>> = Arc::new(Mutex::new(None));

    let to_remove = handle.clone();
    store.subscribe(move |_| {
        if let Some(unsubscribe) = to_remove.lock().take() {
            unsubscribe.unsubscribe();
        }
    });
    *handle.lock() = Some(store.subscribe(counting(&later_calls)));

    store.reducers().call("increment").unwrap();
    store.reducers().call("increment").unwrap();

    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.subscription_count(), 1);
}

#[test]
fn subscription_added_mid_pass_waits_for_next_pass() {
    let store = counter_store();
    let added_calls = Arc::new(AtomicUsize::new(0));
    let added = Arc::new(AtomicUsize::new(0));

    let inner_store = store.clone();
    let inner_calls = added_calls.clone();
    let added_clone = added.clone();
    store.subscribe(move |_| {
        if added_clone.fetch_add(1, Ordering::SeqCst) == 0 {
            inner_store.subscribe(counting(&inner_calls));
        }
    });

    store.reducers().call("increment").unwrap();
    assert_eq!(added_calls.load(Ordering::SeqCst), 0);

    store.reducers().call("increment").unwrap();
    assert_eq!(added_calls.load(Ordering::SeqCst), 1);

    store.clear_all_subscriptions();
}

#[test]
fn reentrant_reducer_call_runs_nested_pass() {
    let store = counter_store();
    let seen = Arc::new(Mutex::new(Vec::new()));

    // Clamp the counter back to 2 whenever it goes above.
    let inner_store = store.clone();
    store.subscribe(move |state| {
        if state.counter > 2 {
            inner_store.reducers().call("decrement").unwrap();
        }
    });
    let seen_clone = seen.clone();
    store.subscribe(move |state| seen_clone.lock().push(state.counter));

    store.reducers().call_with("plus", 3).unwrap();

    // The nested pass completes before the outer pass reaches the second
    // subscriber, which still sees the outer snapshot.
    assert_eq!(*seen.lock(), vec![2, 3]);
    assert_eq!(store.get_state().counter, 2);

    store.clear_all_subscriptions();
}

#[test]
fn failed_calls_leave_store_untouched() {
    let store = counter_store();
    let calls = Arc::new(AtomicUsize::new(0));
    store.subscribe(counting(&calls));

    assert_eq!(
        store.reducers().call("double"),
        Err(StoreError::UnknownReducer("double".to_string()))
    );
    assert!(matches!(
        store.reducers().call_with("plus", "ten"),
        Err(StoreError::PayloadMismatch { .. })
    ));

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.get_state().counter, 0);
}

#[test]
fn reducer_names_in_registration_order() {
    let store = counter_store();

    assert_eq!(
        store.reducers().names().collect::<Vec<_>>(),
        vec!["increment", "decrement", "plus", "minus"]
    );
    assert!(store.reducers().contains("plus"));
    assert!(!store.reducers().contains("double"));
}

#[test]
fn subscribers_from_many_threads() {
    let store = counter_store();
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let calls = calls.clone();
            std::thread::spawn(move || {
                store
                    .on(|state: &CounterState| state.counter)
                    .subscribe(counting(&calls))
            })
        })
        .collect();
    let unsubscribes: Vec<Unsubscribe> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    store.reducers().call("increment").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    for unsubscribe in &unsubscribes {
        unsubscribe.unsubscribe();
    }
    store.reducers().call("increment").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn id_creator_issues_distinct_ids() {
    let mut ids = IdCreator::new();
    let issued: HashSet<u64> = (0..100).map(|_| ids.create_id()).collect();

    assert_eq!(issued.len(), 100);
}
