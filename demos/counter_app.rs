//! Complete counter application demonstrating all features together
//!
//! Run with `RUST_LOG=observable_store=trace` to see the store's own events.

use observable_store::{create_store, SelectorBinding};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, PartialEq)]
struct CounterState {
    count: i32,
    step: i32,
    history: Vec<i32>,
}

impl CounterState {
    fn new() -> Self {
        Self {
            count: 0,
            step: 1,
            history: vec![0],
        }
    }

    fn increment(&mut self) {
        self.count += self.step;
        self.history.push(self.count);
    }

    fn decrement(&mut self) {
        self.count -= self.step;
        self.history.push(self.count);
    }
}

fn main() -> observable_store::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Complete Counter Application ===\n");

    println!("1. Initializing counter store");
    let store = create_store(CounterState::new(), |reducers| {
        reducers
            .add("increment", CounterState::increment)
            .add("decrement", CounterState::decrement)
            .add_with("set_step", |state: &mut CounterState, step: i32| {
                state.step = step
            })
    })?;

    // Log every change
    store.subscribe(|state| {
        println!("   [State] Count: {}, Step: {}", state.count, state.step);
    });

    // Only step changes
    store
        .on(|state: &CounterState| state.step)
        .subscribe(|state| println!("   [Step] now {}", state.step));

    println!("\n2. Priming subscribers");
    store.init();

    println!("\n3. Binding derived values");
    let is_positive = SelectorBinding::new(&store, |state: &CounterState| state.count > 0);
    let is_even = SelectorBinding::new(&store, |state: &CounterState| state.count % 2 == 0);
    let absolute_value = SelectorBinding::new(&store, |state: &CounterState| state.count.abs());

    let print_bindings = || {
        println!(
            "   Positive: {} | Even: {} | Abs: {}",
            is_positive.get(),
            is_even.get(),
            absolute_value.get()
        );
    };
    print_bindings();

    println!("\n4. Incrementing...");
    for _ in 0..3 {
        store.reducers().call("increment")?;
        print_bindings();
    }

    println!("\n5. Changing step size to 5");
    store.reducers().call_with("set_step", 5)?;

    println!("\n6. Decrementing with new step...");
    for _ in 0..3 {
        store.reducers().call("decrement")?;
        print_bindings();
    }

    println!("\n7. History:");
    store.read(|state| println!("   {:?}", state.history));

    println!("\n8. Resetting (subscribers are not notified)...");
    store.reset_state();
    println!("   {:?}", store.get_state());

    println!("\n9. Re-priming subscribers after reset");
    store.init();

    println!(
        "\n   Even binding received {} updates",
        is_even.version()
    );
    println!("\n✓ Counter application complete!");
    Ok(())
}
