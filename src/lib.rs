//! # Observable Store
//!
//! A minimal observable state container for Rust.
//!
//! A store is created from an initial state and a reducer creator that
//! registers named mutators. The store exposes:
//! - `get_state` - an independent clone of the current state
//! - `subscribe` - callbacks run after every reducer call
//! - `on(selector).subscribe` - callbacks run only when the selected slice changes
//! - `reducers` - the wrapped mutators, each call notifying subscribers once
//! - `init`, `reset_state`, `clear_all_subscriptions` - lifecycle controls
//!
//! `SelectorBinding` keeps a selected value in sync with a store and
//! unsubscribes when dropped.
//!
//! ```
//! use observable_store::create_store;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Counter {
//!     count: i32,
//! }
//!
//! let store = create_store(Counter { count: 0 }, |reducers| {
//!     reducers
//!         .add("increment", |state: &mut Counter| state.count += 1)
//!         .add_with("plus", |state: &mut Counter, amount: i32| state.count += amount)
//! })
//! .unwrap();
//!
//! let unsubscribe = store.subscribe(|state| println!("count is {}", state.count));
//! store.reducers().call("increment").unwrap();
//! store.reducers().call_with("plus", 4).unwrap();
//! unsubscribe.unsubscribe();
//!
//! assert_eq!(store.get_state(), Counter { count: 5 });
//! ```

pub mod binding;
pub mod error;
pub mod id;
pub mod store;

// Re-export main types for convenience
pub use binding::SelectorBinding;
pub use error::{Result, StoreError};
pub use id::IdCreator;
pub use store::{create_store, ReducerSet, Reducers, Store, Subscribable, Unsubscribe};
