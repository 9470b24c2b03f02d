//! Bindings that keep a selected value in sync with a store.

mod binding;

pub use binding::SelectorBinding;
