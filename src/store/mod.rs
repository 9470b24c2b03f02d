//! The observable store engine.
//!
//! A store owns one state value. It changes only through named reducers,
//! each call notifies subscribers once, and selector subscriptions fire only
//! when their selected slice changes.

mod reducers;
mod store;
mod subscription;

pub use reducers::{ReducerSet, Reducers};
pub(crate) use store::StateHandle;
pub use store::{create_store, Store};
pub use subscription::{Subscribable, Unsubscribe};
