//! Unique identifiers for subscriptions.
//!
//! Ids are seeded from the wall clock and probed upward on collision, so they
//! stay unique within one creator even when many are issued in the same
//! millisecond.

mod id_creator;

pub use id_creator::IdCreator;
