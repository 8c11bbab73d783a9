//! Canonical trip list and the session that owns it.

/// Canonical trip list with id-keyed mutations.
pub mod store;
/// Session container tying the store to persistence and the filtered view.
pub mod tracker;
