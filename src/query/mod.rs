//! Pure derivations over trip lists.

/// Filter predicates and their application.
pub mod filter;
/// Presentation ordering.
pub mod order;
/// Dashboard aggregation.
pub mod stats;
