//! Runtime event stream payloads.

use crate::types::{QuerySeq, TripId};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripEvent {
    /// A trip was appended.
    Added {
        /// New trip id.
        id: TripId,
    },
    /// A trip was replaced in place.
    Edited {
        /// Edited trip id.
        id: TripId,
    },
    /// A trip was removed.
    Deleted {
        /// Removed trip id.
        id: TripId,
    },
    /// The filter changed and the view was re-derived.
    FilterApplied {
        /// Trips passing the new filter.
        visible: usize,
    },
    /// Suggestions now reflect the query with this sequence number.
    SuggestionsUpdated {
        /// Query sequence number.
        seq: QuerySeq,
        /// Number of suggestions.
        count: usize,
    },
    /// The last mutation could not be written to the slot.
    PersistFailed,
}
