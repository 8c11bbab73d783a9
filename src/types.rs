//! Shared primitive IDs and mode enums.

use serde::{Deserialize, Serialize};

/// Stable trip identifier.
pub type TripId = u64;

/// Sequence number issued to each geocoding query.
pub type QuerySeq = u64;

/// How the selected companions constrain a trip's `people`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeopleFilterMode {
    /// At least one selected companion must be present.
    #[default]
    Any,
    /// Every selected companion must be present.
    All,
}

/// Presentation surface the filtered trips are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Markers on a world map.
    #[default]
    Map,
    /// Most recent trip first.
    Timeline,
    /// Aggregate dashboard.
    Stats,
}
