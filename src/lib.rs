//! Trip log core: an owned trip list mirrored to one durable slot, with
//! filtering, statistics, and timeline ordering derived from it.
//!
//! # Examples
//!
//! In-memory usage with [`core::tracker::TripTracker`]:
//! ```
//! use tripmark::{
//!     core::tracker::TripTracker,
//!     geocode::PlaceCandidate,
//!     persist::MemorySlot,
//!     query::filter::FilterSpec,
//!     trip::{DateRange, TripDraft},
//!     types::PeopleFilterMode,
//! };
//!
//! let mut tracker = TripTracker::open(Box::new(MemorySlot::new()));
//! let mut draft = TripDraft::new();
//! draft.select_place(PlaceCandidate {
//!     id: "place.1".to_string(),
//!     place_name: "Rome, Lazio, Italy".to_string(),
//!     center: [12.49, 41.89],
//! });
//! draft.add_person("Amy");
//! draft.date_range = DateRange::parse("2024-02-01", "2024-02-05");
//! let id = tracker.insert(draft).expect("insert");
//! assert_eq!(id, 1);
//!
//! tracker.set_filter(FilterSpec::new().with_people(["Amy"], PeopleFilterMode::Any));
//! assert_eq!(tracker.filtered().len(), 1);
//! assert_eq!(tracker.stats().total_days, 4);
//! ```
//!
//! Runtime usage with a SQLite slot:
//! ```no_run
//! use tripmark::{
//!     core::tracker::TripTracker,
//!     persist::{sqlite::SqliteSlot, DEFAULT_SLOT_KEY},
//!     runtime::handle::{spawn_tracker, RuntimeConfig},
//!     types::ViewMode,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let slot = SqliteSlot::open("trips.db", DEFAULT_SLOT_KEY).expect("open sqlite");
//! let handle = spawn_tracker(TripTracker::open(Box::new(slot)), None, RuntimeConfig::default());
//! let _view = handle.view(ViewMode::Timeline).await.expect("view");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Canonical trip store and session container.
pub mod core;
/// Geocoding candidates and last-query-wins suggestions.
pub mod geocode;
/// Slot abstraction and its memory, file, and SQLite backends.
pub mod persist;
/// Filtering, ordering, and statistics.
pub mod query;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Trip records and drafts.
pub mod trip;
/// Shared primitive types and enums.
pub mod types;
/// Routing of filtered trips to presentation surfaces.
pub mod view;
