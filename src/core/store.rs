use hashbrown::HashMap;
use thiserror::Error;

use crate::{
    trip::{DraftError, Trip, TripDraft},
    types::TripId,
};

/// Store mutation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A trip with this id is already present.
    #[error("trip {0} already exists")]
    AlreadyExists(TripId),
    /// The trip's latitude or longitude is NaN or infinite.
    #[error("trip {id} has non-finite coordinates ({lat}, {lng})")]
    InvalidCoordinates {
        /// Offending trip.
        id: TripId,
        /// Rejected latitude.
        lat: f64,
        /// Rejected longitude.
        lng: f64,
    },
    /// The draft could not be turned into a trip.
    #[error("invalid draft: {0}")]
    Draft(#[from] DraftError),
}

/// Whether an edit or delete found its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The matching trip was replaced or removed.
    Applied,
    /// No trip had the requested id; the list is unchanged.
    Missing,
}

impl Outcome {
    /// True for [`Outcome::Applied`].
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

/// Canonical, ordered trip list.
#[derive(Debug, Default)]
pub struct TripStore {
    trips: Vec<Trip>,
    pos: HashMap<TripId, usize>,
    next_trip_id: TripId,
}

impl TripStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            next_trip_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a store from a persisted list. Later duplicates of an id are dropped.
    pub fn from_trips(trips: Vec<Trip>) -> Self {
        let mut store = Self::new();
        for trip in trips {
            if let Err(err) = store.add(trip) {
                log::warn!("dropping trip from persisted list: {err}");
            }
        }
        store
    }

    /// Appends `trip` to the end of the list.
    pub fn add(&mut self, trip: Trip) -> Result<TripId, StoreError> {
        if self.pos.contains_key(&trip.id) {
            return Err(StoreError::AlreadyExists(trip.id));
        }
        if !trip.has_finite_position() {
            return Err(StoreError::InvalidCoordinates {
                id: trip.id,
                lat: trip.lat,
                lng: trip.lng,
            });
        }

        let id = trip.id;
        self.next_trip_id = self.next_trip_id.max(id.saturating_add(1));
        self.pos.insert(id, self.trips.len());
        self.trips.push(trip);
        Ok(id)
    }

    /// Validates `draft`, assigns the next id, and appends it.
    pub fn insert(&mut self, draft: TripDraft) -> Result<TripId, StoreError> {
        let trip = draft.into_trip(self.next_trip_id)?;
        self.add(trip)
    }

    /// Replaces the trip with the same id, keeping its position.
    pub fn edit(&mut self, trip: Trip) -> Outcome {
        let Some(&idx) = self.pos.get(&trip.id) else {
            return Outcome::Missing;
        };
        self.trips[idx] = trip;
        Outcome::Applied
    }

    /// Removes the trip with `id`.
    pub fn delete(&mut self, id: TripId) -> Outcome {
        let Some(idx) = self.pos.remove(&id) else {
            return Outcome::Missing;
        };
        self.trips.remove(idx);
        for (offset, trip) in self.trips[idx..].iter().enumerate() {
            self.pos.insert(trip.id, idx + offset);
        }
        Outcome::Applied
    }

    /// The canonical list, in insertion order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Looks up a trip by id.
    pub fn get(&self, id: TripId) -> Option<&Trip> {
        self.pos.get(&id).map(|&idx| &self.trips[idx])
    }

    /// Ids in list order.
    pub fn ids(&self) -> impl Iterator<Item = TripId> + '_ {
        self.trips.iter().map(|t| t.id)
    }

    /// Id the next [`TripStore::insert`] will assign.
    pub fn next_id(&self) -> TripId {
        self.next_trip_id
    }

    /// Number of trips.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// True when the store holds no trips.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
