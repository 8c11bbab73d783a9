use crate::{
    persist::{self, TripSlot},
    query::{
        filter::{self, FilterSpec},
        order,
        stats::{self, Stats},
    },
    trip::{Trip, TripDraft},
    types::{TripId, ViewMode},
    view::{self, View},
};

use super::store::{Outcome, StoreError, TripStore};

/// Owns the canonical list, its slot, and the filtered view derived from them.
///
/// Every mutation rewrites the whole slot and re-derives the view.
pub struct TripTracker {
    store: TripStore,
    slot: Box<dyn TripSlot>,
    filter: FilterSpec,
    visible: Vec<TripId>,
    durable: bool,
}

impl TripTracker {
    /// Loads the list from `slot`; unreadable contents start an empty session.
    pub fn open(slot: Box<dyn TripSlot>) -> Self {
        let store = TripStore::from_trips(persist::load(&*slot));
        let mut tracker = Self {
            store,
            slot,
            filter: FilterSpec::default(),
            visible: Vec::new(),
            durable: true,
        };
        tracker.refilter();
        tracker
    }

    /// Appends a fully formed trip.
    pub fn add(&mut self, trip: Trip) -> Result<TripId, StoreError> {
        let id = self.store.add(trip)?;
        self.commit();
        Ok(id)
    }

    /// Appends a trip built from `draft` under the next free id.
    pub fn insert(&mut self, draft: TripDraft) -> Result<TripId, StoreError> {
        let id = self.store.insert(draft)?;
        self.commit();
        Ok(id)
    }

    /// Replaces the trip with `trip.id` in place.
    pub fn edit(&mut self, trip: Trip) -> Outcome {
        let outcome = self.store.edit(trip);
        if outcome.is_applied() {
            self.commit();
        }
        outcome
    }

    /// Removes the trip with `id`.
    pub fn delete(&mut self, id: TripId) -> Outcome {
        let outcome = self.store.delete(id);
        if outcome.is_applied() {
            self.commit();
        }
        outcome
    }

    /// Replaces the active filter and re-derives the view.
    pub fn set_filter(&mut self, spec: FilterSpec) {
        self.filter = spec;
        self.refilter();
    }

    /// Active filter.
    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Canonical list.
    pub fn trips(&self) -> &[Trip] {
        self.store.trips()
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &TripStore {
        &self.store
    }

    /// Trips passing the active filter, in list order.
    pub fn filtered(&self) -> Vec<&Trip> {
        self.visible
            .iter()
            .filter_map(|id| self.store.get(*id))
            .collect()
    }

    /// Ids passing the active filter.
    pub fn visible_ids(&self) -> &[TripId] {
        &self.visible
    }

    /// Filtered trips, newest first.
    pub fn timeline(&self) -> Vec<&Trip> {
        order::chronological(self.filtered())
    }

    /// Statistics over the filtered trips.
    pub fn stats(&self) -> Stats {
        stats::aggregate(self.filtered())
    }

    /// Payload for `mode` built from the filtered trips.
    pub fn view(&self, mode: ViewMode) -> View {
        view::select(mode, self.filtered())
    }

    /// Distinct companions across the canonical list.
    pub fn known_people(&self) -> Vec<&str> {
        filter::known_people(self.store.trips())
    }

    /// False when the most recent save failed.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    fn commit(&mut self) {
        self.durable = persist::save(&mut *self.slot, self.store.trips());
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible = filter::apply(self.store.trips(), &self.filter)
            .into_iter()
            .map(|t| t.id)
            .collect();
    }
}
