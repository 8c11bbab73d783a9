//! Routes a filtered trip list to one presentation surface.

use serde::{Deserialize, Serialize};

use crate::{
    query::{
        order::chronological,
        stats::{Stats, aggregate},
    },
    trip::{DATE_FORMAT, Trip},
    types::{TripId, ViewMode},
};

/// Map pin for one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Trip id.
    pub id: TripId,
    /// Popup heading.
    pub title: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Popup body.
    pub description: String,
    /// Companions listed in the popup.
    pub people: Vec<String>,
}

impl From<&Trip> for MapMarker {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id,
            title: trip.title.clone(),
            lat: trip.lat,
            lng: trip.lng,
            description: trip.description.clone(),
            people: trip.people.clone(),
        }
    }
}

/// Timeline card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// `"start → end"`, `"start → ?"`, or `"Not specified"`.
    pub date_label: String,
    /// The trip shown on the card.
    pub trip: Trip,
}

/// Payload for the active surface.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Markers in list order.
    Map(Vec<MapMarker>),
    /// Cards, newest first.
    Timeline(Vec<TimelineEntry>),
    /// Dashboard metrics.
    Stats(Stats),
}

impl View {
    /// Surface this payload is for.
    pub fn mode(&self) -> ViewMode {
        match self {
            View::Map(_) => ViewMode::Map,
            View::Timeline(_) => ViewMode::Timeline,
            View::Stats(_) => ViewMode::Stats,
        }
    }
}

/// Builds the payload for `mode` from already-filtered trips.
pub fn select<'a, I>(mode: ViewMode, trips: I) -> View
where
    I: IntoIterator<Item = &'a Trip>,
{
    match mode {
        ViewMode::Map => View::Map(trips.into_iter().map(MapMarker::from).collect()),
        ViewMode::Timeline => View::Timeline(
            chronological(trips)
                .into_iter()
                .map(|trip| TimelineEntry {
                    date_label: date_label(trip),
                    trip: trip.clone(),
                })
                .collect(),
        ),
        ViewMode::Stats => View::Stats(aggregate(trips)),
    }
}

/// Human-readable date span for a timeline card.
pub fn date_label(trip: &Trip) -> String {
    let range = &trip.date_range;
    match (range.start, range.end) {
        (Some(start), Some(end)) => format!("{} → {}", start.format(DATE_FORMAT), end.format(DATE_FORMAT)),
        (Some(start), None) => format!("{} → ?", start.format(DATE_FORMAT)),
        (None, _) => "Not specified".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::DateRange;

    fn trip(id: TripId, start: &str, end: &str) -> Trip {
        Trip {
            id,
            title: format!("Place {id}, Country"),
            description: String::new(),
            people: vec![],
            photos: vec![],
            date_range: DateRange::parse(start, end),
            lat: 0.0,
            lng: 0.0,
        }
    }

    #[test]
    fn labels_follow_available_dates() {
        assert_eq!(date_label(&trip(1, "2024-01-01", "2024-01-10")), "2024-01-01 → 2024-01-10");
        assert_eq!(date_label(&trip(2, "2024-01-01", "")), "2024-01-01 → ?");
        assert_eq!(date_label(&trip(3, "", "2024-01-10")), "Not specified");
    }

    #[test]
    fn routes_to_requested_surface() {
        let trips = vec![trip(1, "2023-05-01", ""), trip(2, "2024-05-01", "")];
        for mode in [ViewMode::Map, ViewMode::Timeline, ViewMode::Stats] {
            assert_eq!(select(mode, &trips).mode(), mode);
        }

        let View::Timeline(entries) = select(ViewMode::Timeline, &trips) else {
            panic!("expected timeline");
        };
        assert_eq!(entries.iter().map(|e| e.trip.id).collect::<Vec<_>>(), vec![2, 1]);

        let View::Map(markers) = select(ViewMode::Map, &trips) else {
            panic!("expected map");
        };
        assert_eq!(markers.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
