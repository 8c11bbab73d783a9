//! Trip record, date range, and the draft a form builds before submission.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{geocode::PlaceCandidate, types::TripId};

/// Calendar date format used on the wire and in date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date, treating blank or malformed text as absent.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(text, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(err) => {
            log::debug!("ignoring malformed date {text:?}: {err}");
            None
        }
    }
}

/// Inclusive pair of optional calendar dates.
///
/// Nothing enforces `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    /// First day, when known.
    #[serde(default, with = "date_text")]
    pub start: Option<NaiveDate>,
    /// Last day, when known.
    #[serde(default, with = "date_text")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Builds a range from two date strings; blank strings leave a bound open.
    pub fn parse(start: &str, end: &str) -> Self {
        Self {
            start: parse_date(start),
            end: parse_date(end),
        }
    }

    /// Whole days between the bounds, if both are present.
    pub fn days(&self) -> Option<u64> {
        let (start, end) = (self.start?, self.end?);
        Some((end - start).num_days().unsigned_abs())
    }

    /// True when neither bound is set.
    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// A single logged trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Stable identifier, never reassigned.
    pub id: TripId,
    /// Place name; also the unit of location statistics.
    pub title: String,
    /// Free text notes.
    #[serde(default)]
    pub description: String,
    /// Companion names in entry order.
    #[serde(default)]
    pub people: Vec<String>,
    /// Opaque photo references owned by whoever created them.
    #[serde(default)]
    pub photos: Vec<String>,
    /// Travel dates.
    #[serde(default)]
    pub date_range: DateRange,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Trip {
    /// Both coordinates are finite numbers. JSON has no encoding for NaN or infinity.
    pub fn has_finite_position(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// True when `name` is one of this trip's companions.
    pub fn has_person(&self, name: &str) -> bool {
        self.people.iter().any(|p| p == name)
    }

    /// Lower-cased title, description and companions joined by spaces.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(2 + self.people.len());
        parts.push(&self.title);
        parts.push(&self.description);
        parts.extend(self.people.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

/// Errors raised when a draft cannot become a [`Trip`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    /// No geocoded place was selected.
    #[error("no place selected")]
    MissingPlace,
    /// The selected place carries unusable coordinates.
    #[error("invalid coordinates lat={lat} lng={lng}")]
    InvalidCoordinates {
        /// Candidate latitude.
        lat: f64,
        /// Candidate longitude.
        lng: f64,
    },
}

/// Form state collected before a trip is added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TripDraft {
    /// Place chosen from geocoding suggestions.
    pub place: Option<PlaceCandidate>,
    /// Free text notes.
    pub description: String,
    /// Companion names; kept free of blanks and exact duplicates.
    pub people: Vec<String>,
    /// Photo references.
    pub photos: Vec<String>,
    /// Travel dates.
    pub date_range: DateRange,
}

impl TripDraft {
    /// Empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the chosen place.
    pub fn select_place(&mut self, place: PlaceCandidate) {
        self.place = Some(place);
    }

    /// Adds a trimmed companion name. Returns false for blank or repeated names.
    pub fn add_person(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.people.iter().any(|p| p == name) {
            return false;
        }
        self.people.push(name.to_string());
        true
    }

    /// Removes a companion. Returns false when the name was not present.
    pub fn remove_person(&mut self, name: &str) -> bool {
        let before = self.people.len();
        self.people.retain(|p| p != name);
        self.people.len() != before
    }

    /// Appends a photo reference.
    pub fn add_photo(&mut self, reference: impl Into<String>) {
        self.photos.push(reference.into());
    }

    /// Materializes the draft under `id`.
    pub fn into_trip(self, id: TripId) -> Result<Trip, DraftError> {
        let place = self.place.ok_or(DraftError::MissingPlace)?;
        let (lat, lng) = (place.lat(), place.lng());
        if !lat.is_finite() || !lng.is_finite() {
            return Err(DraftError::InvalidCoordinates { lat, lng });
        }

        Ok(Trip {
            id,
            title: place.place_name,
            description: self.description,
            people: self.people,
            photos: self.photos,
            date_range: self.date_range,
            lat,
            lng,
        })
    }
}

/// Serde adapter writing absent dates as `""`, as date inputs do.
mod date_text {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{DATE_FORMAT, parse_date};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => s.collect_str(&date.format(DATE_FORMAT)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().and_then(parse_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place() -> PlaceCandidate {
        PlaceCandidate {
            id: "place.1".to_string(),
            place_name: "Paris, Île-de-France, France".to_string(),
            center: [2.35, 48.85],
        }
    }

    #[test]
    fn days_is_absolute_and_needs_both_bounds() {
        assert_eq!(DateRange::parse("2024-01-10", "2024-01-01").days(), Some(9));
        assert_eq!(DateRange::parse("2024-01-01", "").days(), None);
        assert_eq!(DateRange::parse("", "").days(), None);
    }

    #[test]
    fn malformed_dates_are_absent() {
        let range = DateRange::parse("not a date", " 2024-02-03 ");
        assert_eq!(range.start, None);
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 2, 3));
    }

    #[test]
    fn draft_trims_and_dedups_people() {
        let mut draft = TripDraft::new();
        assert!(draft.add_person("  Amy "));
        assert!(!draft.add_person("Amy"));
        assert!(!draft.add_person("   "));
        assert!(draft.add_person("Bo"));
        assert!(draft.remove_person("Amy"));
        assert!(!draft.remove_person("Amy"));
        assert_eq!(draft.people, vec!["Bo".to_string()]);
    }

    #[test]
    fn draft_requires_place() {
        assert_eq!(TripDraft::new().into_trip(1), Err(DraftError::MissingPlace));

        let mut draft = TripDraft::new();
        draft.select_place(place());
        let trip = draft.into_trip(7).unwrap();
        assert_eq!(trip.id, 7);
        assert_eq!(trip.title, "Paris, Île-de-France, France");
        assert_eq!((trip.lat, trip.lng), (48.85, 2.35));
    }

    #[test]
    fn missing_optional_fields_deserialize_empty() {
        let trip: Trip = serde_json::from_str(r#"{"id":3,"title":"Oslo, Norway","lat":59.9,"lng":10.7}"#).unwrap();
        assert!(trip.people.is_empty());
        assert!(trip.description.is_empty());
        assert!(trip.date_range.is_open());

        let blank: Trip = serde_json::from_str(
            r#"{"id":4,"title":"x","lat":0,"lng":0,"dateRange":{"start":"","end":null}}"#,
        )
        .unwrap();
        assert!(blank.date_range.is_open());
    }

    #[test]
    fn search_text_joins_fields() {
        let mut draft = TripDraft::new();
        draft.select_place(place());
        draft.description = "Louvre".to_string();
        draft.add_person("Amy");
        let trip = draft.into_trip(1).unwrap();
        assert_eq!(trip.search_text(), "paris, île-de-france, france louvre amy");
    }
}
