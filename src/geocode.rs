//! Geocoding candidates and last-query-wins suggestion state.
//!
//! Lookups may complete out of order. Every query takes a ticket with a fresh
//! sequence number and only the newest ticket may replace the suggestions.

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::QuerySeq;

/// Shortest query that triggers a lookup.
pub const MIN_QUERY_LEN: usize = 3;
/// Default number of candidates requested per lookup.
pub const SUGGESTION_LIMIT: usize = 5;

/// A place returned by the geocoding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Provider identifier.
    #[serde(default)]
    pub id: String,
    /// Full display name, e.g. `"Rome, Lazio, Italy"`.
    #[serde(alias = "placeName")]
    pub place_name: String,
    /// `[longitude, latitude]`.
    pub center: [f64; 2],
}

impl PlaceCandidate {
    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.center[0]
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.center[1]
    }
}

/// Lookup failures. All of them degrade to an empty suggestion list.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Provider response could not be decoded.
    #[error("malformed geocoding response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Provider or transport failure.
    #[error("geocoding request failed: {0}")]
    Request(String),
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<PlaceCandidate>,
}

/// Decodes a feature-collection response body into candidates.
pub fn parse_features(body: &str) -> Result<Vec<PlaceCandidate>, GeocodeError> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    Ok(collection.features)
}

/// Boxed lookup future returned by [`Geocoder::forward`].
pub type GeocodeFuture =
    Pin<Box<dyn Future<Output = Result<Vec<PlaceCandidate>, GeocodeError>> + Send + 'static>>;

/// Forward geocoding collaborator.
pub trait Geocoder: Send + Sync + 'static {
    /// Looks up at most `limit` places matching `query`.
    fn forward(&self, query: &str, limit: usize) -> GeocodeFuture;
}

/// Handle for one issued query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    /// Sequence number; larger is newer.
    pub seq: QuerySeq,
    /// Query text as issued.
    pub query: String,
}

/// Suggestion list owned by the trip form.
#[derive(Debug, Clone)]
pub struct SuggestionBox {
    min_query_len: usize,
    latest: QuerySeq,
    query: String,
    suggestions: Vec<PlaceCandidate>,
}

impl Default for SuggestionBox {
    fn default() -> Self {
        Self::new(MIN_QUERY_LEN)
    }
}

impl SuggestionBox {
    /// Empty box that ignores queries shorter than `min_query_len` characters.
    pub fn new(min_query_len: usize) -> Self {
        Self {
            min_query_len,
            latest: 0,
            query: String::new(),
            suggestions: Vec::new(),
        }
    }

    /// Starts a query. Short queries clear the list and return `None`; either
    /// way every earlier ticket is superseded.
    pub fn begin(&mut self, query: &str) -> Option<QueryTicket> {
        self.latest += 1;
        self.query = query.to_string();

        if query.chars().count() < self.min_query_len {
            self.suggestions.clear();
            return None;
        }

        Some(QueryTicket {
            seq: self.latest,
            query: query.to_string(),
        })
    }

    /// Applies a finished lookup. Returns false when `ticket` was superseded.
    pub fn resolve(
        &mut self,
        ticket: &QueryTicket,
        result: Result<Vec<PlaceCandidate>, GeocodeError>,
    ) -> bool {
        if ticket.seq != self.latest {
            log::debug!(
                "discarding stale suggestions for {:?} (seq {} < {})",
                ticket.query,
                ticket.seq,
                self.latest
            );
            return false;
        }

        self.suggestions = match result {
            Ok(found) => found,
            Err(err) => {
                log::warn!("geocoding {:?} failed: {err}", ticket.query);
                Vec::new()
            }
        };
        true
    }

    /// Takes the candidate at `index` and clears the list.
    pub fn select(&mut self, index: usize) -> Option<PlaceCandidate> {
        if index >= self.suggestions.len() {
            return None;
        }
        let picked = self.suggestions.swap_remove(index);
        self.suggestions.clear();
        self.query = picked.place_name.clone();
        Some(picked)
    }

    /// Current suggestions.
    pub fn suggestions(&self) -> &[PlaceCandidate] {
        &self.suggestions
    }

    /// Text of the most recent query or selection.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Sequence number of the newest query.
    pub fn latest_seq(&self) -> QuerySeq {
        self.latest
    }
}
