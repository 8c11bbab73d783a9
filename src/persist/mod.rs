//! Whole-list persistence to a single durable slot.
//!
//! Every save overwrites the slot with the full encoded list. Neither `save`
//! nor `load` propagates errors: failures are logged and degrade to "not
//! written" or "empty list".

/// Single JSON file slot.
pub mod file;
/// SQLite keyed-row slot.
pub mod sqlite;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{trip::Trip, types::TripId};

/// Version number written into the slot envelope.
pub const SLOT_FORMAT_VERSION: u16 = 1;

/// Key used when a slot backend stores more than one value.
pub const DEFAULT_SLOT_KEY: &str = "trips";

/// Slot read/write and codec failures.
#[derive(Debug, Error)]
pub enum PersistError {
    /// SQLite backend failure.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Encoding or decoding failure.
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    /// Filesystem failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Payload does not fit the slot.
    #[error("storage quota exceeded: {needed} bytes > {quota} bytes")]
    QuotaExceeded {
        /// Encoded payload size.
        needed: usize,
        /// Slot capacity.
        quota: usize,
    },
    /// A trip's coordinates have no JSON encoding.
    #[error("trip {0} has non-finite coordinates")]
    NonFiniteCoordinates(TripId),
    /// Envelope written by an unknown format.
    #[error("unsupported slot format version {0}")]
    UnsupportedFormat(u16),
}

/// Result alias for slot operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// One durable key-value location holding the encoded trip list.
pub trait TripSlot: Send {
    /// Current slot contents, `None` if never written.
    fn read(&self) -> PersistResult<Option<String>>;
    /// Overwrites the slot.
    fn write(&mut self, payload: &str) -> PersistResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    format_version: u16,
    trips: &'a [Trip],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    format_version: u16,
    trips: Vec<Trip>,
}

/// Encodes `trips` as a versioned JSON envelope.
///
/// Fails rather than writing `null` for a NaN or infinite coordinate, which
/// would make the whole slot unreadable on the next load.
pub fn encode(trips: &[Trip]) -> PersistResult<String> {
    if let Some(bad) = trips.iter().find(|t| !t.has_finite_position()) {
        return Err(PersistError::NonFiniteCoordinates(bad.id));
    }
    Ok(serde_json::to_string(&EnvelopeRef {
        format_version: SLOT_FORMAT_VERSION,
        trips,
    })?)
}

/// Decodes an envelope, or a bare JSON array of trips.
pub fn decode(payload: &str) -> PersistResult<Vec<Trip>> {
    if payload.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(payload)?);
    }

    let env: Envelope = serde_json::from_str(payload)?;
    if env.format_version != SLOT_FORMAT_VERSION {
        return Err(PersistError::UnsupportedFormat(env.format_version));
    }
    Ok(env.trips)
}

/// Writes the full list to `slot`. Returns false if the write failed.
pub fn save(slot: &mut dyn TripSlot, trips: &[Trip]) -> bool {
    let result = encode(trips).and_then(|payload| slot.write(&payload));
    match result {
        Ok(()) => {
            log::debug!("saved {} trips", trips.len());
            true
        }
        Err(err) => {
            log::warn!("failed to save {} trips: {err}", trips.len());
            false
        }
    }
}

/// Reads the list from `slot`. Missing or malformed contents yield an empty list.
pub fn load(slot: &dyn TripSlot) -> Vec<Trip> {
    let payload = match slot.read() {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            log::info!("trip slot is empty, starting fresh");
            return Vec::new();
        }
        Err(err) => {
            log::warn!("failed to read trip slot: {err}");
            return Vec::new();
        }
    };

    match decode(&payload) {
        Ok(trips) => {
            log::info!("loaded {} trips", trips.len());
            trips
        }
        Err(err) => {
            log::warn!("discarding malformed trip slot: {err}");
            Vec::new()
        }
    }
}

/// In-process slot, shareable between clones, with an optional byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Arc<Mutex<Option<String>>>,
    quota: Option<usize>,
}

impl MemorySlot {
    /// Unlimited empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty slot rejecting payloads longer than `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Slot pre-filled with `payload`.
    pub fn with_contents(payload: impl Into<String>) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(payload.into()))),
            quota: None,
        }
    }

    /// Copy of the current contents, `None` if never written.
    pub fn contents(&self) -> PersistResult<Option<String>> {
        let guard = self.value.lock().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }
}

fn poisoned() -> PersistError {
    PersistError::Io(std::io::Error::other("memory slot poisoned"))
}

impl TripSlot for MemorySlot {
    fn read(&self) -> PersistResult<Option<String>> {
        self.contents()
    }

    fn write(&mut self, payload: &str) -> PersistResult<()> {
        if let Some(quota) = self.quota {
            if payload.len() > quota {
                return Err(PersistError::QuotaExceeded {
                    needed: payload.len(),
                    quota,
                });
            }
        }

        let mut guard = self.value.lock().map_err(|_| poisoned())?;
        *guard = Some(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::DateRange;

    fn trip(id: TripId, lat: f64) -> Trip {
        Trip {
            id,
            title: "Oslo, Norway".to_string(),
            description: String::new(),
            people: vec![],
            photos: vec![],
            date_range: DateRange::default(),
            lat,
            lng: 10.7,
        }
    }

    #[test]
    fn encode_refuses_non_finite_coordinates() {
        let err = encode(&[trip(1, 59.9), trip(2, f64::NAN)]).unwrap_err();
        assert!(matches!(err, PersistError::NonFiniteCoordinates(2)));

        let mut slot = MemorySlot::with_contents("untouched");
        assert!(!save(&mut slot, &[trip(3, f64::INFINITY)]));
        assert_eq!(slot.contents().unwrap().as_deref(), Some("untouched"));
    }

    #[test]
    fn poisoned_memory_slot_reports_error() {
        let slot = MemorySlot::new();
        let shared = slot.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.value.lock().unwrap();
            panic!("poison the slot");
        })
        .join();

        assert!(slot.contents().is_err());
        assert!(slot.read().is_err());
        assert!(load(&slot).is_empty());
    }
}
