//! Dashboard statistics over a trip list.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::trip::Trip;

/// Bucket used when a title has no recognizable country segment.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Entries kept in each top-N list.
pub const TOP_N: usize = 3;

/// Summary metrics for a set of trips.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of trips.
    pub total_trips: usize,
    /// Distinct [`location_bucket`] values.
    pub unique_locations: usize,
    /// Sum of whole days for trips with both dates.
    pub total_days: u64,
    /// Most frequent companions with trip counts.
    pub top_companions: Vec<(String, usize)>,
    /// Most frequent titles with visit counts.
    pub top_locations: Vec<(String, usize)>,
}

/// Coarse location of a title formatted `"City, Region, Country"`: the trimmed
/// text after the last comma, or [`UNKNOWN_LOCATION`].
pub fn location_bucket(title: &str) -> &str {
    match title.rsplit_once(',') {
        Some((_, tail)) if !tail.trim().is_empty() => tail.trim(),
        _ => UNKNOWN_LOCATION,
    }
}

/// Computes [`Stats`] for `trips`.
pub fn aggregate<'a, I>(trips: I) -> Stats
where
    I: IntoIterator<Item = &'a Trip>,
{
    let mut total_trips = 0;
    let mut total_days = 0;
    let mut buckets = HashSet::new();
    let mut companions = Tally::default();
    let mut locations = Tally::default();

    for trip in trips {
        total_trips += 1;
        total_days += trip.date_range.days().unwrap_or(0);
        buckets.insert(location_bucket(&trip.title));
        for person in &trip.people {
            companions.bump(person);
        }
        locations.bump(&trip.title);
    }

    Stats {
        total_trips,
        unique_locations: buckets.len(),
        total_days,
        top_companions: companions.top(TOP_N),
        top_locations: locations.top(TOP_N),
    }
}

/// Frequency counter that remembers first-encounter order.
#[derive(Default)]
struct Tally<'a> {
    index: HashMap<&'a str, usize>,
    counts: Vec<(&'a str, usize)>,
}

impl<'a> Tally<'a> {
    fn bump(&mut self, key: &'a str) {
        match self.index.get(key) {
            Some(&idx) => self.counts[idx].1 += 1,
            None => {
                self.index.insert(key, self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    fn top(mut self, n: usize) -> Vec<(String, usize)> {
        // Stable sort keeps first-encounter order among equal counts.
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts
            .into_iter()
            .take(n)
            .map(|(k, c)| (k.to_string(), c))
            .collect()
    }
}
