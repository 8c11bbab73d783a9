//! Order-preserving trip filtering.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::{
    trip::{DateRange, Trip},
    types::PeopleFilterMode,
};

/// Active filter predicates. An unset field does not constrain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Lower bound on trip start, upper bound on trip end.
    #[serde(default)]
    pub date_range: DateRange,
    /// Companions to match, in selection order.
    #[serde(default)]
    pub selected_people: Vec<String>,
    /// ANY or ALL semantics for `selected_people`.
    #[serde(default, rename = "peopleFilterMode")]
    pub people_mode: PeopleFilterMode,
    /// Case-insensitive substring query.
    #[serde(default)]
    pub keywords: String,
}

impl FilterSpec {
    /// Filter that matches every trip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the companion selection and mode.
    pub fn with_people<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
        mode: PeopleFilterMode,
    ) -> Self {
        self.selected_people.clear();
        for name in names {
            let name = name.into();
            if !self.selected_people.contains(&name) {
                self.selected_people.push(name);
            }
        }
        self.people_mode = mode;
        self
    }

    /// Sets the date bounds.
    pub fn with_dates(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Sets the keyword query.
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Selects `name` if unselected, otherwise deselects it. Returns the new state.
    pub fn toggle_person(&mut self, name: &str) -> bool {
        if let Some(idx) = self.selected_people.iter().position(|p| p == name) {
            self.selected_people.remove(idx);
            false
        } else {
            self.selected_people.push(name.to_string());
            true
        }
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.date_range.is_open() && self.selected_people.is_empty() && self.keywords.is_empty()
    }

    /// Evaluates every active predicate against `trip`.
    pub fn matches(&self, trip: &Trip) -> bool {
        Compiled::new(self).matches(trip)
    }
}

struct Compiled<'s> {
    spec: &'s FilterSpec,
    people: HashSet<&'s str>,
    needle: String,
}

impl<'s> Compiled<'s> {
    fn new(spec: &'s FilterSpec) -> Self {
        Self {
            spec,
            people: spec.selected_people.iter().map(String::as_str).collect(),
            needle: spec.keywords.to_lowercase(),
        }
    }

    fn matches(&self, trip: &Trip) -> bool {
        // A missing trip date never satisfies a set bound.
        if let Some(bound) = self.spec.date_range.start {
            match trip.date_range.start {
                Some(start) if start >= bound => {}
                _ => return false,
            }
        }
        if let Some(bound) = self.spec.date_range.end {
            match trip.date_range.end {
                Some(end) if end <= bound => {}
                _ => return false,
            }
        }

        if !self.people.is_empty() {
            let ok = match self.spec.people_mode {
                PeopleFilterMode::Any => trip.people.iter().any(|p| self.people.contains(p.as_str())),
                PeopleFilterMode::All => self.people.iter().all(|name| trip.has_person(name)),
            };
            if !ok {
                return false;
            }
        }

        if !self.needle.is_empty() && !trip.search_text().contains(&self.needle) {
            return false;
        }

        true
    }
}

/// Trips from `trips` passing `spec`, in input order.
pub fn apply<'a, I>(trips: I, spec: &FilterSpec) -> Vec<&'a Trip>
where
    I: IntoIterator<Item = &'a Trip>,
{
    let compiled = Compiled::new(spec);
    trips.into_iter().filter(|t| compiled.matches(t)).collect()
}

/// Distinct companion names across `trips`, in first-seen order.
pub fn known_people<'a, I>(trips: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a Trip>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for trip in trips {
        for person in &trip.people {
            if seen.insert(person.as_str()) {
                out.push(person.as_str());
            }
        }
    }
    out
}
