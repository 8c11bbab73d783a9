use std::cmp::Reverse;

use crate::trip::Trip;

/// Trips by start date, newest first. Ties keep input order; undated trips go last.
pub fn chronological<'a, I>(trips: I) -> Vec<&'a Trip>
where
    I: IntoIterator<Item = &'a Trip>,
{
    let mut out: Vec<&Trip> = trips.into_iter().collect();
    // `None < Some(_)`, so reversing puts undated trips after every dated one.
    out.sort_by_key(|t| Reverse(t.date_range.start));
    out
}
