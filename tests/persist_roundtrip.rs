use chrono::NaiveDate;
use proptest::prelude::*;
use tempfile::TempDir;

use tripmark::{
    core::tracker::TripTracker,
    persist::{
        self, MemorySlot, PersistError, TripSlot, file::JsonFileSlot, sqlite::SqliteSlot,
    },
    trip::{DateRange, Trip},
    types::TripId,
};

fn trip(id: TripId, title: &str, start: &str, end: &str, people: &[&str]) -> Trip {
    Trip {
        id,
        title: title.to_string(),
        description: format!("notes for {title}"),
        people: people.iter().map(|p| p.to_string()).collect(),
        photos: vec![format!("blob:photo-{id}")],
        date_range: DateRange::parse(start, end),
        lat: 41.902_782,
        lng: 12.496_366,
    }
}

fn sample() -> Vec<Trip> {
    vec![
        trip(1, "Paris, France", "2024-01-01", "2024-01-10", &["Amy"]),
        trip(2, "Rome, Italy", "2024-02-01", "", &["Amy", "Bo"]),
        trip(3, "Atlantis", "", "", &[]),
    ]
}

fn date_strategy() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of(
        (1990i32..2030, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date")),
    )
}

type TripRow = (String, String, Vec<String>, Vec<String>, Option<NaiveDate>, Option<NaiveDate>, f64, f64);

fn trip_strategy() -> impl Strategy<Value = TripRow> {
    (
        "\\PC{0,24}",
        "\\PC{0,40}",
        prop::collection::vec("[A-Za-z ]{1,8}", 0..4),
        prop::collection::vec("blob:[a-f0-9]{8}", 0..3),
        date_strategy(),
        date_strategy(),
        -90.0f64..90.0,
        -180.0f64..180.0,
    )
}

proptest! {
    #[test]
    fn save_then_load_round_trips(rows in prop::collection::vec(trip_strategy(), 0..20)) {
        let trips: Vec<Trip> = rows
            .into_iter()
            .enumerate()
            .map(|(idx, (title, description, people, photos, start, end, lat, lng))| Trip {
                id: idx as TripId * 7 + 1,
                title,
                description,
                people,
                photos,
                date_range: DateRange { start, end },
                lat,
                lng,
            })
            .collect();

        let mut slot = MemorySlot::new();
        prop_assert!(persist::save(&mut slot, &trips));
        prop_assert_eq!(persist::load(&slot), trips);
    }
}

#[test]
fn empty_or_malformed_slot_loads_empty() {
    assert!(persist::load(&MemorySlot::new()).is_empty());
    assert!(persist::load(&MemorySlot::with_contents("{not json")).is_empty());
    assert!(persist::load(&MemorySlot::with_contents(r#"{"formatVersion":1,"trips":[{"id":1}]}"#)).is_empty());

    let tracker = TripTracker::open(Box::new(MemorySlot::with_contents("[1, 2, 3]")));
    assert!(tracker.trips().is_empty());
}

#[test]
fn unknown_format_version_is_rejected() {
    let payload = r#"{"formatVersion":9,"trips":[]}"#;
    assert!(matches!(persist::decode(payload), Err(PersistError::UnsupportedFormat(9))));
    assert!(persist::load(&MemorySlot::with_contents(payload)).is_empty());
}

#[test]
fn bad_record_inside_envelope_reports_the_field() {
    let payload = r#"{"formatVersion":1,"trips":[{"id":1,"title":"Oslo","lat":"north","lng":10.7}]}"#;
    let msg = persist::decode(payload).unwrap_err().to_string();
    assert!(msg.contains("invalid type"), "{msg}");
    assert!(!msg.contains("did not match any variant"), "{msg}");
}

#[test]
fn bare_array_from_older_storage_is_accepted() {
    let payload = r#"[
        {"id":1714000000000,"title":"Rome, Lazio, Italy","description":"","people":["Amy"],
         "photos":[],"dateRange":{"start":"2024-02-01","end":""},"lat":41.9,"lng":12.5}
    ]"#;
    let trips = persist::decode(payload).unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].id, 1_714_000_000_000);
    assert_eq!(trips[0].date_range.start, NaiveDate::from_ymd_opt(2024, 2, 1));
    assert_eq!(trips[0].date_range.end, None);
}

#[test]
fn encoded_slot_uses_camel_case_and_blank_dates() {
    let text = persist::encode(&sample()).unwrap();
    assert!(text.starts_with(r#"{"formatVersion":1,"trips":["#));
    assert!(text.contains(r#""dateRange":{"start":"2024-02-01","end":""}"#));
}

#[test]
fn quota_failure_is_reported_not_raised() {
    let mut slot = MemorySlot::with_quota(32);
    assert!(!persist::save(&mut slot, &sample()));
    assert_eq!(slot.contents().expect("read"), None);
    assert!(matches!(
        slot.write(&"x".repeat(64)),
        Err(PersistError::QuotaExceeded { needed: 64, quota: 32 })
    ));
}

#[test]
fn sqlite_slot_round_trips_and_overwrites() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("trips.db");

    let mut slot = SqliteSlot::open(&db_path, "trips").expect("open sqlite");
    assert_eq!(slot.read().expect("read"), None);
    assert!(persist::save(&mut slot, &sample()));
    assert!(persist::save(&mut slot, &sample()[..2]));
    assert!(slot.updated_ms().expect("ts").is_some());
    drop(slot);

    let reopened = SqliteSlot::open(&db_path, "trips").expect("reopen");
    assert_eq!(persist::load(&reopened), sample()[..2].to_vec());

    let other = SqliteSlot::open(&db_path, "someone-else").expect("open other key");
    assert!(persist::load(&other).is_empty());
}

#[test]
fn sqlite_backed_tracker_survives_restart() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("session.db");

    {
        let slot = SqliteSlot::open(&db_path, "trips").expect("open");
        let mut tracker = TripTracker::open(Box::new(slot));
        for t in sample() {
            tracker.add(t).expect("add");
        }
        tracker.delete(2);
    }

    let slot = SqliteSlot::open(&db_path, "trips").expect("reopen");
    let tracker = TripTracker::open(Box::new(slot));
    assert_eq!(tracker.store().ids().collect::<Vec<_>>(), vec![1, 3]);
}

#[test]
fn file_slot_writes_whole_list_atomically() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("nested").join("trips.json");

    let mut slot = JsonFileSlot::new(&path);
    assert_eq!(slot.read().expect("read"), None);
    assert!(persist::save(&mut slot, &sample()));
    assert!(path.exists());
    assert!(!tmp.path().join("nested").join("trips.json.tmp").exists());

    let reread = JsonFileSlot::new(&path);
    assert_eq!(persist::load(&reread), sample());
}

#[test]
fn in_memory_sqlite_slot_uses_default_key() {
    let slot = SqliteSlot::open_in_memory().expect("open");
    assert_eq!(slot.key(), persist::DEFAULT_SLOT_KEY);
}
