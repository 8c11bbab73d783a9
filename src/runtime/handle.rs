use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    core::{
        store::{Outcome, StoreError},
        tracker::TripTracker,
    },
    geocode::{GeocodeError, Geocoder, MIN_QUERY_LEN, PlaceCandidate, QueryTicket, SUGGESTION_LIMIT, SuggestionBox},
    query::{filter::FilterSpec, stats::Stats},
    trip::{Trip, TripDraft},
    types::{QuerySeq, TripId, ViewMode},
    view::View,
};

use super::events::TripEvent;

/// Errors returned by [`TrackerHandle`] calls.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The store rejected the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The runtime task has stopped.
    #[error("tracker runtime is not running")]
    ChannelClosed,
}

/// Runtime sizing and geocoding knobs.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Pending commands before callers wait.
    pub command_queue_bound: usize,
    /// Events buffered per subscriber.
    pub event_capacity: usize,
    /// Candidates requested per lookup.
    pub suggestion_limit: usize,
    /// Shortest query that triggers a lookup.
    pub min_query_len: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
            suggestion_limit: SUGGESTION_LIMIT,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

/// Cloneable handle to the runtime task that owns the [`TripTracker`].
#[derive(Clone)]
pub struct TrackerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<TripEvent>,
}

enum Command {
    Add {
        trip: Trip,
        resp: oneshot::Sender<Result<TripId, RuntimeError>>,
    },
    Insert {
        draft: TripDraft,
        resp: oneshot::Sender<Result<TripId, RuntimeError>>,
    },
    Edit {
        trip: Trip,
        resp: oneshot::Sender<Outcome>,
    },
    Delete {
        id: TripId,
        resp: oneshot::Sender<Outcome>,
    },
    SetFilter {
        spec: FilterSpec,
        resp: oneshot::Sender<usize>,
    },
    Trips {
        resp: oneshot::Sender<Vec<Trip>>,
    },
    Filtered {
        resp: oneshot::Sender<Vec<Trip>>,
    },
    View {
        mode: ViewMode,
        resp: oneshot::Sender<View>,
    },
    Stats {
        resp: oneshot::Sender<Stats>,
    },
    Suggest {
        query: String,
        resp: oneshot::Sender<Option<QuerySeq>>,
    },
    SuggestionsReady {
        ticket: QueryTicket,
        result: Result<Vec<PlaceCandidate>, GeocodeError>,
    },
    Suggestions {
        resp: oneshot::Sender<Vec<PlaceCandidate>>,
    },
    SelectSuggestion {
        index: usize,
        resp: oneshot::Sender<Option<PlaceCandidate>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

struct LoopCtx {
    events_tx: broadcast::Sender<TripEvent>,
    lookup_tx: mpsc::WeakSender<Command>,
    geocoder: Option<Arc<dyn Geocoder>>,
    config: RuntimeConfig,
}

/// Moves `tracker` onto a runtime task and returns a handle to it.
///
/// Without a `geocoder`, every suggestion lookup resolves empty.
pub fn spawn_tracker(
    tracker: TripTracker,
    geocoder: Option<Arc<dyn Geocoder>>,
    config: RuntimeConfig,
) -> TrackerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<TripEvent>(config.event_capacity);

    let ctx = LoopCtx {
        events_tx: events_tx.clone(),
        lookup_tx: cmd_tx.downgrade(),
        geocoder,
        config: config.clone(),
    };

    tokio::spawn(async move {
        let mut tracker = tracker;
        let mut suggestions = SuggestionBox::new(ctx.config.min_query_len);

        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut tracker, &mut suggestions, &ctx) {
                break;
            }
        }
        log::debug!("tracker runtime stopped");
    });

    TrackerHandle { cmd_tx, events_tx }
}

impl TrackerHandle {
    /// Subscribes to runtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<TripEvent> {
        self.events_tx.subscribe()
    }

    /// Appends a fully formed trip.
    pub async fn add(&self, trip: Trip) -> Result<TripId, RuntimeError> {
        self.call(|resp| Command::Add { trip, resp }).await?
    }

    /// Appends a trip built from `draft`.
    pub async fn insert(&self, draft: TripDraft) -> Result<TripId, RuntimeError> {
        self.call(|resp| Command::Insert { draft, resp }).await?
    }

    /// Replaces the trip with `trip.id`.
    pub async fn edit(&self, trip: Trip) -> Result<Outcome, RuntimeError> {
        self.call(|resp| Command::Edit { trip, resp }).await
    }

    /// Removes the trip with `id`.
    pub async fn delete(&self, id: TripId) -> Result<Outcome, RuntimeError> {
        self.call(|resp| Command::Delete { id, resp }).await
    }

    /// Replaces the filter; returns how many trips pass it.
    pub async fn set_filter(&self, spec: FilterSpec) -> Result<usize, RuntimeError> {
        self.call(|resp| Command::SetFilter { spec, resp }).await
    }

    /// Copy of the canonical list.
    pub async fn trips(&self) -> Result<Vec<Trip>, RuntimeError> {
        self.call(|resp| Command::Trips { resp }).await
    }

    /// Copy of the filtered list.
    pub async fn filtered(&self) -> Result<Vec<Trip>, RuntimeError> {
        self.call(|resp| Command::Filtered { resp }).await
    }

    /// Payload for `mode` over the filtered list.
    pub async fn view(&self, mode: ViewMode) -> Result<View, RuntimeError> {
        self.call(|resp| Command::View { mode, resp }).await
    }

    /// Statistics over the filtered list.
    pub async fn stats(&self) -> Result<Stats, RuntimeError> {
        self.call(|resp| Command::Stats { resp }).await
    }

    /// Starts a geocoding lookup. Returns its sequence number, or `None` when
    /// the query is too short to look up.
    pub async fn suggest(&self, query: impl Into<String>) -> Result<Option<QuerySeq>, RuntimeError> {
        let query = query.into();
        self.call(|resp| Command::Suggest { query, resp }).await
    }

    /// Current suggestions.
    pub async fn suggestions(&self) -> Result<Vec<PlaceCandidate>, RuntimeError> {
        self.call(|resp| Command::Suggestions { resp }).await
    }

    /// Takes the suggestion at `index`, clearing the list.
    pub async fn select_suggestion(&self, index: usize) -> Result<Option<PlaceCandidate>, RuntimeError> {
        self.call(|resp| Command::SelectSuggestion { index, resp }).await
    }

    /// Stops the runtime task.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.call(|resp| Command::Shutdown { resp }).await
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    tracker: &mut TripTracker,
    suggestions: &mut SuggestionBox,
    ctx: &LoopCtx,
) -> bool {
    let events_tx = &ctx.events_tx;

    match cmd {
        Command::Add { trip, resp } => {
            let res = tracker.add(trip).map_err(RuntimeError::from);
            if let Ok(id) = res {
                announce_mutation(tracker, events_tx, TripEvent::Added { id });
            }
            let _ = resp.send(res);
        }
        Command::Insert { draft, resp } => {
            let res = tracker.insert(draft).map_err(RuntimeError::from);
            if let Ok(id) = res {
                announce_mutation(tracker, events_tx, TripEvent::Added { id });
            }
            let _ = resp.send(res);
        }
        Command::Edit { trip, resp } => {
            let id = trip.id;
            let outcome = tracker.edit(trip);
            if outcome.is_applied() {
                announce_mutation(tracker, events_tx, TripEvent::Edited { id });
            }
            let _ = resp.send(outcome);
        }
        Command::Delete { id, resp } => {
            let outcome = tracker.delete(id);
            if outcome.is_applied() {
                announce_mutation(tracker, events_tx, TripEvent::Deleted { id });
            }
            let _ = resp.send(outcome);
        }
        Command::SetFilter { spec, resp } => {
            tracker.set_filter(spec);
            let visible = tracker.visible_ids().len();
            let _ = events_tx.send(TripEvent::FilterApplied { visible });
            let _ = resp.send(visible);
        }
        Command::Trips { resp } => {
            let _ = resp.send(tracker.trips().to_vec());
        }
        Command::Filtered { resp } => {
            let _ = resp.send(tracker.filtered().into_iter().cloned().collect());
        }
        Command::View { mode, resp } => {
            let _ = resp.send(tracker.view(mode));
        }
        Command::Stats { resp } => {
            let _ = resp.send(tracker.stats());
        }
        Command::Suggest { query, resp } => {
            let ticket = suggestions.begin(&query);
            let _ = resp.send(ticket.as_ref().map(|t| t.seq));
            match ticket {
                Some(ticket) => start_lookup(ticket, suggestions, ctx),
                None => {
                    let _ = events_tx.send(TripEvent::SuggestionsUpdated {
                        seq: suggestions.latest_seq(),
                        count: 0,
                    });
                }
            }
        }
        Command::SuggestionsReady { ticket, result } => {
            if suggestions.resolve(&ticket, result) {
                let _ = events_tx.send(TripEvent::SuggestionsUpdated {
                    seq: ticket.seq,
                    count: suggestions.suggestions().len(),
                });
            }
        }
        Command::Suggestions { resp } => {
            let _ = resp.send(suggestions.suggestions().to_vec());
        }
        Command::SelectSuggestion { index, resp } => {
            let _ = resp.send(suggestions.select(index));
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn announce_mutation(tracker: &TripTracker, events_tx: &broadcast::Sender<TripEvent>, event: TripEvent) {
    let _ = events_tx.send(event);
    if !tracker.is_durable() {
        let _ = events_tx.send(TripEvent::PersistFailed);
    }
}

fn start_lookup(ticket: QueryTicket, suggestions: &mut SuggestionBox, ctx: &LoopCtx) {
    let Some(geocoder) = ctx.geocoder.as_ref() else {
        suggestions.resolve(&ticket, Err(GeocodeError::Request("no geocoder configured".to_string())));
        let _ = ctx.events_tx.send(TripEvent::SuggestionsUpdated {
            seq: ticket.seq,
            count: 0,
        });
        return;
    };

    let lookup = geocoder.forward(&ticket.query, ctx.config.suggestion_limit);
    let lookup_tx = ctx.lookup_tx.clone();
    tokio::spawn(async move {
        let result = lookup.await;
        if let Some(tx) = lookup_tx.upgrade() {
            let _ = tx.send(Command::SuggestionsReady { ticket, result }).await;
        }
    });
}
