//! History loader: the months covering the visible range, fetched in
//! parallel and flattened into calendar events.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::archive::{Archive, BytesPromise, Document};
use crate::model::ActivitySummary;
use crate::months::{months_covering, MonthId};
use crate::slot::FetchSlot;

/// One activity mapped for the calendar grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: u64,
    /// Formatted sport name.
    pub title: String,
    pub date: NaiveDate,
}

impl CalendarEvent {
    fn from_summary(summary: &ActivitySummary) -> Option<Self> {
        let start = summary.start()?;
        Some(Self {
            id: summary.id,
            title: summary.sport.label(),
            date: start.date(),
        })
    }
}

/// Flatten month documents into the event list, dropping rows whose
/// timestamp does not parse. Sorted by date so the grid renders each day's
/// entries in a stable order.
pub fn events_from_history(
    rows: impl IntoIterator<Item = ActivitySummary>,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    for summary in rows {
        match CalendarEvent::from_summary(&summary) {
            Some(event) => events.push(event),
            None => warn!(
                id = summary.id,
                start = %summary.local_start_time,
                "dropping activity with unparseable start time"
            ),
        }
    }
    events.sort_by_key(|e| (e.date, e.id));
    events
}

enum MonthState {
    Pending(BytesPromise),
    Done(Vec<ActivitySummary>),
}

struct MonthFetch {
    month: MonthId,
    state: MonthState,
}

struct Inflight {
    seq: u64,
    months: Vec<MonthFetch>,
}

/// Owns the event collection shown on the calendar. Every visible-range
/// change supersedes the previous request; see [`FetchSlot`] for the
/// staleness rule.
pub struct HistoryLoader {
    archive: Archive,
    archive_end: Option<MonthId>,
    slot: FetchSlot,
    inflight: Option<Inflight>,
    events: Vec<CalendarEvent>,
}

impl HistoryLoader {
    pub fn new(archive: Archive, archive_end: Option<MonthId>) -> Self {
        Self {
            archive,
            archive_end,
            slot: FetchSlot::default(),
            inflight: None,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn is_loading(&self) -> bool {
        self.inflight.is_some()
    }

    /// Months that will actually be fetched for a range: the covering set,
    /// clipped to the archive end when one is configured.
    fn plan_months(&self, start: NaiveDate, end: NaiveDate) -> Vec<MonthId> {
        let mut months = months_covering(start, end);
        if let Some(archive_end) = self.archive_end {
            months.retain(|m| *m <= archive_end);
        }
        months
    }

    /// Begin fetching the months covering `[start, end]`, superseding any
    /// request in flight.
    pub fn request_range(&mut self, ctx: &egui::Context, start: NaiveDate, end: NaiveDate) {
        let seq = self.slot.begin();
        let months = self.plan_months(start, end);
        debug!(seq, %start, %end, months = months.len(), "history range requested");

        if months.is_empty() {
            self.inflight = None;
            self.apply(seq, Vec::new());
            return;
        }

        let months = months
            .into_iter()
            .map(|month| MonthFetch {
                month,
                state: MonthState::Pending(
                    self.archive.fetch(ctx, &Document::History(month)),
                ),
            })
            .collect();
        self.inflight = Some(Inflight { seq, months });
    }

    /// Poll in-flight month fetches. Returns true when the event
    /// collection was replaced this frame.
    pub fn poll(&mut self) -> bool {
        let Some(inflight) = &mut self.inflight else {
            return false;
        };

        for fetch in &mut inflight.months {
            let MonthState::Pending(promise) = &mut fetch.state else {
                continue;
            };
            let Some(result) = promise.ready_mut().and_then(Option::take) else {
                continue;
            };
            fetch.state = MonthState::Done(parse_month(fetch.month, result));
        }

        let all_done = inflight
            .months
            .iter()
            .all(|f| matches!(f.state, MonthState::Done(_)));
        if !all_done {
            return false;
        }

        let Some(inflight) = self.inflight.take() else {
            return false;
        };
        let rows = inflight.months.into_iter().flat_map(|f| match f.state {
            MonthState::Done(rows) => rows,
            MonthState::Pending(_) => Vec::new(),
        });
        self.apply(inflight.seq, events_from_history(rows))
    }

    /// Replace the event collection, unless the completion is stale.
    fn apply(&mut self, seq: u64, events: Vec<CalendarEvent>) -> bool {
        if !self.slot.accepts(seq) {
            debug!(seq, "dropping stale history response");
            return false;
        }
        debug!(seq, events = events.len(), "history events replaced");
        self.events = events;
        true
    }
}

/// A month document's bytes to its rows. Missing months are empty months;
/// anything else that fails contributes nothing but is logged.
fn parse_month(month: MonthId, result: crate::Result<Vec<u8>>) -> Vec<ActivitySummary> {
    match result.and_then(|bytes| Ok(serde_json::from_slice::<Vec<ActivitySummary>>(&bytes)?)) {
        Ok(rows) => rows,
        Err(err) if err.is_not_found() => {
            info!(%month, "no history document, treating as empty");
            Vec::new()
        }
        Err(err) => {
            warn!(%month, %err, "history month failed, contributing no events");
            Vec::new()
        }
    }
}
