//! The directory store.
//!
//! [`DirectoryStore`] owns the loaded records, the derived city list, the
//! filter criteria, the filtered result, and the highlight map. It is
//! constructed once per session and handed by `&mut` to whatever presents
//! it; there is no global instance.
//!
//! Criteria changes (`search_by_name`, `filter_by_city`) are staged as
//! *pending* and share one trailing-edge debounce window. The owner's event
//! loop calls [`DirectoryStore::tick`]; once the window elapses with no
//! further change, the pending criteria are committed and `filtered_records`
//! is recomputed exactly once. Highlight toggling bypasses the debounce.

use crate::clock::{Clock, SystemClock};
use crate::debounce::{DEFAULT_QUIET_WINDOW, Debouncer};
use crate::error::{DataAccessError, StoreError};
use crate::filter::{FilterCriteria, distinct_cities};
use crate::model::person::PersonRecord;
use crate::oldest::{HighlightMap, compute_oldest_by_city};
use crate::source::DataSource;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of the one-time load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// The request is outstanding (or has not completed yet).
    Loading,
    /// The load failed; the message is kept verbatim for display.
    Error(String),
    /// Records are available.
    Ready,
}

impl LoadState {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// What the presentation should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryView<'a> {
    Loading,
    Error(&'a str),
    /// Loaded, but the current criteria match nobody.
    Empty,
    Rows(&'a [PersonRecord]),
}

pub struct DirectoryStore<C: Clock = SystemClock> {
    clock: C,
    debouncer: Debouncer,
    load_state: LoadState,
    load_started: bool,
    /// Every loaded record, in source order. Set once.
    all_records: Vec<PersonRecord>,
    /// Distinct cities of `all_records`, sorted ascending.
    cities: Vec<String>,
    /// Criteria the current `filtered` list was computed with.
    applied: FilterCriteria,
    /// Latest requested criteria, committed when the debounce fires.
    pending: FilterCriteria,
    filtered: Vec<PersonRecord>,
    highlight_enabled: bool,
    /// Memoized oldest-per-city over `filtered`; empty while disabled.
    highlight: HighlightMap,
    recompute_count: u64,
    torn_down: bool,
}

impl DirectoryStore<SystemClock> {
    /// Store on the system clock with the default 1000 ms quiet window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock, DEFAULT_QUIET_WINDOW)
    }
}

impl Default for DirectoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> DirectoryStore<C> {
    pub fn with_clock(clock: C, quiet_window: Duration) -> Self {
        Self {
            clock,
            debouncer: Debouncer::new(quiet_window),
            load_state: LoadState::Loading,
            load_started: false,
            all_records: Vec::new(),
            cities: Vec::new(),
            applied: FilterCriteria::default(),
            pending: FilterCriteria::default(),
            filtered: Vec::new(),
            highlight_enabled: false,
            highlight: HighlightMap::new(),
            recompute_count: 0,
            torn_down: false,
        }
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Fetch from `source` and populate the store. A data error is not an
    /// `Err` here: it moves the store to [`LoadState::Error`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyLoaded`] if a load was already started.
    pub fn load(&mut self, source: &dyn DataSource) -> Result<(), StoreError> {
        self.begin_load()?;
        debug!(source = %source.describe(), "loading directory");
        let result = source.fetch_all();
        self.finish_load(result)
    }

    /// Mark the load as outstanding, for callers that fetch elsewhere (e.g.
    /// on a worker thread) and report back through [`Self::finish_load`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyLoaded`] on a second call.
    pub fn begin_load(&mut self) -> Result<(), StoreError> {
        if self.load_started {
            return Err(StoreError::AlreadyLoaded);
        }
        self.load_started = true;
        self.load_state = LoadState::Loading;
        Ok(())
    }

    /// Apply the outcome of the fetch.
    ///
    /// On success the records and cities are installed and `filtered_records`
    /// is recomputed immediately with the committed criteria; a pending
    /// debounce keeps running. On failure the message is stored verbatim and
    /// the records stay empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyLoaded`] if the load already completed.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<PersonRecord>, DataAccessError>,
    ) -> Result<(), StoreError> {
        if self.load_started && !self.load_state.is_loading() {
            return Err(StoreError::AlreadyLoaded);
        }
        self.load_started = true;

        match result {
            Ok(records) => {
                self.cities = distinct_cities(&records);
                self.all_records = records;
                self.load_state = LoadState::Ready;
                info!(
                    records = self.all_records.len(),
                    cities = self.cities.len(),
                    "directory loaded"
                );
                self.recompute();
            }
            Err(err) => {
                warn!(code = %err.code(), "directory load failed: {err}");
                self.load_state = LoadState::Error(err.to_string());
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Criteria
    // -----------------------------------------------------------------------

    /// Request a name filter. Takes effect after the quiet window.
    pub fn search_by_name(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.pending.name {
            return;
        }
        self.pending.name = term;
        self.schedule_recompute();
    }

    /// Request a city filter (`""` for every city). Shares the name filter's
    /// quiet window.
    pub fn filter_by_city(&mut self, city: impl Into<String>) {
        let city = city.into();
        if city == self.pending.city {
            return;
        }
        self.pending.city = city;
        self.schedule_recompute();
    }

    /// Flip highlighting. Immediate, independent of the filter debounce.
    pub fn toggle_highlight_oldest(&mut self) {
        self.highlight_enabled = !self.highlight_enabled;
        self.refresh_highlight();
        debug!(enabled = self.highlight_enabled, "highlight oldest toggled");
    }

    fn schedule_recompute(&mut self) {
        if self.torn_down {
            return;
        }
        let replaced = self.debouncer.schedule(self.clock.now());
        debug!(
            name = %self.pending.name,
            city = %self.pending.city,
            replaced,
            "filter recompute scheduled"
        );
    }

    // -----------------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------------

    /// Fire the pending recompute if its quiet window has elapsed.
    ///
    /// Returns `true` if `filtered_records` was recomputed.
    pub fn tick(&mut self) -> bool {
        if self.torn_down || !self.debouncer.fire_if_due(self.clock.now()) {
            return false;
        }
        self.commit_pending();
        true
    }

    /// Commit pending criteria now, skipping the quiet window.
    pub fn flush(&mut self) {
        if self.torn_down {
            return;
        }
        self.debouncer.cancel();
        self.commit_pending();
    }

    /// Cancel any scheduled recompute; it will never fire. Criteria calls
    /// after teardown are recorded but schedule nothing.
    pub fn teardown(&mut self) {
        if self.debouncer.cancel() {
            debug!("pending filter recompute cancelled at teardown");
        }
        self.torn_down = true;
    }

    #[must_use]
    pub const fn is_recompute_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Time until the pending recompute fires, if any.
    #[must_use]
    pub fn time_until_recompute(&self) -> Option<Duration> {
        self.debouncer.remaining(self.clock.now())
    }

    /// Records matching the latest requested criteria, in source order.
    ///
    /// Pure: does not touch `filtered_records` or the debounce.
    #[must_use]
    pub fn apply_filters(&self) -> Vec<PersonRecord> {
        self.pending.apply(&self.all_records)
    }

    fn commit_pending(&mut self) {
        self.applied = self.pending.clone();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = self.applied.apply(&self.all_records);
        self.recompute_count += 1;
        debug!(
            name = %self.applied.name,
            city = %self.applied.city,
            matched = self.filtered.len(),
            total = self.all_records.len(),
            "filters applied"
        );
        self.refresh_highlight();
    }

    fn refresh_highlight(&mut self) {
        self.highlight = if self.highlight_enabled {
            compute_oldest_by_city(&self.filtered)
        } else {
            HighlightMap::new()
        };
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// The load failure message, if the load failed.
    #[must_use]
    pub const fn error_message(&self) -> Option<&str> {
        match &self.load_state {
            LoadState::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn all_records(&self) -> &[PersonRecord] {
        &self.all_records
    }

    #[must_use]
    pub fn filtered_records(&self) -> &[PersonRecord] {
        &self.filtered
    }

    #[must_use]
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Name filter the current result was computed with.
    #[must_use]
    pub fn name_filter(&self) -> &str {
        &self.applied.name
    }

    /// City filter the current result was computed with.
    #[must_use]
    pub fn city_filter(&self) -> &str {
        &self.applied.city
    }

    /// Latest requested criteria, possibly not yet applied.
    #[must_use]
    pub const fn pending_criteria(&self) -> &FilterCriteria {
        &self.pending
    }

    #[must_use]
    pub const fn highlight_enabled(&self) -> bool {
        self.highlight_enabled
    }

    /// City → oldest displayed record id. Empty while highlighting is off.
    #[must_use]
    pub const fn highlight_map(&self) -> &HighlightMap {
        &self.highlight
    }

    #[must_use]
    pub fn is_oldest_in_city(&self, record: &PersonRecord) -> bool {
        self.highlight_enabled && self.highlight.get(&record.city) == Some(&record.id)
    }

    /// Number of times `filtered_records` has been recomputed.
    #[must_use]
    pub const fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    #[must_use]
    pub const fn view(&self) -> DirectoryView<'_> {
        match &self.load_state {
            LoadState::Loading => DirectoryView::Loading,
            LoadState::Error(message) => DirectoryView::Error(message.as_str()),
            LoadState::Ready if self.filtered.is_empty() => DirectoryView::Empty,
            LoadState::Ready => DirectoryView::Rows(self.filtered.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::source::StaticSource;
    use chrono::NaiveDate;

    fn person(id: u64, first: &str, last: &str, city: &str, born: (i32, u32, u32)) -> PersonRecord {
        PersonRecord::new(
            id,
            first,
            last,
            NaiveDate::from_ymd_opt(born.0, born.1, born.2).unwrap(),
            city,
        )
    }

    fn sample() -> Vec<PersonRecord> {
        vec![
            person(1, "John", "Doe", "New York", (1990, 5, 15)),
            person(2, "Jane", "Smith", "Boston", (1985, 1, 1)),
            person(3, "Bob", "Johnson", "New York", (1975, 3, 9)),
            person(4, "Alice", "Brown", "Boston", (1985, 1, 1)),
        ]
    }

    fn store_with(clock: &ManualClock) -> DirectoryStore<ManualClock> {
        DirectoryStore::with_clock(clock.clone(), DEFAULT_QUIET_WINDOW)
    }

    fn loaded(clock: &ManualClock) -> DirectoryStore<ManualClock> {
        let mut store = store_with(clock);
        store.load(&StaticSource::new(sample())).unwrap();
        store
    }

    fn names(store: &DirectoryStore<ManualClock>) -> Vec<String> {
        store
            .filtered_records()
            .iter()
            .map(PersonRecord::full_name)
            .collect()
    }

    #[test]
    fn starts_loading_and_empty() {
        let store = store_with(&ManualClock::new());
        assert_eq!(store.load_state(), &LoadState::Loading);
        assert_eq!(store.view(), DirectoryView::Loading);
        assert!(store.filtered_records().is_empty());
        assert!(store.cities().is_empty());
        assert!(!store.highlight_enabled());
        assert_eq!(store.name_filter(), "");
        assert_eq!(store.city_filter(), "");
    }

    #[test]
    fn load_success_populates_records_and_cities() {
        let store = loaded(&ManualClock::new());
        assert!(store.load_state().is_ready());
        assert_eq!(store.filtered_records().len(), 4);
        assert_eq!(store.cities(), ["Boston", "New York"]);
        assert_eq!(store.error_message(), None);
        assert_eq!(store.all_records(), sample().as_slice());
    }

    #[test]
    fn load_failure_keeps_message_and_no_records() {
        let mut store = store_with(&ManualClock::new());
        let source = StaticSource::failing(DataAccessError::Status { status: 500 });
        store.load(&source).unwrap();

        assert_eq!(
            store.error_message(),
            Some("Failed to fetch users (HTTP 500)")
        );
        assert_eq!(store.view(), DirectoryView::Error("Failed to fetch users (HTTP 500)"));
        assert!(store.all_records().is_empty());
        assert!(store.cities().is_empty());
    }

    #[test]
    fn thrown_message_is_preserved_verbatim() {
        let mut store = store_with(&ManualClock::new());
        let source = StaticSource::failing(DataAccessError::Other("Network request failed".into()));
        store.load(&source).unwrap();
        assert_eq!(store.error_message(), Some("Network request failed"));

        // stable across reads and ticks
        store.tick();
        assert_eq!(store.error_message(), Some("Network request failed"));
    }

    #[test]
    fn second_load_is_rejected() {
        let mut store = loaded(&ManualClock::new());
        let err = store.load(&StaticSource::new(Vec::new())).unwrap_err();
        assert_eq!(err, StoreError::AlreadyLoaded);
        assert_eq!(store.filtered_records().len(), 4, "first load untouched");

        let err = store.finish_load(Ok(Vec::new())).unwrap_err();
        assert_eq!(err, StoreError::AlreadyLoaded);
    }

    #[test]
    fn begin_then_finish_load() {
        let mut store = store_with(&ManualClock::new());
        store.begin_load().unwrap();
        assert_eq!(store.begin_load(), Err(StoreError::AlreadyLoaded));
        assert!(store.load_state().is_loading());

        store.finish_load(Ok(sample())).unwrap();
        assert!(store.load_state().is_ready());
    }

    #[test]
    fn name_filter_waits_for_quiet_window() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);

        store.search_by_name("john");
        assert!(store.is_recompute_pending());
        assert_eq!(store.filtered_records().len(), 4, "not applied yet");

        clock.advance_millis(999);
        assert!(!store.tick());
        assert_eq!(store.filtered_records().len(), 4);

        clock.advance_millis(1);
        assert!(store.tick());
        assert_eq!(names(&store), ["John Doe", "Bob Johnson"]);
        assert_eq!(store.name_filter(), "john");
        assert!(!store.is_recompute_pending());
    }

    #[test]
    fn burst_of_changes_recomputes_once_with_last_value() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        let before = store.recompute_count();

        for term in ["j", "ja", "jan", "jane", "jo"] {
            store.search_by_name(term);
            clock.advance_millis(40);
            assert!(!store.tick());
        }

        clock.advance_millis(1_000);
        assert!(store.tick());
        assert!(!store.tick());
        assert_eq!(store.recompute_count(), before + 1);
        assert_eq!(store.name_filter(), "jo");
        assert_eq!(names(&store), ["John Doe", "Bob Johnson"]);
    }

    #[test]
    fn name_and_city_share_one_window() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        let before = store.recompute_count();

        store.search_by_name("john");
        clock.advance_millis(600);
        store.filter_by_city("New York");

        clock.advance_millis(600);
        assert!(!store.tick(), "city change restarted the window");

        clock.advance_millis(400);
        assert!(store.tick());
        assert_eq!(store.recompute_count(), before + 1);
        assert_eq!(names(&store), ["John Doe", "Bob Johnson"]);
    }

    #[test]
    fn city_filter_is_exact_and_empty_means_all() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);

        store.filter_by_city("Boston");
        store.flush();
        assert_eq!(names(&store), ["Jane Smith", "Alice Brown"]);

        store.filter_by_city("");
        store.flush();
        assert_eq!(store.filtered_records().len(), 4);
    }

    #[test]
    fn combined_filter_is_an_intersection() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        store.search_by_name("jane");
        store.filter_by_city("New York");
        store.flush();
        assert_eq!(store.view(), DirectoryView::Empty);
    }

    #[test]
    fn apply_filters_is_pure() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        let before = store.recompute_count();

        store.search_by_name("SMITH");
        let preview = store.apply_filters();
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].full_name(), "Jane Smith");
        assert_eq!(store.filtered_records().len(), 4);
        assert_eq!(store.recompute_count(), before);
        assert!(store.is_recompute_pending());
    }

    #[test]
    fn unchanged_criteria_do_not_reschedule() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        store.search_by_name("");
        store.filter_by_city("");
        assert!(!store.is_recompute_pending());
    }

    #[test]
    fn teardown_cancels_pending_recompute() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        let before = store.recompute_count();

        store.search_by_name("john");
        store.teardown();
        assert!(!store.is_recompute_pending());

        clock.advance_millis(5_000);
        assert!(!store.tick());
        store.search_by_name("bob");
        clock.advance_millis(5_000);
        assert!(!store.tick());
        assert_eq!(store.recompute_count(), before);
        assert_eq!(store.filtered_records().len(), 4);
    }

    #[test]
    fn criteria_set_while_loading_apply_after_load() {
        let clock = ManualClock::new();
        let mut store = store_with(&clock);
        store.begin_load().unwrap();

        store.search_by_name("john");
        clock.advance_millis(1_000);
        assert!(store.tick(), "recompute runs over empty records");
        assert!(store.filtered_records().is_empty());
        assert_eq!(store.view(), DirectoryView::Loading);

        store.finish_load(Ok(sample())).unwrap();
        assert_eq!(names(&store), ["John Doe", "Bob Johnson"]);
    }

    #[test]
    fn load_during_pending_window_shows_all_until_fire() {
        let clock = ManualClock::new();
        let mut store = store_with(&clock);
        store.begin_load().unwrap();

        store.search_by_name("john");
        clock.advance_millis(300);
        store.finish_load(Ok(sample())).unwrap();
        assert_eq!(store.filtered_records().len(), 4);

        clock.advance_millis(700);
        assert!(store.tick());
        assert_eq!(names(&store), ["John Doe", "Bob Johnson"]);
    }

    #[test]
    fn highlight_toggle_is_immediate_and_scoped_to_filtered() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        assert!(store.highlight_map().is_empty());

        store.toggle_highlight_oldest();
        assert!(store.highlight_enabled());
        assert_eq!(store.highlight_map()["New York"], 3);
        // Jane and Alice share a birth date; Jane comes first.
        assert_eq!(store.highlight_map()["Boston"], 2);

        store.search_by_name("john");
        store.flush();
        assert_eq!(store.highlight_map().len(), 1);
        assert_eq!(store.highlight_map()["New York"], 3);

        let filtered_before = store.filtered_records().to_vec();
        store.toggle_highlight_oldest();
        assert!(store.highlight_map().is_empty());
        assert_eq!(store.filtered_records(), filtered_before.as_slice());
        assert!(store.filtered_records().iter().all(|r| !store.is_oldest_in_city(r)));
    }

    #[test]
    fn is_oldest_in_city_marks_only_winners() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        store.toggle_highlight_oldest();

        let marked: Vec<u64> = store
            .filtered_records()
            .iter()
            .filter(|r| store.is_oldest_in_city(r))
            .map(|r| r.id)
            .collect();
        assert_eq!(marked, [2, 3]);
    }

    #[test]
    fn empty_result_is_distinct_from_loading() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        store.search_by_name("zzz");
        clock.advance_millis(1_000);
        store.tick();
        assert_eq!(store.view(), DirectoryView::Empty);
        assert_ne!(store.view(), DirectoryView::Loading);
    }

    #[test]
    fn time_until_recompute_tracks_deadline() {
        let clock = ManualClock::new();
        let mut store = loaded(&clock);
        assert_eq!(store.time_until_recompute(), None);

        store.search_by_name("a");
        clock.advance_millis(250);
        assert_eq!(
            store.time_until_recompute(),
            Some(Duration::from_millis(750))
        );
    }
}
