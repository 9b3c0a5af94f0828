//! Dashboard view-model.
//!
//! All UI state lives in one [`DashboardState`] owned by the UI loop. It
//! never touches the terminal or the network: methods that need a fetch
//! hand back a [`RequestTag`] and the loop starts the request.

use crate::api::{CountryCatalog, RequestTag, RequestTracker};
use crate::core::{CountryOption, CountrySnapshot, DashError, Result};
use crate::series::{self, ChartSeries, DateRange, RangeBound};
use chrono::NaiveDate;
use ratatui::layout::Rect;

/// Selector popup rows kept in view.
pub const SELECTOR_PAGE: usize = 10;

/// Country list loading state.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    /// Request outstanding
    Loading,
    /// Loaded
    Ready(CountryCatalog),
    /// Terminal failure, message for the user
    Failed(String),
}

/// Main view phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Waiting for the joint fetch
    Loading,
    /// Cards and charts come from this snapshot and chart
    Ready {
        /// Snapshot the view is built from
        snapshot: Box<CountrySnapshot>,
        /// Chart derived from the snapshot and the current range
        chart: Box<ChartSeries>,
    },
    /// Full-screen error view
    Failed(String),
}

/// Popup currently shown over the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// Nothing open
    None,
    /// Date picker, editing one bound
    DatePicker {
        /// Bound the arrow keys move
        field: RangeBound,
    },
    /// Country search
    Selector {
        /// Typed query
        query: String,
        /// Highlighted row among the matches
        cursor: usize,
    },
}

/// How a date-picker key moves the focused bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEdit {
    /// ± days
    Days(i64),
    /// ± months
    Months(i32),
}

/// Everything the dashboard shows, in one place.
#[derive(Debug)]
pub struct DashboardState {
    country: String,
    range: DateRange,
    default_start: NaiveDate,
    catalog: CatalogState,
    phase: Phase,
    overlay: Overlay,
    tracker: RequestTracker,
    picker_area: Option<Rect>,
    /// Set when the user asked to quit
    pub should_quit: bool,
}

impl DashboardState {
    /// Fresh state for `country` with the default range ending `today`.
    pub fn new(country: &str, default_start: NaiveDate, today: NaiveDate) -> Self {
        Self {
            country: country.to_ascii_lowercase(),
            range: DateRange::default_for(default_start, today),
            default_start,
            catalog: CatalogState::Loading,
            phase: Phase::Loading,
            overlay: Overlay::None,
            tracker: RequestTracker::new(),
            picker_area: None,
            should_quit: false,
        }
    }

    /// Override the initial range (from the command line).
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Selected country code.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Current date window.
    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// Catalog state.
    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    /// Main view phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Open popup.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Display name for the selected country, falling back to its code.
    pub fn country_label(&self) -> String {
        if let CatalogState::Ready(catalog) = &self.catalog {
            if let Some(option) = catalog.find(&self.country) {
                return option.display_name.clone();
            }
        }
        if let Phase::Ready { snapshot, .. } = &self.phase {
            if let Some(name) = &snapshot.stats.country {
                return name.clone();
            }
        }
        self.country.to_ascii_uppercase()
    }

    /// Start a fetch for the selected country, dropping derived state.
    pub fn start_fetch(&mut self) -> RequestTag {
        self.phase = Phase::Loading;
        self.tracker.begin(&self.country)
    }

    /// Switch country. Re-selecting the current country is a no-op unless
    /// the view is showing an error.
    pub fn select_country(&mut self, code: &str) -> Option<RequestTag> {
        self.overlay = Overlay::None;
        let code = code.to_ascii_lowercase();
        if code == self.country && !matches!(self.phase, Phase::Failed(_)) {
            return None;
        }
        tracing::info!("Country selected: {}", code);
        self.country = code;
        Some(self.start_fetch())
    }

    /// Commit a fetch outcome. Returns false when the outcome is stale.
    pub fn apply_snapshot(&mut self, tag: &RequestTag, outcome: Result<CountrySnapshot>) -> bool {
        if !self.tracker.complete(tag) {
            return false;
        }
        self.phase = match outcome {
            Ok(snapshot) => self.derive(snapshot),
            Err(e) => {
                tracing::error!(
                    recoverable = e.is_recoverable(),
                    "Fetch for '{}' failed ({}): {}",
                    tag.country,
                    e.category(),
                    e
                );
                Phase::Failed(e.user_message())
            },
        };
        true
    }

    /// Record the catalog load result.
    pub fn apply_catalog(&mut self, outcome: Result<CountryCatalog>) {
        self.catalog = match outcome {
            Ok(catalog) => CatalogState::Ready(catalog),
            Err(e) => {
                tracing::error!("Catalog load failed: {}", e);
                CatalogState::Failed(e.user_message())
            },
        };
    }

    /// Move the focused date-picker bound. Invalid edits are dropped
    /// silently; a valid edit rebuilds the chart.
    pub fn edit_range(&mut self, edit: RangeEdit, today: NaiveDate) -> bool {
        let Overlay::DatePicker { field } = self.overlay else {
            return false;
        };
        let applied = match edit {
            RangeEdit::Days(days) => self.range.shift_days(field, days, today),
            RangeEdit::Months(months) => self.range.shift_months(field, months, today),
        };
        if applied {
            self.rederive();
        }
        applied
    }

    /// The error view's recovery action: default range, fetch again.
    pub fn retry(&mut self, today: NaiveDate) -> RequestTag {
        self.range = DateRange::default_for(self.default_start, today);
        self.overlay = Overlay::None;
        self.start_fetch()
    }

    /// Open or close the date picker.
    pub fn toggle_date_picker(&mut self) {
        self.overlay = match self.overlay {
            Overlay::DatePicker { .. } => Overlay::None,
            _ => Overlay::DatePicker {
                field: RangeBound::Start,
            },
        };
    }

    /// Switch the picker between start and end.
    pub fn switch_picker_field(&mut self) {
        if let Overlay::DatePicker { field } = &mut self.overlay {
            *field = field.toggle();
        }
    }

    /// Open the country search.
    pub fn open_selector(&mut self) {
        self.overlay = Overlay::Selector {
            query: String::new(),
            cursor: 0,
        };
    }

    /// Close whatever popup is open.
    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    /// Remember where the picker was drawn.
    pub fn set_picker_area(&mut self, area: Option<Rect>) {
        self.picker_area = area;
    }

    /// Pointer press at a terminal cell: outside the open picker closes it.
    pub fn click(&mut self, column: u16, row: u16) {
        if !matches!(self.overlay, Overlay::DatePicker { .. }) {
            return;
        }
        let inside = self.picker_area.is_some_and(|a| {
            column >= a.x && column < a.x.saturating_add(a.width) && row >= a.y && row < a.y.saturating_add(a.height)
        });
        if !inside {
            self.overlay = Overlay::None;
        }
    }

    /// Append to the search query.
    pub fn selector_input(&mut self, c: char) {
        if let Overlay::Selector { query, cursor } = &mut self.overlay {
            query.push(c);
            *cursor = 0;
        }
    }

    /// Remove the last query character.
    pub fn selector_backspace(&mut self) {
        if let Overlay::Selector { query, cursor } = &mut self.overlay {
            query.pop();
            *cursor = 0;
        }
    }

    /// Move the highlight within the matches.
    pub fn selector_move(&mut self, delta: isize) {
        let count = self.selector_matches().len();
        if let Overlay::Selector { cursor, .. } = &mut self.overlay {
            if count == 0 {
                *cursor = 0;
            } else {
                *cursor = cursor.saturating_add_signed(delta).min(count - 1);
            }
        }
    }

    /// Options matching the search query.
    pub fn selector_matches(&self) -> Vec<&CountryOption> {
        match (&self.overlay, &self.catalog) {
            (Overlay::Selector { query, .. }, CatalogState::Ready(catalog)) => catalog.search(query),
            _ => Vec::new(),
        }
    }

    /// Select the highlighted match.
    pub fn selector_confirm(&mut self) -> Option<RequestTag> {
        let Overlay::Selector { cursor, .. } = &self.overlay else {
            return None;
        };
        let code = self.selector_matches().get(*cursor).map(|o| o.code.clone())?;
        self.select_country(&code)
    }

    fn derive(&self, snapshot: CountrySnapshot) -> Phase {
        match series::transform(&snapshot.history, &self.range) {
            Ok(chart) => Phase::Ready {
                snapshot: Box::new(snapshot),
                chart: Box::new(chart),
            },
            Err(e) => empty_range(&e),
        }
    }

    fn rederive(&mut self) {
        let phase = std::mem::replace(&mut self.phase, Phase::Loading);
        self.phase = match phase {
            Phase::Ready { snapshot, .. } => self.derive(*snapshot),
            other => other,
        };
    }
}

fn empty_range(e: &DashError) -> Phase {
    tracing::warn!("{}", e);
    Phase::Failed(e.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::catalog::{RawCountry, RawFlags, RawName};
    use crate::core::{CurrentStats, HistoricalSeries};
    use crate::core::error::{FETCH_FAILED_MESSAGE, NO_DATA_MESSAGE};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2023, 3, 10)
    }

    fn snapshot(code: &str) -> CountrySnapshot {
        let mut history = HistoricalSeries::default();
        for (i, day) in (1..=28).enumerate() {
            history.cases.insert(date(2021, 2, day), 1_000_000 + i as u64 * 10_000);
        }
        CountrySnapshot {
            code: code.to_string(),
            stats: CurrentStats {
                cases: 1_270_000,
                deaths: 1_000,
                ..CurrentStats::default()
            },
            history,
        }
    }

    fn catalog() -> CountryCatalog {
        let raw = |common: &str, code: &str| RawCountry {
            name: RawName {
                common: common.to_string(),
                official: common.to_string(),
            },
            cca2: Some(code.to_string()),
            flags: RawFlags::default(),
        };
        CountryCatalog::from_raw(vec![raw("Japan", "JP"), raw("Jamaica", "JM"), raw("Germany", "DE")])
    }

    #[test]
    fn test_snapshot_builds_chart() {
        let mut state = DashboardState::new("us", date(2020, 10, 1), today());
        let tag = state.start_fetch();
        assert!(state.apply_snapshot(&tag, Ok(snapshot("us"))));

        let Phase::Ready { chart, .. } = state.phase() else {
            panic!("expected ready phase");
        };
        assert_eq!(chart.effective_start, date(2021, 2, 1));
        assert_eq!(chart.effective_end, date(2021, 2, 28));
    }

    #[test]
    fn test_stale_snapshot_is_discarded() {
        let mut state = DashboardState::new("us", date(2020, 10, 1), today());
        let us = state.start_fetch();
        let jp = state.select_country("jp").unwrap();

        assert!(!state.apply_snapshot(&us, Ok(snapshot("us"))));
        assert_eq!(state.phase(), &Phase::Loading);

        assert!(state.apply_snapshot(&jp, Ok(snapshot("jp"))));
        assert!(matches!(state.phase(), Phase::Ready { snapshot, .. } if snapshot.code == "jp"));
    }

    #[test]
    fn test_failed_fetch_shows_error_without_chart() {
        let mut state = DashboardState::new("jp", date(2020, 10, 1), today());
        let tag = state.start_fetch();
        state.apply_snapshot(&tag, Err(DashError::fetch("jp", "HTTP 500")));
        assert_eq!(state.phase(), &Phase::Failed(FETCH_FAILED_MESSAGE.to_string()));
    }

    #[test]
    fn test_range_outside_data_fails_then_retry_resets() {
        let mut state = DashboardState::new("us", date(2020, 10, 1), today())
            .with_range(DateRange::new(date(2022, 1, 1), date(2022, 6, 1), today()).unwrap());
        let tag = state.start_fetch();
        state.apply_snapshot(&tag, Ok(snapshot("us")));
        assert_eq!(state.phase(), &Phase::Failed(NO_DATA_MESSAGE.to_string()));

        let retry = state.retry(today());
        assert_eq!(state.range().start(), date(2020, 10, 1));
        assert_eq!(state.range().end(), today());
        assert_eq!(state.phase(), &Phase::Loading);
        assert!(state.apply_snapshot(&retry, Ok(snapshot("us"))));
        assert!(matches!(state.phase(), Phase::Ready { .. }));
    }

    #[test]
    fn test_range_edit_rebuilds_chart() {
        let mut state = DashboardState::new("us", date(2020, 10, 1), today())
            .with_range(DateRange::new(date(2020, 10, 1), date(2021, 3, 10), today()).unwrap());
        let tag = state.start_fetch();
        state.apply_snapshot(&tag, Ok(snapshot("us")));

        // editing is only possible with the picker open
        assert!(!state.edit_range(RangeEdit::Days(1), today()));

        state.toggle_date_picker();
        state.switch_picker_field();
        assert!(state.edit_range(RangeEdit::Months(-1), today()));
        let Phase::Ready { chart, .. } = state.phase() else {
            panic!("expected ready phase");
        };
        assert_eq!(chart.dates.len(), 10);

        // future end is ignored
        assert!(!state.edit_range(RangeEdit::Months(48), today()));
        assert_eq!(state.range().end(), date(2021, 2, 10));
    }

    #[test]
    fn test_click_outside_picker_closes_it() {
        let mut state = DashboardState::new("us", date(2020, 10, 1), today());
        state.toggle_date_picker();
        state.set_picker_area(Some(Rect::new(10, 5, 20, 6)));

        state.click(15, 7);
        assert!(matches!(state.overlay(), Overlay::DatePicker { .. }));

        state.click(2, 2);
        assert_eq!(state.overlay(), &Overlay::None);
    }

    #[test]
    fn test_selector_search_and_confirm() {
        let mut state = DashboardState::new("us", date(2020, 10, 1), today());
        state.apply_catalog(Ok(catalog()));
        state.open_selector();
        for c in "ja".chars() {
            state.selector_input(c);
        }

        let names: Vec<&str> = state.selector_matches().iter().map(|o| o.display_name.as_str()).collect();
        assert_eq!(names, vec!["Jamaica", "Japan"]);

        state.selector_move(5);
        let tag = state.selector_confirm().unwrap();
        assert_eq!(tag.country, "jp");
        assert_eq!(state.country(), "jp");
        assert_eq!(state.overlay(), &Overlay::None);
        assert_eq!(state.country_label(), "Japan");
    }

    #[test]
    fn test_reselecting_same_country_does_not_refetch() {
        let mut state = DashboardState::new("jp", date(2020, 10, 1), today());
        let tag = state.start_fetch();
        state.apply_snapshot(&tag, Ok(snapshot("jp")));
        assert!(state.select_country("JP").is_none());
    }

    #[test]
    fn test_catalog_failure_message() {
        let mut state = DashboardState::new("us", date(2020, 10, 1), today());
        state.apply_catalog(Err(DashError::catalog("HTTP 503")));
        assert_eq!(state.catalog(), &CatalogState::Failed("Failed to load countries".to_string()));
    }
}
