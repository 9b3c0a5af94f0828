//! Country selection and fetch flow through the view-model.

mod common;

use async_trait::async_trait;
use common::*;
use pandash_lib::api::{CountryCatalog, DataSource, HttpSource, RawCountry};
use pandash_lib::core::{ConfigBuilder, CountrySnapshot, DashError, Result};
use pandash_lib::tui::state::{CatalogState, DashboardState, Phase};
use pandash_lib::Application;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::{MockServer, ResponseTemplate};

/// Serves fixtures and counts joint fetches.
struct FixtureSource {
    fetches: AtomicUsize,
    fail: bool,
}

impl FixtureSource {
    fn new(fail: bool) -> Self {
        Self {
            fetches: AtomicUsize::new(0),
            fail,
        }
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    async fn load_catalog(&self) -> Result<CountryCatalog> {
        let raw: Vec<RawCountry> = serde_json::from_value(catalog_json())?;
        Ok(CountryCatalog::from_raw(raw))
    }

    async fn fetch_snapshot(&self, code: &str) -> Result<CountrySnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DashError::fetch(code, "upstream unavailable"));
        }
        let stats = serde_json::from_value(stats_json())?;
        let payload: pandash_lib::api::metrics::HistoricalPayload = serde_json::from_value(history_json())?;
        Ok(CountrySnapshot {
            code: code.to_string(),
            stats,
            history: payload.timeline.unwrap_or_default().into_series(),
        })
    }
}

fn state() -> DashboardState {
    DashboardState::new("us", date(2020, 10, 1), date(2023, 1, 1))
}

async fn select_japan(state: &mut DashboardState, source: &dyn DataSource) {
    state.apply_catalog(source.load_catalog().await);
    state.open_selector();
    for c in "jap".chars() {
        state.selector_input(c);
    }
    let tag = state.selector_confirm().expect("selecting a new country starts a fetch");
    assert_eq!(tag.country, "jp");
    assert_eq!(state.phase(), &Phase::Loading);

    let outcome = source.fetch_snapshot(&tag.country).await;
    assert!(state.apply_snapshot(&tag, outcome));
}

#[tokio::test]
async fn test_selecting_japan_renders_one_snapshot() {
    let source = FixtureSource::new(false);
    let mut state = state();

    select_japan(&mut state, &source).await;

    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    let Phase::Ready { snapshot, chart } = state.phase() else {
        panic!("expected a ready dashboard, got {:?}", state.phase());
    };
    assert_eq!(snapshot.code, "jp");
    assert_eq!(snapshot.stats.cases, 2_000_000);
    assert_eq!(chart.dates.len(), 10);
    assert_eq!(chart.peak.value_label(), "0.9");
    assert_eq!(chart.peak.date, date(2021, 1, 6));
    assert_eq!(state.country_label(), "Japan");
}

#[tokio::test]
async fn test_failed_fetch_shows_error_and_no_chart() {
    let source = FixtureSource::new(true);
    let mut state = state();

    select_japan(&mut state, &source).await;

    assert_eq!(
        state.phase(),
        &Phase::Failed("Failed to fetch data. Please try again later.".to_string())
    );
}

#[tokio::test]
async fn test_last_selection_wins() {
    let source = FixtureSource::new(false);
    let mut state = state();
    state.apply_catalog(source.load_catalog().await);

    let first = state.select_country("de").unwrap();
    let second = state.select_country("jp").unwrap();

    let late = source.fetch_snapshot(&first.country).await;
    let current = source.fetch_snapshot(&second.country).await;

    // The newer request finishes first, the older one straggles in after
    assert!(state.apply_snapshot(&second, current));
    assert!(!state.apply_snapshot(&first, late));
    assert_eq!(state.country(), "jp");
    assert!(matches!(state.phase(), Phase::Ready { snapshot, .. } if snapshot.code == "jp"));
}

#[tokio::test]
async fn test_catalog_ready_through_http() {
    let server = healthy_server().await;
    let source = HttpSource::new(Arc::new(config_for(&server))).unwrap();
    let mut state = state();

    state.apply_catalog(source.load_catalog().await);
    let CatalogState::Ready(catalog) = state.catalog() else {
        panic!("catalog should be ready");
    };
    assert_eq!(catalog.len(), 4);
}

#[tokio::test]
async fn test_end_to_end_against_mock_server() {
    let server = healthy_server().await;
    let source = HttpSource::new(Arc::new(config_for(&server))).unwrap();
    let mut state = state();

    select_japan(&mut state, &source).await;
    assert!(matches!(state.phase(), Phase::Ready { .. }));
}

#[tokio::test]
async fn test_half_failure_against_mock_server() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(catalog_json())).await;
    mount_stats(&server, "jp", ResponseTemplate::new(200).set_body_json(stats_json())).await;
    mount_history(&server, "jp", ResponseTemplate::new(500)).await;
    let source = HttpSource::new(Arc::new(config_for(&server))).unwrap();
    let mut state = state();

    select_japan(&mut state, &source).await;
    assert!(matches!(state.phase(), Phase::Failed(_)));
}

#[tokio::test]
async fn test_report_uses_the_configured_country() {
    let config = ConfigBuilder::new().default_country("jp").build().unwrap();
    let app = Application::with_source(config, Arc::new(FixtureSource::new(false)));
    let range = pandash_lib::series::DateRange::default_for(date(2020, 10, 1), date(2023, 1, 1));

    let text = app.report(range).await.unwrap();

    assert!(text.starts_with("Japan (JP)  01-01-2021 - 10-01-2021"));
    assert!(text.contains("Total Cases"));
    assert!(text.contains("125,000,000"));
    assert!(text.contains("Peak: 0.9M Cases on 06-01-2021"));
}
