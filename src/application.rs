//! Main application entry point for the dashboard.

use crate::api::{DataSource, HttpSource};
use crate::core::{Config, CountrySnapshot, Result};
use crate::series::{self, ChartSeries, DateRange};
use crate::stats;
use crate::tui;
use std::fmt::Write as _;
use std::sync::Arc;

/// Coordinates the data source and the front ends.
pub struct Application {
    /// Application configuration
    config: Arc<Config>,
    /// Where statistics come from
    source: Arc<dyn DataSource>,
}

impl Application {
    /// Create an application talking to the configured REST endpoints.
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let source: Arc<dyn DataSource> = Arc::new(HttpSource::new(Arc::clone(&config))?);
        Ok(Self { config, source })
    }

    /// Create an application over any data source.
    pub fn with_source(config: Config, source: Arc<dyn DataSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }

    /// Run the interactive dashboard.
    pub async fn run(self, range: Option<DateRange>) -> Result<()> {
        tracing::info!(country = %self.config.ui.default_country, "Starting dashboard");
        tui::run_dashboard(self.source, self.config, range).await
    }

    /// Fetch the default country once and render a plain-text summary.
    pub async fn report(&self, range: DateRange) -> Result<String> {
        let code = &self.config.ui.default_country;
        tracing::info!(country = %code, %range, "Fetching report");

        let snapshot = self.source.fetch_snapshot(code).await?;
        let chart = series::transform(&snapshot.history, &range)?;
        Ok(render_report(&snapshot, &chart))
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn render_report(snapshot: &CountrySnapshot, chart: &ChartSeries) -> String {
    let name = snapshot
        .stats
        .country
        .clone()
        .unwrap_or_else(|| snapshot.code.to_ascii_uppercase());

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "{} ({})  {} - {}",
        name,
        snapshot.code.to_ascii_uppercase(),
        chart.effective_start.format("%d-%m-%Y"),
        chart.effective_end.format("%d-%m-%Y")
    );
    let _ = writeln!(out);

    for card in stats::stat_cards(&snapshot.stats) {
        let marker = if card.estimated { " (est.)" } else { "" };
        let _ = writeln!(
            out,
            "{:<12} {:>10}{:<7} {:>8} {}",
            card.label, card.value, marker, card.percentage, card.percentage_label
        );
    }
    let _ = writeln!(out);

    for slice in stats::composition(&snapshot.stats) {
        let _ = writeln!(out, "{:<17} {:>16}", slice.label, stats::format_grouped(Some(slice.value)));
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Peak: {}M Cases on {}",
        chart.peak.value_label(),
        chart.peak.date.format("%d-%m-%Y")
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CurrentStats, HistoricalSeries};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn snapshot() -> CountrySnapshot {
        let cases: HashMap<String, u64> = [("1/1/21", 100_000), ("1/2/21", 500_000), ("1/3/21", 300_000)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        CountrySnapshot {
            code: "jp".to_string(),
            stats: CurrentStats {
                cases: 1000,
                deaths: 10,
                population: Some(10_000),
                country: Some("Japan".to_string()),
                ..CurrentStats::default()
            },
            history: HistoricalSeries::from_raw(&cases, &HashMap::new(), &HashMap::new()),
        }
    }

    #[test]
    fn test_report_lists_cards_and_peak() {
        let snapshot = snapshot();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        )
        .unwrap();
        let chart = series::transform(&snapshot.history, &range).unwrap();

        let text = render_report(&snapshot, &chart);
        assert!(text.starts_with("Japan (JP)  01-01-2021 - 03-01-2021"));
        assert!(text.contains("Recoveries"));
        assert!(text.contains("(est.)"));
        assert!(text.contains("Peak: 0.5M Cases on 02-01-2021"));
    }
}
