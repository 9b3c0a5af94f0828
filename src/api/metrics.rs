//! Current statistics + historical series for one country, fetched jointly.

use crate::core::{Config, CountrySnapshot, CurrentStats, DashError, HistoricalSeries, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// Historical endpoint payload. Only the timeline is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalPayload {
    /// Daily cumulative counts
    #[serde(default)]
    pub timeline: Option<RawTimeline>,
}

/// String-keyed daily counts as sent upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTimeline {
    /// Cases by date key
    #[serde(default)]
    pub cases: HashMap<String, u64>,
    /// Deaths by date key
    #[serde(default)]
    pub deaths: HashMap<String, u64>,
    /// Recoveries by date key
    #[serde(default)]
    pub recovered: HashMap<String, u64>,
}

impl RawTimeline {
    /// Parse date keys into a [`HistoricalSeries`].
    pub fn into_series(self) -> HistoricalSeries {
        HistoricalSeries::from_raw(&self.cases, &self.deaths, &self.recovered)
    }
}

/// Fetch current statistics for a country.
pub async fn fetch_stats(client: &reqwest::Client, config: &Config, code: &str) -> Result<CurrentStats> {
    get_json(client, config, code, &config.stats_url(code)).await
}

/// Fetch the historical series for a country over the configured lookback.
pub async fn fetch_history(client: &reqwest::Client, config: &Config, code: &str) -> Result<HistoricalSeries> {
    let payload: HistoricalPayload = get_json(client, config, code, &config.historical_url(code)).await?;
    let timeline = payload
        .timeline
        .ok_or_else(|| DashError::fetch(code, "historical payload has no timeline"))?;
    Ok(timeline.into_series())
}

/// Fetch both halves concurrently. Either failure fails the whole snapshot.
pub async fn fetch_snapshot(client: &reqwest::Client, config: &Config, code: &str) -> Result<CountrySnapshot> {
    tracing::info!("Fetching statistics and history for '{}'", code);

    let (stats, history) = tokio::try_join!(
        fetch_stats(client, config, code),
        fetch_history(client, config, code)
    )?;

    tracing::info!(
        "Fetched '{}': {} cases, {} history days",
        code,
        stats.cases,
        history.cases.len()
    );

    Ok(CountrySnapshot {
        code: code.to_string(),
        stats,
        history,
    })
}

async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, config: &Config, code: &str, url: &str) -> Result<T> {
    let map_err = |e: reqwest::Error| -> DashError {
        if e.is_timeout() {
            #[allow(clippy::cast_possible_truncation)]
            let timeout_ms = config.api.request_timeout.as_millis() as u64;
            DashError::Timeout { timeout_ms }
        } else {
            DashError::fetch(code, e.to_string())
        }
    };

    let response = client.get(url).send().await.map_err(map_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(DashError::fetch(code, format!("HTTP {} from {}", status, url)));
    }
    response.json::<T>().await.map_err(map_err)
}
