//! Domain types shared by the fetchers, the calculators and the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One selectable country in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOption {
    /// Lowercase ISO 3166-1 alpha-2 code, e.g. `jp`
    pub code: String,
    /// Common name shown in the selector
    pub display_name: String,
    /// Flag image URL
    pub flag_url: String,
    /// Lowercase "common official code" text used for substring search
    pub search_text: String,
}

impl CountryOption {
    /// Whether this option matches an already-lowercased query.
    #[inline]
    pub fn matches(&self, query: &str) -> bool {
        self.search_text.contains(query)
    }
}

/// Current aggregate statistics for one country.
///
/// Only `cases`, `deaths`, `recovered` and `population` feed the
/// calculators; the rest decorates the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentStats {
    /// Cumulative confirmed cases
    pub cases: u64,
    /// Cumulative deaths
    pub deaths: u64,
    /// Cumulative recoveries, when the source tracks them
    pub recovered: Option<u64>,
    /// Country population, when known
    pub population: Option<u64>,
    /// Country name as reported by the statistics source
    pub country: Option<String>,
    /// Cases reported today
    pub today_cases: Option<u64>,
    /// Deaths reported today
    pub today_deaths: Option<u64>,
    /// Currently active cases
    pub active: Option<u64>,
    /// Last upstream update, epoch milliseconds
    pub updated: Option<i64>,
}

/// Which of the three cumulative series to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// Confirmed cases
    Cases,
    /// Deaths
    Deaths,
    /// Recoveries
    Recovered,
}

impl SeriesKind {
    /// All kinds in chart legend order.
    pub const ALL: [SeriesKind; 3] = [SeriesKind::Cases, SeriesKind::Deaths, SeriesKind::Recovered];

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Cases => "Cases",
            SeriesKind::Deaths => "Deaths",
            SeriesKind::Recovered => "Recovered",
        }
    }
}

/// Historical cumulative counts keyed by calendar date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    /// Cumulative cases per day
    pub cases: BTreeMap<NaiveDate, u64>,
    /// Cumulative deaths per day
    pub deaths: BTreeMap<NaiveDate, u64>,
    /// Cumulative recoveries per day
    pub recovered: BTreeMap<NaiveDate, u64>,
}

impl HistoricalSeries {
    /// Build from the raw string-keyed maps of the upstream payload.
    ///
    /// Keys that are neither `M/D/YY` nor `YYYY-MM-DD` are skipped.
    pub fn from_raw(
        cases: &HashMap<String, u64>,
        deaths: &HashMap<String, u64>,
        recovered: &HashMap<String, u64>,
    ) -> Self {
        Self {
            cases: parse_keyed(cases),
            deaths: parse_keyed(deaths),
            recovered: parse_keyed(recovered),
        }
    }

    /// Mapping for one series kind.
    pub fn get(&self, kind: SeriesKind) -> &BTreeMap<NaiveDate, u64> {
        match kind {
            SeriesKind::Cases => &self.cases,
            SeriesKind::Deaths => &self.deaths,
            SeriesKind::Recovered => &self.recovered,
        }
    }

    /// Count for a date, zero when the date is missing.
    #[inline]
    pub fn count(&self, kind: SeriesKind, date: NaiveDate) -> u64 {
        self.get(kind).get(&date).copied().unwrap_or(0)
    }

    /// Earliest and latest dates present in the cases mapping.
    pub fn available_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.cases.keys().next()?;
        let last = self.cases.keys().next_back()?;
        Some((*first, *last))
    }

    /// True when no case dates are present.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Everything one successful fetch publishes for a country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySnapshot {
    /// Country code the snapshot was fetched for
    pub code: String,
    /// Current aggregate statistics
    pub stats: CurrentStats,
    /// Historical daily series
    pub history: HistoricalSeries,
}

/// Parse a historical-series date key.
pub fn parse_series_date(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%m/%d/%y")
        .or_else(|_| NaiveDate::parse_from_str(key, "%Y-%m-%d"))
        .ok()
}

fn parse_keyed(raw: &HashMap<String, u64>) -> BTreeMap<NaiveDate, u64> {
    let mut parsed = BTreeMap::new();
    for (key, value) in raw {
        match parse_series_date(key) {
            Some(date) => {
                parsed.insert(date, *value);
            },
            None => tracing::warn!("Skipping unparseable series date key: {:?}", key),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_series_date_formats() {
        assert_eq!(parse_series_date("1/22/20"), Some(date(2020, 1, 22)));
        assert_eq!(parse_series_date("12/3/21"), Some(date(2021, 12, 3)));
        assert_eq!(parse_series_date("2021-01-05"), Some(date(2021, 1, 5)));
        assert_eq!(parse_series_date("yesterday"), None);
    }

    #[test]
    fn test_from_raw_skips_bad_keys_and_sorts() {
        let mut cases = HashMap::new();
        cases.insert("3/1/21".to_string(), 30);
        cases.insert("1/1/21".to_string(), 10);
        cases.insert("garbage".to_string(), 99);

        let series = HistoricalSeries::from_raw(&cases, &HashMap::new(), &HashMap::new());

        assert_eq!(series.cases.len(), 2);
        assert_eq!(series.available_range(), Some((date(2021, 1, 1), date(2021, 3, 1))));
        assert_eq!(series.count(SeriesKind::Deaths, date(2021, 1, 1)), 0);
    }

    #[test]
    fn test_current_stats_ignores_unknown_fields() {
        let json = r#"{"country":"Japan","cases":33803572,"deaths":74694,
            "recovered":0,"population":125584838,"todayCases":12,"tests":100,
            "countryInfo":{"iso2":"JP"}}"#;
        let stats: CurrentStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.cases, 33_803_572);
        assert_eq!(stats.recovered, Some(0));
        assert_eq!(stats.today_cases, Some(12));
        assert_eq!(stats.country.as_deref(), Some("Japan"));
    }

    #[test]
    fn test_current_stats_missing_optionals() {
        let stats: CurrentStats = serde_json::from_str(r#"{"cases":1000,"deaths":10}"#).unwrap();
        assert_eq!(stats.recovered, None);
        assert_eq!(stats.population, None);
    }
}
