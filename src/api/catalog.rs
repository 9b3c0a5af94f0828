//! Country catalog: the list behind the country selector.

use crate::core::{CountryOption, DashError, Result};
use serde::Deserialize;
use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Country record as returned by the catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCountry {
    /// Names
    pub name: RawName,
    /// ISO alpha-2 code
    #[serde(default)]
    pub cca2: Option<String>,
    /// Flag images
    #[serde(default)]
    pub flags: RawFlags,
}

/// Country names.
#[derive(Debug, Clone, Deserialize)]
pub struct RawName {
    /// Common name, e.g. "Japan"
    pub common: String,
    /// Official name; some records omit it
    #[serde(default)]
    pub official: String,
}

/// Flag image URLs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFlags {
    /// SVG flag
    #[serde(default)]
    pub svg: Option<String>,
    /// PNG flag
    #[serde(default)]
    pub png: Option<String>,
}

impl RawCountry {
    /// Normalise into a selector option; `None` without a usable code.
    pub fn into_option(self) -> Option<CountryOption> {
        let code = self.cca2?.trim().to_ascii_lowercase();
        if code.len() != 2 {
            return None;
        }
        let search_text = format!("{} {} {}", self.name.common, self.name.official, code).to_lowercase();
        Some(CountryOption {
            flag_url: self.flags.svg.or(self.flags.png).unwrap_or_default(),
            display_name: self.name.common,
            search_text,
            code,
        })
    }
}

/// Sorted, immutable list of selectable countries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryCatalog {
    options: Vec<CountryOption>,
}

impl CountryCatalog {
    /// Normalise and sort raw records by display name.
    pub fn from_raw(raw: Vec<RawCountry>) -> Self {
        let total = raw.len();
        let mut options: Vec<CountryOption> = raw.into_iter().filter_map(RawCountry::into_option).collect();
        if options.len() < total {
            tracing::warn!("Dropped {} catalog records without a two-letter code", total - options.len());
        }
        options.sort_by(|a, b| compare_names(&a.display_name, &b.display_name));
        Self { options }
    }

    /// All options in display order.
    pub fn options(&self) -> &[CountryOption] {
        &self.options
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// True when the catalog holds nothing.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options whose search text contains `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<&CountryOption> {
        let query = query.trim().to_lowercase();
        self.options.iter().filter(|o| o.matches(&query)).collect()
    }

    /// Look up an option by code.
    pub fn find(&self, code: &str) -> Option<&CountryOption> {
        self.options.iter().find(|o| o.code.eq_ignore_ascii_case(code))
    }
}

/// Locale-aware name ordering: accents and case are ignored first, the
/// raw string breaks ties.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b)).then_with(|| a.cmp(b))
}

fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fetch and normalise the catalog.
pub async fn load_catalog(client: &reqwest::Client, url: &str) -> Result<CountryCatalog> {
    tracing::info!("Loading country catalog from {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DashError::catalog(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(DashError::catalog(format!("HTTP {}", response.status())));
    }

    let raw: Vec<RawCountry> = response
        .json()
        .await
        .map_err(|e| DashError::catalog(format!("invalid payload: {}", e)))?;

    let catalog = CountryCatalog::from_raw(raw);
    tracing::info!("Loaded {} countries", catalog.len());
    Ok(catalog)
}
