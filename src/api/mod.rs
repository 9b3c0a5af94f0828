//! Data sources for the dashboard.
//!
//! [`DataSource`] is the seam between the dashboard and the network:
//! [`HttpSource`] talks to the public REST endpoints, tests plug in their
//! own implementations.

pub mod catalog;
pub mod metrics;
pub mod tracker;

use crate::core::{Config, CountrySnapshot, DashError, Result};
use std::sync::Arc;

pub use catalog::{CountryCatalog, RawCountry};
pub use tracker::{RequestTag, RequestTracker};

/// Where country lists and per-country snapshots come from.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Load the full country list once.
    async fn load_catalog(&self) -> Result<CountryCatalog>;

    /// Fetch statistics and history for one country as a unit.
    async fn fetch_snapshot(&self, code: &str) -> Result<CountrySnapshot>;
}

/// [`DataSource`] backed by the configured REST endpoints.
pub struct HttpSource {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl HttpSource {
    /// Build a client honouring the configured request timeout.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .user_agent(concat!("pandash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl DataSource for HttpSource {
    async fn load_catalog(&self) -> Result<CountryCatalog> {
        catalog::load_catalog(&self.client, &self.config.api.catalog_url).await
    }

    async fn fetch_snapshot(&self, code: &str) -> Result<CountrySnapshot> {
        metrics::fetch_snapshot(&self.client, &self.config, code).await
    }
}
