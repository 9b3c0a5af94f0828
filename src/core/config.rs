//! Configuration management for the dashboard.
//!
//! Sources, lowest to highest precedence:
//! - Built-in defaults
//! - YAML file
//! - Environment variables and CLI arguments (see [`crate::cli`])

use crate::core::{DashError, Result};
use crate::series::range::earliest_allowed;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream endpoints and request limits
    pub api: ApiConfig,
    /// Dashboard behaviour
    pub ui: UiConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Upstream REST endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Full URL of the country list
    pub catalog_url: String,
    /// Base URL for current statistics; the country code is appended
    pub stats_base_url: String,
    /// Base URL for the historical series; the country code is appended
    pub historical_base_url: String,
    /// Days of history to request
    pub lookback_days: u32,
    /// Upper bound on each request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Input poll / redraw interval
    #[serde(with = "humantime_serde")]
    pub tick_rate: Duration,
    /// Country selected on startup
    pub default_country: String,
    /// Start of the default date range; the end is always today
    pub default_start: NaiveDate,
    /// Capture mouse events (click outside the date picker closes it)
    pub mouse: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Log file path; the interactive dashboard logs nowhere without one
    pub file: Option<PathBuf>,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
            debug: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            catalog_url: "https://restcountries.com/v3.1/all?fields=name,cca2,flags".to_string(),
            stats_base_url: "https://disease.sh/v3/covid-19/countries".to_string(),
            historical_base_url: "https://disease.sh/v3/covid-19/historical".to_string(),
            lookback_days: 1500,
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            tick_rate: Duration::from_millis(100),
            default_country: "us".to_string(),
            default_start: NaiveDate::from_ymd_opt(2020, 10, 1).expect("Valid default start date"),
            mouse: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            file: None,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("catalog_url", &self.api.catalog_url),
            ("stats_base_url", &self.api.stats_base_url),
            ("historical_base_url", &self.api.historical_base_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| DashError::config(format!("Invalid {} '{}': {}", name, url, e)))?;
        }

        if self.api.lookback_days == 0 {
            return Err(DashError::config("lookback_days must be greater than 0"));
        }

        if self.api.request_timeout.is_zero() {
            return Err(DashError::config("request_timeout must be greater than 0"));
        }

        if self.ui.tick_rate.is_zero() {
            return Err(DashError::config("tick_rate must be greater than 0"));
        }

        let code = &self.ui.default_country;
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DashError::config(format!(
                "default_country must be a two-letter ISO code, got '{}'",
                code
            )));
        }

        if self.ui.default_start < earliest_allowed() {
            return Err(DashError::config(format!(
                "default_start must not be before {}, got {}",
                earliest_allowed(),
                self.ui.default_start
            )));
        }

        Ok(())
    }

    /// Statistics URL for a country code
    pub fn stats_url(&self, code: &str) -> String {
        format!("{}/{}", self.api.stats_base_url.trim_end_matches('/'), code)
    }

    /// Historical-series URL for a country code
    pub fn historical_url(&self, code: &str) -> String {
        format!(
            "{}/{}?lastdays={}",
            self.api.historical_base_url.trim_end_matches('/'),
            code,
            self.api.lookback_days
        )
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| DashError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set the country list URL
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.catalog_url = url.into();
        self
    }

    /// Set the current-statistics base URL
    pub fn stats_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.stats_base_url = url.into();
        self
    }

    /// Set the historical-series base URL
    pub fn historical_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.historical_base_url = url.into();
        self
    }

    /// Point all three endpoints at one server (used with mock servers)
    pub fn base_url(self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.catalog_url(format!("{}/v3.1/all", base))
            .stats_base_url(format!("{}/v3/covid-19/countries", base))
            .historical_base_url(format!("{}/v3/covid-19/historical", base))
    }

    /// Set the lookback window in days
    pub fn lookback_days(mut self, days: u32) -> Self {
        self.config.api.lookback_days = days;
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.api.request_timeout = timeout;
        self
    }

    /// Set the country selected on startup
    pub fn default_country(mut self, code: &str) -> Self {
        self.config.ui.default_country = code.to_ascii_lowercase();
        self
    }

    /// Set the default range start
    pub fn default_start(mut self, start: NaiveDate) -> Self {
        self.config.ui.default_start = start;
        self
    }

    /// Set the log file
    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.config.logging.file = Some(path);
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
