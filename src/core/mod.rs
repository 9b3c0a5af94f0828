//! Core domain models, configuration and errors.
//!
//! Everything else in the crate builds on the types defined here.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, Config, ConfigBuilder, LogLevel, LoggingConfig, UiConfig};
pub use error::{DashError, Result};
pub use types::{CountryOption, CountrySnapshot, CurrentStats, HistoricalSeries, SeriesKind};
