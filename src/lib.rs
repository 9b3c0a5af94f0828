//! Pandash - pandemic statistics dashboard for the terminal.
//!
//! Pandash loads a country list, fetches current and historical COVID-19
//! statistics for the selected country and renders summary cards, a
//! line chart over a user-chosen date range and a population doughnut.
//!
//! # Architecture
//!
//! - `api`: REST data sources and request tagging
//! - `series`: date ranges and chart-ready series
//! - `stats`: percentages, recovery estimate, compact numbers
//! - `core`: domain types, configuration and errors
//! - `tui`: terminal dashboard
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use pandash_lib::core::Config;
//! use pandash_lib::Application;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let app = Application::new(config)?;
//!     app.run(None).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod application;
pub mod cli;
pub mod core;
pub mod series;
pub mod stats;
pub mod tui;

// Re-export core types for convenience
pub use crate::application::Application;
pub use crate::core::{Config, DashError, Result};
