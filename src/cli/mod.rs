//! Command-line interface for pandash.
//!
//! Just run `pandash` to open the dashboard on the default country.

use crate::application::Application;
use crate::core::config::ConfigBuilder;
use crate::core::{Config, DashError, Result};
use crate::series::range::parse_iso_date;
use crate::series::DateRange;
use crate::tui;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Pandemic statistics dashboard for the terminal
#[derive(Parser, Debug, Default)]
#[command(name = "pandash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Two-letter country code shown on startup
    #[arg(long, env = "PANDASH_COUNTRY")]
    pub country: Option<String>,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long, env = "PANDASH_START", value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD, default: today)
    #[arg(long, env = "PANDASH_END", value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,

    /// Configuration file path (default: ~/.config/pandash/config.yaml)
    #[arg(short, long, env = "PANDASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Days of history to request
    #[arg(long, env = "PANDASH_LOOKBACK_DAYS")]
    pub lookback_days: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, env = "PANDASH_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Append logs to this file
    #[arg(long, env = "PANDASH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "PANDASH_DEBUG")]
    pub debug: bool,

    /// Print a one-off summary instead of opening the dashboard
    #[arg(long)]
    pub report: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

fn parse_date_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_iso_date(input).map_err(|e| e.to_string())
}

/// Default config file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pandash").join("config.yaml"))
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments and environment variables (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(config_path) = config_path {
            match tokio::fs::read_to_string(&config_path).await {
                Ok(content) => {
                    builder = builder.from_yaml(&content)?;
                    tracing::info!("Loaded configuration from: {:?}", config_path);
                },
                Err(e) if self.config.is_some() => {
                    // User explicitly specified a config file that doesn't exist
                    return Err(DashError::config(format!(
                        "Failed to read config file {:?}: {}",
                        config_path, e
                    )));
                },
                Err(_) => {
                    tracing::debug!("No config file found at {:?}, using defaults", config_path);
                },
            }
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(country) = &self.country {
            builder = builder.default_country(country);
        }
        if let Some(days) = self.lookback_days {
            builder = builder.lookback_days(days);
        }
        if let Some(secs) = self.timeout {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(path) = &self.log_file {
            builder = builder.log_file(path.clone());
        }

        builder.debug(self.debug).build()
    }

    /// Range requested on the command line, if any.
    pub fn initial_range(&self, config: &Config, today: NaiveDate) -> Result<Option<DateRange>> {
        if self.start.is_none() && self.end.is_none() {
            return Ok(None);
        }
        let start = self.start.unwrap_or(config.ui.default_start);
        let end = self.end.unwrap_or(today);
        DateRange::new(start, end, today).map(Some)
    }

    /// Level filter text, before `RUST_LOG` is consulted.
    pub fn log_level(&self, config: &Config) -> String {
        if let Ok(level) = std::env::var("PANDASH_LOG_LEVEL") {
            return level;
        }
        if self.debug || config.debug {
            return "debug".to_string();
        }
        config.logging.level.as_str().to_string()
    }

    /// Initialize logging based on configuration.
    ///
    /// The dashboard owns the terminal, so it logs to `logging.file` or
    /// nowhere; report and check modes log to stderr.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_level(config)));

        let (writer, ansi) = if let Some(path) = &config.logging.file {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(std::sync::Mutex::new(file)), false)
        } else if self.report || self.check_config {
            (BoxMakeWriter::new(std::io::stderr), true)
        } else {
            (BoxMakeWriter::new(std::io::sink), false)
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(self.debug)
            .compact();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| DashError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the pandash application.
pub async fn execute(cli: Cli) -> Result<()> {
    // Load and validate configuration
    let config = cli.load_config().await?;
    cli.init_logging(&config)?;

    if cli.check_config {
        config.validate()?;
        println!("Configuration is valid!");
        println!("  Catalog: {}", config.api.catalog_url);
        println!("  Statistics: {}", config.api.stats_base_url);
        println!("  History: {} (last {} days)", config.api.historical_base_url, config.api.lookback_days);
        println!("  Timeout: {:?}", config.api.request_timeout);
        println!("  Default country: {}", config.ui.default_country);
        println!("  Default start: {}", config.ui.default_start);
        return Ok(());
    }

    let today = tui::today();
    let range = cli.initial_range(&config, today)?;

    if cli.report {
        let range = range.unwrap_or_else(|| DateRange::default_for(config.ui.default_start, today));
        let app = Application::new(config)?;
        let text = app.report(range).await?;
        print!("{}", text);
        return Ok(());
    }

    tracing::info!("Starting pandash with terminal UI...");
    Application::new(config)?.run(range).await
}
