use chrono::NaiveDate;
use thiserror::Error;

/// Message shown when the country list cannot be loaded.
pub const CATALOG_LOAD_MESSAGE: &str = "Failed to load countries";

/// Message shown when the statistics/historical fetch fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data. Please try again later.";

/// Message shown when the chosen window holds no historical data.
pub const NO_DATA_MESSAGE: &str =
    "No data available for the selected date range. Please select a different range.";

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Country catalog error: {0}")]
    CatalogLoad(String),

    #[error("Metrics fetch error for '{country}': {reason}")]
    Fetch { country: String, reason: String },

    #[error("No historical data between {start} and {end}")]
    NoDataForRange { start: NaiveDate, end: NaiveDate },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal UI error: {0}")]
    Terminal(String),

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("Timeout error: request took longer than {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashError>;

impl DashError {
    /// Creates a new catalog-load error
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        Self::CatalogLoad(msg.into())
    }

    /// Creates a new fetch error for a country
    pub fn fetch<C: Into<String>, S: Into<String>>(country: C, reason: S) -> Self {
        Self::Fetch {
            country: country.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new terminal error
    pub fn terminal<S: Into<String>>(msg: S) -> Self {
        Self::Terminal(msg.into())
    }

    /// Text to put in front of the user. Network details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::CatalogLoad(_) => CATALOG_LOAD_MESSAGE.to_string(),
            Self::Fetch { .. } | Self::Http(_) | Self::Timeout { .. } | Self::Serialization(_) => {
                FETCH_FAILED_MESSAGE.to_string()
            },
            Self::NoDataForRange { .. } => NO_DATA_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Returns true if the user can recover from this error inside the dashboard
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. }
                | Self::NoDataForRange { .. }
                | Self::Http(_)
                | Self::Timeout { .. }
                | Self::Serialization(_)
        )
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::CatalogLoad(_) => "catalog",
            Self::Fetch { .. } | Self::Http(_) => "network",
            Self::NoDataForRange { .. } => "empty_range",
            Self::Config(_) => "config",
            Self::Terminal(_) => "ui",
            Self::InvalidDate { .. } => "validation",
            Self::Timeout { .. } => "timeout",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DashError::config("bad url");
        assert_eq!(err.to_string(), "Configuration error: bad url");
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(DashError::catalog("503").user_message(), "Failed to load countries");
        assert_eq!(
            DashError::fetch("jp", "connection reset").user_message(),
            "Failed to fetch data. Please try again later."
        );
        assert_eq!(DashError::Timeout { timeout_ms: 100 }.user_message(), FETCH_FAILED_MESSAGE);

        let empty = DashError::NoDataForRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        };
        assert_eq!(empty.user_message(), NO_DATA_MESSAGE);
        assert_eq!(empty.category(), "empty_range");
    }

    #[test]
    fn test_error_recoverability() {
        assert!(DashError::fetch("us", "timeout").is_recoverable());
        assert!(!DashError::catalog("down").is_recoverable());
        assert!(!DashError::config("invalid config").is_recoverable());
    }
}
