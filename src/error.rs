/// Error types for loading order data and reading configuration.
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading an order-line table.
///
/// Any of these aborts the whole load; aggregators never see a partial table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("Line {line}: payment_value {value} is not a finite, non-negative amount")]
    InvalidPayment { line: u64, value: f64 },
}

/// Errors raised while reading server configuration from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
