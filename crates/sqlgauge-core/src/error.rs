//! Error types for sqlgauge

use thiserror::Error;

/// Error raised while collecting metrics from one (server, query) pair
#[derive(Error, Debug)]
pub enum GaugeError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Task error: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GaugeError {
    /// Short label for structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            GaugeError::Connection(_) => "connection",
            GaugeError::Query(_) => "query",
            GaugeError::Metadata(_) => "metadata",
            GaugeError::Scan(_) => "scan",
            GaugeError::Sink(_) => "sink",
            GaugeError::Configuration(_) => "configuration",
            GaugeError::Task(_) => "task",
            GaugeError::Io(_) => "io",
        }
    }
}

/// Result type alias for sqlgauge operations
pub type Result<T> = std::result::Result<T, GaugeError>;
