//! Error types for the dashboard monitor

use thiserror::Error;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    /// Transport failure or undecodable body
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("dashboard API returned status {0}")]
    Status(u16),

    /// Invalid environment configuration
    #[error("configuration error: {0}")]
    Config(String),
}
