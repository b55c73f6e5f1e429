//! Error types for the sorting simulation
//!
//! ## Table of Contents
//! - **SimError**: Configuration and config-file failures
//! - **Result**: Type alias for `Result<T, SimError>`

use thiserror::Error;

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Main error type for simulation setup
#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid simulation parameters
    #[error("configuration error: {0}")]
    Config(String),

    /// Config file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for `SimulationConfig`
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SimError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
