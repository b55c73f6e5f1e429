// =============================================================================
// CSR Backend - Configuration
// =============================================================================

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1:5000")
    pub bind_address: String,

    /// Database URL (SQLite path or `sqlite::memory:`)
    pub database_url: String,

    /// Insert the demonstration readings into empty tables on startup
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".into(),
            database_url: "sqlite:data/csr.db".into(),
            seed_demo_data: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            seed_demo_data: match env::var("SEED_DEMO_DATA") {
                Ok(raw) => parse_flag("SEED_DEMO_DATA", &raw)?,
                Err(_) => defaults.seed_demo_data,
            },
        })
    }

    /// Filesystem path of the SQLite database, if the URL points at a file.
    pub fn sqlite_file(&self) -> Option<&str> {
        let path = self.database_url.strip_prefix("sqlite:")?;
        let path = path.trim_start_matches("//");
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            None
        } else {
            Some(path)
        }
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
