//! Monitor configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Full URL of the dashboard endpoint
    pub api_url: String,

    /// Time between two fetches
    pub poll_interval: Duration,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000/api/dashboard".into(),
            poll_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_url: env::var("DASHBOARD_API_URL").unwrap_or(defaults.api_url),
            poll_interval: seconds_var("POLL_INTERVAL_SECS")?.unwrap_or(defaults.poll_interval),
            request_timeout: seconds_var("REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
        })
    }
}

fn seconds_var(name: &str) -> Result<Option<Duration>> {
    match env::var(name) {
        Ok(raw) => parse_seconds(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_seconds(name: &str, raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(MonitorError::Config(format!(
            "{name} must be a positive number of seconds, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("X", " 30 ").unwrap(), Duration::from_secs(30));
        assert!(parse_seconds("X", "0").is_err());
        assert!(parse_seconds("X", "soon").is_err());
    }

    #[test]
    fn test_default_polls_every_thirty_seconds() {
        assert_eq!(MonitorConfig::default().poll_interval, Duration::from_secs(30));
    }
}
