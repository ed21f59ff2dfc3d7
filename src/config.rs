//! Minimal runtime configuration helpers.
//! Defaults suit a controller reachable on the local network.

use std::time::Duration;

pub const DEFAULT_CONTROLLER_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the irrigation controller, without the `/api` suffix.
    pub controller_url: String,
    /// Status polling cadence.
    pub poll_interval: Duration,
    /// Per-request timeout; must stay below the polling cadence so one hung
    /// request cannot overrun the tick.
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let controller_url = std::env::var("CONTROLLER_URL")
            .unwrap_or_else(|_| DEFAULT_CONTROLLER_URL.to_string());

        let poll_secs = std::env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        let timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        if poll_secs == 0 {
            return Err("POLL_INTERVAL_SECS must be at least 1".to_string());
        }
        if timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be at least 1".to_string());
        }
        if timeout_secs >= poll_secs {
            return Err(format!(
                "REQUEST_TIMEOUT_SECS ({}) must be shorter than POLL_INTERVAL_SECS ({})",
                timeout_secs, poll_secs
            ));
        }

        Ok(Config {
            controller_url,
            poll_interval: Duration::from_secs(poll_secs),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
