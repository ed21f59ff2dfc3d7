//! Blocking HTTP client for the irrigation controller backend.
//!
//! - One method per backend endpoint, returning typed models from
//!   `crate::models::controller`.
//! - Non-2xx responses are read fully and surfaced as `ControllerError::Http`
//!   so callers see the backend's own message.
//! - The agent applies one global timeout to every call; the poll loop
//!   relies on it staying below the poll interval.

use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::models::controller::{
    ControllerSettings, GpioConfig, ManualTimerRequest, ResolveTimesRequest, StatusSnapshot, Zone, ZoneId,
};

#[derive(Debug)]
pub enum ControllerError {
    Transport(String),
    Http { status: u16, message: String },
    Decode { path: String, message: String },
}

impl core::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControllerError::Transport(s) => write!(f, "transport error: {}", s),
            ControllerError::Http { status, message } => write!(f, "http {}: {}", status, message),
            ControllerError::Decode { path, message } => write!(f, "decode error at {}: {}", path, message),
        }
    }
}

impl std::error::Error for ControllerError {}

pub struct ControllerClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ControllerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            // keep 4xx/5xx as plain responses; status handling happens here
            .http_status_as_error(false)
            .build();
        ControllerClient {
            agent: config.new_agent(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn read_body(res: &mut http::Response<ureq::Body>) -> Result<String, ControllerError> {
        let status: StatusCode = res.status();
        let body = res
            .body_mut()
            .read_to_string()
            .map_err(|e| ControllerError::Transport(e.to_string()))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ControllerError::Http {
                status: status.as_u16(),
                message: body,
            })
        }
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ControllerError> {
        let mut deserializer = serde_json::Deserializer::from_str(body);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ControllerError::Decode {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ControllerError> {
        let mut res = self
            .agent
            .get(&self.url(path))
            .header("Accept", "application/json")
            .call()
            .map_err(|e| ControllerError::Transport(e.to_string()))?;
        let body = Self::read_body(&mut res)?;
        Self::decode(&body)
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String, ControllerError> {
        let mut res = self
            .agent
            .post(&self.url(path))
            .header("Accept", "application/json")
            .send_json(body)
            .map_err(|e| ControllerError::Transport(e.to_string()))?;
        Self::read_body(&mut res)
    }

    pub fn schedule(&self) -> Result<Vec<Zone>, ControllerError> {
        self.get_json("/schedule")
    }

    /// Batched symbolic-time resolution; one entry per requested code, in
    /// request order, `None` where the backend had no answer.
    pub fn resolve_times(&self, request: &ResolveTimesRequest) -> Result<Vec<Option<String>>, ControllerError> {
        let body = self.post_json("/resolve_times", request)?;
        Self::decode(&body)
    }

    pub fn zone_status(&self) -> Result<StatusSnapshot, ControllerError> {
        self.get_json("/zones/status")
    }

    pub fn start_manual_timer(&self, request: &ManualTimerRequest) -> Result<(), ControllerError> {
        self.post_json(&format!("/manual-timer/{}", request.zone_id.0), request)
            .map(|_| ())
    }

    pub fn cancel_manual_timer(&self, zone: ZoneId) -> Result<(), ControllerError> {
        let mut res = self
            .agent
            .delete(&self.url(&format!("/manual-timer/{}", zone.0)))
            .call()
            .map_err(|e| ControllerError::Transport(e.to_string()))?;
        Self::read_body(&mut res).map(|_| ())
    }

    pub fn settings(&self) -> Result<ControllerSettings, ControllerError> {
        self.get_json("/settings")
    }

    pub fn gpio_config(&self) -> Result<GpioConfig, ControllerError> {
        self.get_json("/gpio")
    }
}
