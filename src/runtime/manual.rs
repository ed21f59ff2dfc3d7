//! Manual timer input handling and the start/cancel calls.
//!
//! Durations are typed as `HHMM`; short input is left-padded, so `"130"`
//! means 1h30m and `"9"` means 9 minutes. Multiplier scaling never applies
//! here: the typed duration is exactly what is requested.

use crate::client::{ControllerClient, ControllerError};
use crate::models::controller::{ManualTimerRequest, ZoneId};
use crate::runtime::tracker::{RunSource, RunStateTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualInputError {
    Empty,
    NotDigits,
    TooLong,
    HourOutOfRange(u32),
    MinuteOutOfRange(u32),
    ZeroDuration,
}

impl core::fmt::Display for ManualInputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ManualInputError::Empty => write!(f, "duration is empty"),
            ManualInputError::NotDigits => write!(f, "duration must contain only digits"),
            ManualInputError::TooLong => write!(f, "duration must be at most 4 digits (HHMM)"),
            ManualInputError::HourOutOfRange(h) => write!(f, "hour {} out of range (0..=23)", h),
            ManualInputError::MinuteOutOfRange(m) => {
                write!(f, "minute {} out of range (0..=59)", m)
            }
            ManualInputError::ZeroDuration => write!(f, "duration must be longer than zero"),
        }
    }
}

impl std::error::Error for ManualInputError {}

/// Parses typed `HHMM` input into whole seconds.
pub fn parse_hhmm_input(raw: &str) -> Result<u32, ManualInputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ManualInputError::Empty);
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ManualInputError::NotDigits);
    }
    if trimmed.len() > 4 {
        return Err(ManualInputError::TooLong);
    }

    let padded = format!("{:0>4}", trimmed);
    let hours: u32 = padded[0..2].parse().map_err(|_| ManualInputError::NotDigits)?;
    let minutes: u32 = padded[2..4].parse().map_err(|_| ManualInputError::NotDigits)?;
    if hours > 23 {
        return Err(ManualInputError::HourOutOfRange(hours));
    }
    if minutes > 59 {
        return Err(ManualInputError::MinuteOutOfRange(minutes));
    }
    if hours == 0 && minutes == 0 {
        return Err(ManualInputError::ZeroDuration);
    }
    Ok(hours * 3600 + minutes * 60)
}

#[derive(Debug)]
pub enum ManualStartError {
    Input(ManualInputError),
    AlreadyPending(ZoneId),
    Backend(ControllerError),
}

impl core::fmt::Display for ManualStartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ManualStartError::Input(e) => write!(f, "invalid duration: {}", e),
            ManualStartError::AlreadyPending(zone) => {
                write!(f, "zone {} already has a manual start awaiting confirmation", zone.0)
            }
            ManualStartError::Backend(e) => write!(f, "manual timer request failed: {}", e),
        }
    }
}

impl std::error::Error for ManualStartError {}

impl From<ManualInputError> for ManualStartError {
    fn from(e: ManualInputError) -> Self {
        ManualStartError::Input(e)
    }
}

impl From<ControllerError> for ManualStartError {
    fn from(e: ControllerError) -> Self {
        ManualStartError::Backend(e)
    }
}

/// Validates the typed duration, posts the start, and records it as pending
/// so the dashboard shows the run before the next poll lands. Returns the
/// requested duration in seconds.
pub fn start_timer(
    client: &ControllerClient,
    tracker: &mut RunStateTracker,
    zone: ZoneId,
    raw_input: &str,
) -> Result<u32, ManualStartError> {
    let duration_seconds = parse_hhmm_input(raw_input)?;
    if tracker.has_pending(zone) {
        return Err(ManualStartError::AlreadyPending(zone));
    }
    client.start_manual_timer(&ManualTimerRequest { zone_id: zone, duration_seconds })?;
    tracker.start_pending(zone, duration_seconds);
    Ok(duration_seconds)
}

/// Cancels whatever run the zone currently has. Local state is left alone;
/// the next poll reports the stop.
pub fn cancel_timer(client: &ControllerClient, zone: ZoneId) -> Result<(), ControllerError> {
    client.cancel_manual_timer(zone)
}

/// Confirmation copy shown before a cancel. Stopping a scheduled run needs
/// stronger wording than stopping a timer the user started themselves.
pub fn confirmation_prompt(source: RunSource) -> &'static str {
    match source {
        RunSource::Manual => "Stop the manual timer for this zone?",
        RunSource::Scheduled => {
            "Stop the scheduled run for this zone? It will not water again until its next scheduled time."
        }
    }
}
