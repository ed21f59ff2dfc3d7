//! Wire models for the irrigation controller backend.
//!
//! Scope: request/response payload types plus the schedule shape rules.
//! The controller's JSON mixes snake_case and camelCase, so renames are per
//! field rather than per container.

use crate::schedule::duration;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =====================
// Identity
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u32);

// =====================
// Schedule
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneMode {
    Disabled,
    Manual,
    Smart,
}

/// Recurrence period. `Specific` and `Interval` appear in controller exports
/// but carry no projection here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Specific,
    Interval,
}

impl Period {
    /// Upper bound on `cycles` for periods with a defined shape rule.
    pub fn max_cycles(self) -> Option<u32> {
        match self {
            Period::Daily => Some(10),
            Period::Weekly => Some(6),
            Period::Monthly => Some(3),
            Period::Specific | Period::Interval => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// 4-digit clock code ("0600") or solar token ("SUNRISE+30").
    pub code: String,
    #[serde(rename = "durationSeconds", deserialize_with = "duration_seconds_from_wire")]
    pub duration_seconds: u32,
}

fn duration_seconds_from_wire<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Seconds(u32),
        // older firmware exports the fixed-width digit form
        Encoded(String),
    }

    match Wire::deserialize(deserializer)? {
        Wire::Seconds(n) => Ok(n),
        Wire::Encoded(s) => Ok(duration::decode_hhmmss(&s)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub zone_id: ZoneId,
    pub mode: ZoneMode,
    pub period: Option<Period>,
    pub cycles: Option<u32>,
    #[serde(default)]
    pub times: Vec<TimeSlot>,
    /// Anchor date for Weekly (day-of-week) and Monthly (day-of-month)
    /// projection. Kept as the raw export string and parsed where used, so a
    /// bad value degrades a single zone instead of the whole schedule fetch.
    #[serde(rename = "startDay")]
    pub start_day: Option<String>,
    pub comment: Option<String>,
}

impl Zone {
    /// Slots that participate in projection, after the one permitted repair:
    /// a Daily zone listing more slots than `cycles` is trimmed to the first
    /// `cycles` entries.
    pub fn effective_slots(&self) -> &[TimeSlot] {
        let limit = match self.period {
            Some(Period::Daily) => self.cycles.unwrap_or(0) as usize,
            Some(Period::Weekly) | Some(Period::Monthly) => 1,
            _ => 0,
        };
        &self.times[..limit.min(self.times.len())]
    }

    /// Schedule shape rules: cycle bounds per period, slot count equal to
    /// `cycles` for Daily and exactly one slot for Weekly/Monthly. Fewer
    /// Daily slots than `cycles` is not repairable and fails here; extra
    /// slots pass and are dropped by `effective_slots`.
    pub fn validate_shape(&self) -> Result<(), ScheduleShapeError> {
        let period = self.period.ok_or(ScheduleShapeError::MissingPeriod(self.zone_id))?;
        let Some(max) = period.max_cycles() else {
            return Ok(());
        };
        let cycles = self.cycles.ok_or(ScheduleShapeError::MissingCycles(self.zone_id))?;
        if cycles == 0 || cycles > max {
            return Err(ScheduleShapeError::CyclesOutOfRange {
                zone: self.zone_id,
                cycles,
                max,
            });
        }

        let expected = match period {
            Period::Daily => cycles as usize,
            _ => 1,
        };
        let actual = self.times.len();
        let acceptable = match period {
            Period::Daily => actual >= expected,
            _ => actual == expected,
        };
        if !acceptable {
            return Err(ScheduleShapeError::SlotCountMismatch {
                zone: self.zone_id,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleShapeError {
    MissingPeriod(ZoneId),
    MissingCycles(ZoneId),
    CyclesOutOfRange { zone: ZoneId, cycles: u32, max: u32 },
    SlotCountMismatch { zone: ZoneId, expected: usize, actual: usize },
}

impl core::fmt::Display for ScheduleShapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ScheduleShapeError::MissingPeriod(z) => write!(f, "zone {} has no period", z.0),
            ScheduleShapeError::MissingCycles(z) => write!(f, "zone {} has no cycle count", z.0),
            ScheduleShapeError::CyclesOutOfRange { zone, cycles, max } => {
                write!(f, "zone {} cycle count {} out of range (1..={})", zone.0, cycles, max)
            }
            ScheduleShapeError::SlotCountMismatch { zone, expected, actual } => {
                write!(f, "zone {} has {} time slot(s), expected {}", zone.0, actual, expected)
            }
        }
    }
}

impl std::error::Error for ScheduleShapeError {}

// =====================
// Runtime status
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Manual,
    Scheduled,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneActivity {
    pub active: bool,
    #[serde(default)]
    pub remaining: u32,
    /// Absent on older controller builds; the tracker classifies from its own
    /// pending-manual knowledge in that case.
    #[serde(rename = "type")]
    pub kind: Option<RunKind>,
}

/// `zones/status` payload, keyed by zone id string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot(pub BTreeMap<String, ZoneActivity>);

impl StatusSnapshot {
    pub fn get(&self, zone: ZoneId) -> Option<&ZoneActivity> {
        self.0.get(zone.0.to_string().as_str())
    }
}

// =====================
// Settings and GPIO
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSettings {
    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    /// Legacy location form, ordered `[lon, lat]`.
    pub coords: Option<[f64; 2]>,
    #[serde(default = "default_timer_multiplier")]
    pub timer_multiplier: f64,
}

fn default_timer_multiplier() -> f64 {
    1.0
}

impl Default for ControllerSettings {
    fn default() -> Self {
        ControllerSettings {
            gps_lat: None,
            gps_lon: None,
            coords: None,
            timer_multiplier: default_timer_multiplier(),
        }
    }
}

impl ControllerSettings {
    /// `(lat, lon)` with the modern fields preferred; note the legacy
    /// `coords` array is ordered the other way round.
    pub fn location(&self) -> Option<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (self.gps_lat, self.gps_lon) {
            return Some((lat, lon));
        }
        self.coords.map(|[lon, lat]| (lat, lon))
    }

    pub fn uses_legacy_coords(&self) -> bool {
        self.coords.is_some() && (self.gps_lat.is_none() || self.gps_lon.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GpioConfig {
    /// Zone id string -> output pin number.
    #[serde(default)]
    pub pins: BTreeMap<String, u32>,
    pub pump_zone: Option<ZoneId>,
}

// =====================
// Request bodies
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveTimesRequest {
    pub codes: Vec<String>,
    pub date: NaiveDate,
    pub lat: f64,
    pub lon: f64,
}

/// Body for `POST manual-timer/{zone_id}`; the zone travels in the path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ManualTimerRequest {
    #[serde(skip)]
    pub zone_id: ZoneId,
    #[serde(rename = "duration")]
    pub duration_seconds: u32,
}
