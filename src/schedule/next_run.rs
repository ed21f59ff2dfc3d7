//! Picks the single next run to show for a zone.
//!
//! Daily zones choose among today's resolved slots: the earliest one still
//! ahead of the clock, or tomorrow's first slot once all have passed.
//! Weekly/Monthly zones project an occurrence date first and resolve their
//! single slot against that date.

use crate::models::controller::{Period, Zone, ZoneMode};
use crate::schedule::duration;
use crate::schedule::recurrence;
use crate::schedule::resolve::{ResolvedTimeCache, UNRESOLVED};
use crate::utils;
use chrono::{NaiveDate, NaiveTime};

/// Placeholder label while resolution is still outstanding.
pub const PENDING_LABEL: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRun {
    /// At least one slot has no cache entry yet.
    Pending,
    /// No projection exists (no schedule, bad anchor, or all slots `N/A`).
    Unavailable,
    /// Daily pick; displayed as the bare clock time even when it is
    /// tomorrow's first slot.
    Daily { time: NaiveTime, duration_seconds: u32 },
    /// Weekly/Monthly occurrence on a concrete date.
    Dated {
        date: NaiveDate,
        time: NaiveTime,
        duration_seconds: u32,
    },
}

impl NextRun {
    pub fn label(&self, today: NaiveDate) -> String {
        match self {
            NextRun::Pending => PENDING_LABEL.to_string(),
            NextRun::Unavailable => UNRESOLVED.to_string(),
            NextRun::Daily { time, .. } => time.format("%H:%M").to_string(),
            NextRun::Dated { date, time, .. } => {
                let clock = time.format("%H:%M");
                if *date == today {
                    format!("Today {}", clock)
                } else if today.succ_opt() == Some(*date) {
                    format!("Tomorrow {}", clock)
                } else {
                    format!("{} {}", date.format("%m/%d"), clock)
                }
            }
        }
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        match self {
            NextRun::Daily { duration_seconds, .. } | NextRun::Dated { duration_seconds, .. } => {
                Some(*duration_seconds)
            }
            _ => None,
        }
    }
}

/// Next run for one zone, read entirely from the resolution cache. Slot
/// durations are scaled by the settings multiplier.
pub fn next_run(
    zone: &Zone,
    cache: &ResolvedTimeCache,
    today: NaiveDate,
    now: NaiveTime,
    multiplier: f64,
) -> NextRun {
    if zone.mode != ZoneMode::Smart {
        return NextRun::Unavailable;
    }
    match zone.period {
        Some(Period::Daily) => daily_pick(zone, cache, now, multiplier),
        Some(period @ (Period::Weekly | Period::Monthly)) => {
            dated_pick(zone, cache, period, today, multiplier)
        }
        _ => NextRun::Unavailable,
    }
}

fn daily_pick(zone: &Zone, cache: &ResolvedTimeCache, now: NaiveTime, multiplier: f64) -> NextRun {
    let slots = zone.effective_slots();
    if slots.is_empty() {
        return NextRun::Unavailable;
    }

    let mut candidates: Vec<(NaiveTime, u32)> = Vec::with_capacity(slots.len());
    for slot in slots {
        let Some(value) = cache.today_entry(zone.zone_id, &slot.code) else {
            return NextRun::Pending;
        };
        if value == UNRESOLVED {
            continue;
        }
        if let Some(time) = utils::parse_hh_mm(value) {
            candidates.push((time, slot.duration_seconds));
        }
    }

    let now_minutes = utils::minutes_since_midnight(now);
    let pick = candidates
        .iter()
        .filter(|(time, _)| utils::minutes_since_midnight(*time) > now_minutes)
        .min_by_key(|(time, _)| utils::minutes_since_midnight(*time))
        .or_else(|| candidates.iter().min_by_key(|(time, _)| utils::minutes_since_midnight(*time)));

    match pick {
        Some(&(time, base_seconds)) => NextRun::Daily {
            time,
            duration_seconds: duration::apply_multiplier(base_seconds, multiplier),
        },
        None => NextRun::Unavailable,
    }
}

fn dated_pick(
    zone: &Zone,
    cache: &ResolvedTimeCache,
    period: Period,
    today: NaiveDate,
    multiplier: f64,
) -> NextRun {
    let Some(slot) = zone.effective_slots().first() else {
        return NextRun::Unavailable;
    };
    let Some(date) = recurrence::next_occurrence(period, zone.start_day.as_deref(), today) else {
        return NextRun::Unavailable;
    };

    match cache.dated_entry(date, &slot.code) {
        None => NextRun::Pending,
        Some(value) => match utils::parse_hh_mm(value) {
            Some(time) => NextRun::Dated {
                date,
                time,
                duration_seconds: duration::apply_multiplier(slot.duration_seconds, multiplier),
            },
            None => NextRun::Unavailable,
        },
    }
}
