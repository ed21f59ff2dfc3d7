//! Batched start-code resolution and the keyed result cache.
//!
//! Clock codes are answered locally. Everything else goes to the backend's
//! resolver in one batch per zone, so a zone with many cycles still costs a
//! single call. Failures write the `N/A` sentinel per key rather than
//! leaving the key hanging; any later write for the same key replaces it.

use crate::client::ControllerClient;
use crate::models::controller::{ResolveTimesRequest, Zone, ZoneId};
use crate::schedule::timecode::{self, TimeCode};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Sentinel for a code the resolver could not answer.
pub const UNRESOLVED: &str = "N/A";

/// Resolved "HH:MM" strings (or `N/A`), keyed per `(zone, code)` for today
/// and per `(date, code)` for the dated lookups Weekly/Monthly projection
/// needs. Writes are replace-on-write: whichever resolution completes last
/// for a key is authoritative.
#[derive(Debug, Default)]
pub struct ResolvedTimeCache {
    today: BTreeMap<(ZoneId, String), String>,
    dated: BTreeMap<(NaiveDate, String), String>,
    resolved_for: Option<NaiveDate>,
}

impl ResolvedTimeCache {
    pub fn new() -> Self {
        ResolvedTimeCache::default()
    }

    pub fn today_entry(&self, zone: ZoneId, code: &str) -> Option<&str> {
        self.today.get(&(zone, code.to_string())).map(String::as_str)
    }

    pub fn dated_entry(&self, date: NaiveDate, code: &str) -> Option<&str> {
        self.dated.get(&(date, code.to_string())).map(String::as_str)
    }

    pub fn insert_today(&mut self, zone: ZoneId, code: &str, value: String) {
        self.today.insert((zone, code.to_string()), value);
    }

    pub fn insert_dated(&mut self, date: NaiveDate, code: &str, value: String) {
        self.dated.insert((date, code.to_string()), value);
    }

    /// Advance the cache to `today`. On a date change all today-keyed entries
    /// are dropped for re-resolution, stale dated entries are pruned, and
    /// dated `N/A` entries are evicted so they get one retry per day.
    /// Returns whether a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.resolved_for == Some(today) {
            return false;
        }
        let first_fill = self.resolved_for.is_none();
        self.today.clear();
        self.dated.retain(|(date, _), value| *date >= today && value.as_str() != UNRESOLVED);
        self.resolved_for = Some(today);
        !first_fill
    }
}

/// Resolve `codes` for `date`, one output per input in order. Clock codes
/// never touch the network; the rest are resolved in a single batched call,
/// or pinned to `N/A` when no location is known or the call fails.
fn resolve_batch(
    client: &ControllerClient,
    date: NaiveDate,
    location: Option<(f64, f64)>,
    codes: &[&str],
) -> Vec<String> {
    let mut out: Vec<Option<String>> = codes
        .iter()
        .map(|code| match timecode::parse_code(code) {
            Some(TimeCode::Clock(t)) => Some(t.format("%H:%M").to_string()),
            _ => None,
        })
        .collect();

    let pending: Vec<String> = codes
        .iter()
        .zip(&out)
        .filter(|(_, resolved)| resolved.is_none())
        .map(|(code, _)| (*code).to_string())
        .collect();

    if !pending.is_empty() {
        let fetched = match location {
            Some((lat, lon)) => {
                let request = ResolveTimesRequest {
                    codes: pending.clone(),
                    date,
                    lat,
                    lon,
                };
                match client.resolve_times(&request) {
                    Ok(values) => values,
                    Err(e) => {
                        warn!("resolve_times failed, {} code(s) marked {}: {}", pending.len(), UNRESOLVED, e);
                        Vec::new()
                    }
                }
            }
            None => {
                debug!("no location configured, {} solar code(s) marked {}", pending.len(), UNRESOLVED);
                Vec::new()
            }
        };

        let mut fetched = fetched.into_iter();
        for slot in out.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(match fetched.next().flatten() {
                Some(value) if !value.trim().is_empty() => value,
                _ => UNRESOLVED.to_string(),
            });
        }
    }

    out.into_iter().map(|slot| slot.unwrap_or_else(|| UNRESOLVED.to_string())).collect()
}

/// Resolve a zone's effective slots for today and cache them under
/// `(zone, code)`.
pub fn resolve_today_for_zone(
    client: &ControllerClient,
    cache: &mut ResolvedTimeCache,
    zone: &Zone,
    today: NaiveDate,
    location: Option<(f64, f64)>,
) {
    let codes: Vec<&str> = zone.effective_slots().iter().map(|slot| slot.code.as_str()).collect();
    if codes.is_empty() {
        return;
    }
    let values = resolve_batch(client, today, location, &codes);
    for (code, value) in codes.iter().zip(values) {
        cache.insert_today(zone.zone_id, code, value);
    }
    debug!("resolved {} code(s) for zone {} (today)", codes.len(), zone.zone_id.0);
}

/// Resolve codes against a specific occurrence date and cache them under
/// `(date, code)`.
pub fn resolve_dated(
    client: &ControllerClient,
    cache: &mut ResolvedTimeCache,
    date: NaiveDate,
    codes: &[&str],
    location: Option<(f64, f64)>,
) {
    if codes.is_empty() {
        return;
    }
    let values = resolve_batch(client, date, location, codes);
    for (code, value) in codes.iter().zip(values) {
        cache.insert_dated(date, code, value);
    }
}
