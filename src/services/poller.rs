use crate::client::ControllerClient;
use crate::models::controller::{ControllerSettings, GpioConfig, Period, Zone, ZoneId, ZoneMode};
use crate::runtime::pump;
use crate::runtime::tracker::{RunSource, RunStateTracker, ZoneRuntimeState};
use crate::schedule::next_run::{self, NextRun};
use crate::schedule::recurrence;
use crate::schedule::resolve::{self, ResolvedTimeCache};
use chrono::{Local, NaiveDate, NaiveTime};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Everything the dashboard renders for one zone after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneView {
    pub zone_id: ZoneId,
    pub state: ZoneRuntimeState,
    pub next_run: NextRun,
    pub next_run_label: String,
    pub is_pump_zone: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub zones: Vec<ZoneView>,
    pub pump_on: bool,
}

/// Mutable state carried across ticks.
pub struct PollerContext {
    pub zones: Vec<Zone>,
    pub settings: ControllerSettings,
    pub gpio: Option<GpioConfig>,
    pub cache: ResolvedTimeCache,
    pub tracker: RunStateTracker,
    pump_running: bool,
}

impl PollerContext {
    pub fn new(zones: Vec<Zone>, settings: ControllerSettings, gpio: Option<GpioConfig>) -> Self {
        let tracker = RunStateTracker::new(zones.iter().map(|z| z.zone_id));
        PollerContext {
            zones,
            settings,
            gpio,
            cache: ResolvedTimeCache::new(),
            tracker,
            pump_running: false,
        }
    }
}

pub struct ShutdownHandle {
    tx: mpsc::Sender<()>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        let _ = self.tx.send(());
    }
}

pub fn shutdown_channel() -> (ShutdownHandle, mpsc::Receiver<()>) {
    let (tx, rx) = mpsc::channel();
    (ShutdownHandle { tx }, rx)
}

/// One poll cycle against the wall clock.
pub fn tick(client: &ControllerClient, ctx: &mut PollerContext) -> DashboardSnapshot {
    let now = Local::now();
    tick_at(client, ctx, now.date_naive(), now.time())
}

/// One poll cycle at an explicit date and time: reconcile run states, keep
/// the resolution cache filled, and assemble the dashboard snapshot.
pub fn tick_at(
    client: &ControllerClient,
    ctx: &mut PollerContext,
    today: NaiveDate,
    now: NaiveTime,
) -> DashboardSnapshot {
    let before: BTreeMap<ZoneId, ZoneRuntimeState> = ctx.tracker.states().clone();

    match client.zone_status() {
        Ok(snapshot) => ctx.tracker.apply_status(&snapshot),
        Err(e) => {
            warn!("zone status poll failed: {}", e);
            ctx.tracker.apply_poll_failure();
        }
    }

    if ctx.cache.roll_over(today) {
        debug!("resolution cache rolled over to {}", today);
    }
    resolve_missing(client, ctx, today);

    log_transitions(&before, ctx.tracker.states());
    let pump_on = pump::pump_on(ctx.tracker.states());
    if pump_on != ctx.pump_running {
        info!("Pump switched {}", if pump_on { "on" } else { "off" });
        ctx.pump_running = pump_on;
    }

    let zones = ctx
        .zones
        .iter()
        .map(|zone| {
            let run = next_run::next_run(
                zone,
                &ctx.cache,
                today,
                now,
                ctx.settings.timer_multiplier,
            );
            ZoneView {
                zone_id: zone.zone_id,
                state: ctx.tracker.state(zone.zone_id),
                next_run: run,
                next_run_label: run.label(today),
                is_pump_zone: pump::is_pump_zone(ctx.gpio.as_ref(), zone.zone_id),
                comment: zone.comment.clone(),
            }
        })
        .collect();

    DashboardSnapshot { zones, pump_on }
}

/// Fills cache gaps for smart zones. Entries already present, `N/A`
/// included, are left alone; a failed batch becomes retryable only through
/// the daily rollover or a fresh occurrence date.
fn resolve_missing(client: &ControllerClient, ctx: &mut PollerContext, today: NaiveDate) {
    let location = ctx.settings.location();
    for zone in &ctx.zones {
        if zone.mode != ZoneMode::Smart {
            continue;
        }
        match zone.period {
            Some(Period::Daily) => {
                let missing = zone
                    .effective_slots()
                    .iter()
                    .any(|slot| ctx.cache.today_entry(zone.zone_id, &slot.code).is_none());
                if missing {
                    resolve::resolve_today_for_zone(client, &mut ctx.cache, zone, today, location);
                }
            }
            Some(period @ (Period::Weekly | Period::Monthly)) => {
                let Some(slot) = zone.effective_slots().first() else {
                    continue;
                };
                let Some(date) =
                    recurrence::next_occurrence(period, zone.start_day.as_deref(), today)
                else {
                    continue;
                };
                if ctx.cache.dated_entry(date, &slot.code).is_none() {
                    resolve::resolve_dated(
                        client,
                        &mut ctx.cache,
                        date,
                        &[slot.code.as_str()],
                        location,
                    );
                }
            }
            _ => {}
        }
    }
}

fn log_transitions(
    before: &BTreeMap<ZoneId, ZoneRuntimeState>,
    after: &BTreeMap<ZoneId, ZoneRuntimeState>,
) {
    for (zone, state) in after {
        let was = before.get(zone).copied().unwrap_or_default();
        if state.active && !was.active {
            let source = state.source.unwrap_or(RunSource::Scheduled);
            info!(
                "Zone {} started ({}, {} remaining)",
                zone.0,
                source.as_str(),
                crate::schedule::duration::encode_hms(state.remaining_seconds)
            );
        } else if was.active && !state.active {
            info!("Zone {} stopped", zone.0);
        }
    }
}

/// Polls until the stop channel fires or its sender is dropped. The first
/// snapshot's projections are logged so a headless run records the plan.
pub fn run_loop(
    client: &ControllerClient,
    ctx: &mut PollerContext,
    interval: Duration,
    stop: &mpsc::Receiver<()>,
) {
    let mut first = true;
    loop {
        let tick_start = Instant::now();

        let snapshot = tick(client, ctx);
        if first {
            for view in &snapshot.zones {
                info!("Zone {} next run: {}", view.zone_id.0, view.next_run_label);
            }
            first = false;
        }

        // Maintain steady cadence
        let elapsed = tick_start.elapsed();
        match stop.recv_timeout(interval.saturating_sub(elapsed)) {
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    info!("poller stopped");
}
