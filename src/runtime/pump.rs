//! Derived pump state. The pump relay follows the zones: it is on exactly
//! when at least one zone reports an active run, regardless of source.

use crate::models::controller::{GpioConfig, ZoneId};
use crate::runtime::tracker::ZoneRuntimeState;
use std::collections::BTreeMap;

pub fn pump_on(states: &BTreeMap<ZoneId, ZoneRuntimeState>) -> bool {
    states.values().any(|state| state.active)
}

/// Whether this zone drives the pump relay instead of a watering valve.
pub fn is_pump_zone(gpio: Option<&GpioConfig>, zone: ZoneId) -> bool {
    gpio.and_then(|g| g.pump_zone) == Some(zone)
}
