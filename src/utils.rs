use chrono::{NaiveTime, Timelike};

/// Parse a resolver-produced "HH:MM" string. `None` for anything else,
/// including the `N/A` sentinel.
pub fn parse_hh_mm(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
