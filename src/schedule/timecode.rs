//! Start-code classification.
//!
//! A schedule slot's code is either a 4-digit 24-hour clock string ("0600")
//! or a solar token with an optional signed minute offset ("SUNRISE+30").
//! Clock codes carry their own answer; solar codes need the backend's
//! astronomical resolver.

use chrono::NaiveTime;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SolarEvent {
    Sunrise,
    Sunset,
    Zenith,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeCode {
    Clock(NaiveTime),
    Solar { event: SolarEvent, offset_minutes: i32 },
}

/// Parse a raw start code. Returns `None` for anything that is neither a
/// valid clock string nor a recognised solar token; such codes are still
/// sent to the resolver, which is free to reject them.
pub fn parse_code(raw: &str) -> Option<TimeCode> {
    let code = raw.trim();
    if code.len() == 4 && code.bytes().all(|b| b.is_ascii_digit()) {
        let hours: u32 = code[0..2].parse().ok()?;
        let minutes: u32 = code[2..4].parse().ok()?;
        return NaiveTime::from_hms_opt(hours, minutes, 0).map(TimeCode::Clock);
    }

    for (token, event) in [
        ("SUNRISE", SolarEvent::Sunrise),
        ("SUNSET", SolarEvent::Sunset),
        ("ZENITH", SolarEvent::Zenith),
    ] {
        let Some(rest) = code.strip_prefix(token) else {
            continue;
        };
        if rest.is_empty() {
            return Some(TimeCode::Solar {
                event,
                offset_minutes: 0,
            });
        }
        if rest.starts_with('+') || rest.starts_with('-') {
            let sign = if rest.starts_with('-') { -1 } else { 1 };
            // unsigned parse so "+-30" and similar do not sneak through
            let magnitude = rest[1..].parse::<u32>().ok().and_then(|m| i32::try_from(m).ok())?;
            return Some(TimeCode::Solar {
                event,
                offset_minutes: sign * magnitude,
            });
        }
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn parses_clock_codes() {
        assert_eq!(
            parse_code("0600"),
            Some(TimeCode::Clock(NaiveTime::from_hms_opt(6, 0, 0).unwrap()))
        );
        assert_eq!(
            parse_code("2359"),
            Some(TimeCode::Clock(NaiveTime::from_hms_opt(23, 59, 0).unwrap()))
        );
    }

    #[test]
    fn rejects_out_of_range_clock_codes() {
        assert_eq!(parse_code("2400"), None);
        assert_eq!(parse_code("0960"), None);
        assert_eq!(parse_code("600"), None);
        assert_eq!(parse_code("06000"), None);
    }

    #[test]
    fn parses_solar_tokens_with_offsets() {
        assert_eq!(
            parse_code("SUNRISE+30"),
            Some(TimeCode::Solar {
                event: SolarEvent::Sunrise,
                offset_minutes: 30,
            })
        );
        assert_eq!(
            parse_code("SUNSET-15"),
            Some(TimeCode::Solar {
                event: SolarEvent::Sunset,
                offset_minutes: -15,
            })
        );
        assert_eq!(
            parse_code("ZENITH"),
            Some(TimeCode::Solar {
                event: SolarEvent::Zenith,
                offset_minutes: 0,
            })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_code(""), None);
        assert_eq!(parse_code("noon"), None);
        assert_eq!(parse_code("SUNRISE+"), None);
        assert_eq!(parse_code("SUNRISE+-30"), None);
        assert_eq!(parse_code("SUNRISE30"), None);
        assert_eq!(parse_code("sunrise+30"), None);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert!(matches!(parse_code(" 0600 "), Some(TimeCode::Clock(_))));
    }
}
