//! Fixed-width run duration handling.
//!
//! Controller schedules encode durations as a 6-digit "HHMMSS" string.
//! Decoding is deliberately forgiving: malformed input yields 0 rather than
//! an error, so one bad slot never takes down a schedule view.

/// "HHMMSS" -> seconds. Anything that is not exactly six ASCII digits
/// decodes to 0. Field values are taken as-is, so non-canonical input like
/// "000090" still decodes to a meaningful total.
pub fn decode_hhmmss(raw: &str) -> u32 {
    let digits = raw.trim();
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    let field = |range: core::ops::Range<usize>| -> u32 {
        digits[range].parse::<u32>().unwrap_or(0)
    };
    field(0..2) * 3600 + field(2..4) * 60 + field(4..6)
}

/// Seconds -> zero-padded "HH:MM:SS". Totals of a day or more are the
/// caller's problem; hours are printed as-is without wrapping.
pub fn encode_hms(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Scale a base duration by the global settings multiplier, rounded to the
/// nearest whole second. Non-finite or negative results clamp to 0.
pub fn apply_multiplier(base_seconds: u32, multiplier: f64) -> u32 {
    let scaled = (base_seconds as f64 * multiplier).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u32
    } else {
        0
    }
}
