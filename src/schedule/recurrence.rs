//! Next-occurrence projection for Weekly and Monthly zones.

use crate::models::controller::Period;
use chrono::{Datelike, Days, NaiveDate};

/// Next calendar date a Weekly or Monthly zone runs, projected from the
/// anchor `start_day`.
///
/// Weekly targets the anchor's day of week and is always strictly in the
/// future: a matching today rolls a full week out. Monthly targets the
/// anchor's day of month and today counts; anchors past the end of a short
/// month clamp to its last day.
///
/// Daily zones pick among same-day slots instead (see the next-run
/// selector), and reserved periods project nothing, so both return `None`,
/// as does a missing or unparsable anchor.
pub fn next_occurrence(period: Period, start_day: Option<&str>, today: NaiveDate) -> Option<NaiveDate> {
    let anchor = NaiveDate::parse_from_str(start_day?.trim(), "%Y-%m-%d").ok()?;
    match period {
        Period::Weekly => {
            let target = anchor.weekday().num_days_from_monday() as i64;
            let current = today.weekday().num_days_from_monday() as i64;
            let mut delta = (target - current).rem_euclid(7);
            if delta == 0 {
                delta = 7;
            }
            today.checked_add_days(Days::new(delta as u64))
        }
        Period::Monthly => {
            let target_dom = anchor.day();
            let candidate = day_of_month_clamped(today.year(), today.month(), target_dom)?;
            if candidate < today {
                let (year, month) = if today.month() == 12 {
                    (today.year() + 1, 1)
                } else {
                    (today.year(), today.month() + 1)
                };
                day_of_month_clamped(year, month, target_dom)
            } else {
                Some(candidate)
            }
        }
        Period::Daily | Period::Specific | Period::Interval => None,
    }
}

/// The given day in the given month, or the month's last day when it is
/// shorter than `day`.
fn day_of_month_clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| last_day_of_month(year, month))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_matching_today_rolls_a_full_week() {
        // both Mondays
        let next = next_occurrence(Period::Weekly, Some("2026-04-06"), date(2026, 4, 13));
        assert_eq!(next, Some(date(2026, 4, 20)));
    }

    #[test]
    fn weekly_later_in_the_same_week() {
        // anchor Friday, today Monday
        let next = next_occurrence(Period::Weekly, Some("2026-04-10"), date(2026, 4, 13));
        assert_eq!(next, Some(date(2026, 4, 17)));
    }

    #[test]
    fn weekly_wraps_to_next_week() {
        // anchor Monday, today Wednesday
        let next = next_occurrence(Period::Weekly, Some("2026-04-06"), date(2026, 4, 15));
        assert_eq!(next, Some(date(2026, 4, 20)));
    }

    #[test]
    fn monthly_today_counts() {
        let next = next_occurrence(Period::Monthly, Some("2026-01-15"), date(2026, 4, 15));
        assert_eq!(next, Some(date(2026, 4, 15)));
    }

    #[test]
    fn monthly_past_target_moves_to_next_month() {
        let next = next_occurrence(Period::Monthly, Some("2026-01-10"), date(2026, 4, 15));
        assert_eq!(next, Some(date(2026, 5, 10)));
    }

    #[test]
    fn monthly_december_rolls_into_january() {
        let next = next_occurrence(Period::Monthly, Some("2026-01-10"), date(2026, 12, 20));
        assert_eq!(next, Some(date(2027, 1, 10)));
    }

    #[test]
    fn monthly_short_month_clamps_to_last_day() {
        // day 31 anchor, evaluated mid-February of a non-leap year
        let next = next_occurrence(Period::Monthly, Some("2026-01-31"), date(2026, 2, 15));
        assert_eq!(next, Some(date(2026, 2, 28)));
    }

    #[test]
    fn monthly_clamp_policy_is_applied_consistently() {
        // the same anchor clamps in every short month, never skips one
        let anchor = Some("2026-01-31");
        assert_eq!(
            next_occurrence(Period::Monthly, anchor, date(2026, 4, 10)),
            Some(date(2026, 4, 30))
        );
        assert_eq!(
            next_occurrence(Period::Monthly, anchor, date(2026, 6, 10)),
            Some(date(2026, 6, 30))
        );
        assert_eq!(
            next_occurrence(Period::Monthly, anchor, date(2028, 2, 10)),
            Some(date(2028, 2, 29))
        );
    }

    #[test]
    fn daily_and_reserved_periods_project_nothing() {
        assert_eq!(next_occurrence(Period::Daily, Some("2026-04-06"), date(2026, 4, 13)), None);
        assert_eq!(next_occurrence(Period::Specific, Some("2026-04-06"), date(2026, 4, 13)), None);
        assert_eq!(next_occurrence(Period::Interval, Some("2026-04-06"), date(2026, 4, 13)), None);
    }

    #[test]
    fn unusable_anchor_projects_nothing() {
        assert_eq!(next_occurrence(Period::Weekly, None, date(2026, 4, 13)), None);
        assert_eq!(next_occurrence(Period::Weekly, Some(""), date(2026, 4, 13)), None);
        assert_eq!(next_occurrence(Period::Weekly, Some("04/06/2026"), date(2026, 4, 13)), None);
    }
}
