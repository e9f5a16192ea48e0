//! Duty hour limits for new shifts.
//!
//! A candidate shift is checked in order against the daily and consecutive
//! hour ceilings, the weekly ceiling of its Monday-aligned week, and
//! overlap with shifts already recorded on the same day. The first failing
//! check decides the verdict.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{RuleResult, RuleViolation};
use crate::models::{Shift, ShiftDuration, TimeWindow};

/// Longest shift allowed on one day, in hours.
pub const MAX_DAILY_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// Longest uninterrupted duty allowed, in hours.
pub const MAX_CONSECUTIVE_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// Most duty hours allowed in one Monday-aligned week.
pub const MAX_WEEKLY_HOURS: Decimal = Decimal::from_parts(48, 0, 0, false, 0);

/// Fewest approved duty hours expected in one calendar month.
pub const MIN_MONTHLY_HOURS: Decimal = Decimal::from_parts(160, 0, 0, false, 0);

/// Returns the Monday starting the week of `date` and the following Monday.
///
/// The week is the half-open range `[monday, next_monday)`.
///
/// # Example
///
/// ```
/// use residency_engine::calculation::week_window;
/// use chrono::NaiveDate;
///
/// let thursday = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap();
/// let (monday, next_monday) = week_window(thursday);
/// assert_eq!(monday, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
/// assert_eq!(next_monday, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
/// ```
pub fn week_window(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + TimeDelta::days(7))
}

/// Sums the hours of the shifts starting within the week of `date`.
pub fn weekly_hours(date: NaiveDate, shifts: &[Shift]) -> Decimal {
    let (monday, next_monday) = week_window(date);
    shifts
        .iter()
        .filter(|s| s.date() >= monday && s.date() < next_monday)
        .map(|s| s.hours())
        .sum()
}

/// Validates a candidate shift against the duty hour limits.
///
/// # Arguments
///
/// * `start` - When the candidate shift starts
/// * `duration` - How long it lasts
/// * `existing` - The trainee's recorded shifts; at least those of the
///   candidate's week
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the duration exceeds [`MAX_DAILY_HOURS`] or
///   [`MAX_CONSECUTIVE_HOURS`]
/// - `BUSINESS_RULE_VIOLATION` if the week would exceed
///   [`MAX_WEEKLY_HOURS`]; the message reports the hours already booked
/// - `CONFLICT` if the shift overlaps a shift on the same day; touching
///   at a boundary counts as overlap
///
/// # Examples
///
/// ```
/// use residency_engine::calculation::validate_shift;
/// use residency_engine::error::ErrorCode;
/// use residency_engine::models::ShiftDuration;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap().and_hms_opt(8, 0, 0).unwrap();
///
/// assert!(validate_shift(start, ShiftDuration::new(12, 0), &[]).is_ok());
///
/// let violation = validate_shift(start, ShiftDuration::new(25, 0), &[]).unwrap_err();
/// assert_eq!(violation.code, ErrorCode::ValidationError);
/// ```
pub fn validate_shift(
    start: NaiveDateTime,
    duration: ShiftDuration,
    existing: &[Shift],
) -> RuleResult<()> {
    let hours = duration.total_hours();

    if hours > MAX_DAILY_HOURS {
        return Err(RuleViolation::validation(format!(
            "Shift duration exceeds maximum daily limit of {} hours",
            MAX_DAILY_HOURS
        )));
    }

    if hours > MAX_CONSECUTIVE_HOURS {
        return Err(RuleViolation::validation(format!(
            "Shift duration exceeds maximum consecutive hours limit of {}",
            MAX_CONSECUTIVE_HOURS
        )));
    }

    let date = start.date();
    let booked = weekly_hours(date, existing);
    if booked + hours > MAX_WEEKLY_HOURS {
        debug!(%date, %booked, %hours, "Weekly hour limit exceeded");
        return Err(RuleViolation::business_rule(format!(
            "Adding this shift would exceed weekly limit of {} hours. Current: {}h",
            MAX_WEEKLY_HOURS,
            booked.normalize()
        )));
    }

    let candidate = TimeWindow::from_duration(start, duration);
    if let Some(conflict) = existing
        .iter()
        .filter(|s| s.date() == date)
        .map(Shift::window)
        .find(|window| candidate.overlaps(window))
    {
        return Err(RuleViolation::conflict(format!(
            "Shift overlaps with existing shift from {} to {}",
            conflict.start.format("%H:%M"),
            conflict.end.format("%H:%M")
        )));
    }

    debug!(%start, %hours, weekly_total = %(booked + hours), "Shift accepted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use proptest::prelude::*;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_shift(id: &str, start: NaiveDateTime, hours: u32) -> Shift {
        Shift {
            id: id.to_string(),
            start,
            duration: ShiftDuration::new(hours, 0),
            internship_id: "int_001".to_string(),
            module_id: None,
            is_approved: true,
        }
    }

    /// 45 hours booked Monday to Wednesday of the week of 2025-03-03.
    fn forty_five_hour_week() -> Vec<Shift> {
        vec![
            make_shift("s1", make_datetime("2025-03-03", "08:00:00"), 15),
            make_shift("s2", make_datetime("2025-03-04", "08:00:00"), 15),
            make_shift("s3", make_datetime("2025-03-05", "08:00:00"), 15),
        ]
    }

    #[test]
    fn test_shift_within_limits_is_accepted() {
        let start = make_datetime("2025-03-06", "08:00:00");
        assert!(validate_shift(start, ShiftDuration::new(3, 0), &forty_five_hour_week()).is_ok());
    }

    #[test]
    fn test_twenty_four_hour_shift_is_allowed() {
        let start = make_datetime("2025-03-03", "08:00:00");
        assert!(validate_shift(start, ShiftDuration::new(24, 0), &[]).is_ok());
    }

    #[test]
    fn test_shift_over_daily_limit() {
        let start = make_datetime("2025-03-03", "08:00:00");
        let violation = validate_shift(start, ShiftDuration::new(24, 1), &[]).unwrap_err();
        assert_eq!(violation.code, ErrorCode::ValidationError);
        assert_eq!(
            violation.message,
            "Shift duration exceeds maximum daily limit of 24 hours"
        );
    }

    #[test]
    fn test_unnormalized_minutes_count_towards_limit() {
        let start = make_datetime("2025-03-03", "08:00:00");
        let result = validate_shift(start, ShiftDuration::new(23, 90), &[]);
        assert_eq!(result.unwrap_err().code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_weekly_limit_reports_pre_addition_total() {
        let start = make_datetime("2025-03-07", "08:00:00");
        let violation =
            validate_shift(start, ShiftDuration::new(5, 0), &forty_five_hour_week()).unwrap_err();
        assert_eq!(violation.code, ErrorCode::BusinessRuleViolation);
        assert_eq!(
            violation.message,
            "Adding this shift would exceed weekly limit of 48 hours. Current: 45h"
        );
    }

    #[test]
    fn test_previous_week_does_not_count() {
        let start = make_datetime("2025-03-10", "08:00:00");
        assert!(validate_shift(start, ShiftDuration::new(20, 0), &forty_five_hour_week()).is_ok());
    }

    #[test]
    fn test_sunday_belongs_to_week_started_on_monday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(weekly_hours(sunday, &forty_five_hour_week()), Decimal::from(45));
    }

    #[test]
    fn test_overlapping_shift_on_same_day() {
        let existing = vec![make_shift("s1", make_datetime("2025-03-03", "08:00:00"), 8)];
        let start = make_datetime("2025-03-03", "12:00:00");
        let violation = validate_shift(start, ShiftDuration::new(4, 0), &existing).unwrap_err();
        assert_eq!(violation.code, ErrorCode::Conflict);
        assert_eq!(
            violation.message,
            "Shift overlaps with existing shift from 08:00 to 16:00"
        );
    }

    #[test]
    fn test_touching_shift_counts_as_overlap() {
        let existing = vec![make_shift("s1", make_datetime("2025-03-03", "08:00:00"), 8)];
        let start = make_datetime("2025-03-03", "16:00:00");
        let result = validate_shift(start, ShiftDuration::new(4, 0), &existing);
        assert_eq!(result.unwrap_err().code, ErrorCode::Conflict);
    }

    #[test]
    fn test_separate_shifts_on_same_day() {
        let existing = vec![make_shift("s1", make_datetime("2025-03-03", "06:00:00"), 4)];
        let start = make_datetime("2025-03-03", "14:00:00");
        assert!(validate_shift(start, ShiftDuration::new(6, 0), &existing).is_ok());
    }

    #[test]
    fn test_daily_limit_checked_before_overlap() {
        let existing = vec![make_shift("s1", make_datetime("2025-03-03", "08:00:00"), 8)];
        let start = make_datetime("2025-03-03", "08:00:00");
        let result = validate_shift(start, ShiftDuration::new(30, 0), &existing);
        assert_eq!(result.unwrap_err().code, ErrorCode::ValidationError);
    }

    fn window_strategy() -> impl Strategy<Value = TimeWindow> {
        (0i64..2000, 0i64..600).prop_map(|(offset, length)| {
            let base = make_datetime("2025-03-03", "00:00:00");
            let start = base + TimeDelta::minutes(offset);
            TimeWindow {
                start,
                end: start + TimeDelta::minutes(length),
            }
        })
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in window_strategy(), b in window_strategy()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_window_overlaps_itself(a in window_strategy()) {
            prop_assert!(a.overlaps(&a));
        }
    }
}
