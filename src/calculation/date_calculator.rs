//! Specialization end date and working day arithmetic.
//!
//! Absences move the planned end of a specialization: sick and maternity
//! leave push it later day for day, recognised prior training pulls it
//! earlier, everything else leaves it alone. Effects are purely additive,
//! so absences may be supplied in any order and overlaps between them are
//! not resolved.

use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use tracing::debug;

use crate::models::{Absence, EndDateEffect};

/// Net number of days the absences move the end date.
///
/// Positive values push the end date later.
pub fn absence_adjustment_days(absences: &[Absence]) -> i64 {
    absences
        .iter()
        .map(|absence| match absence.absence_type.end_date_effect() {
            EndDateEffect::Extends => absence.day_count(),
            EndDateEffect::Reduces => -absence.day_count(),
            EndDateEffect::Neutral => 0,
        })
        .sum()
}

/// Calculates the planned end date of a specialization.
///
/// The base end date is `start + duration_days - 1`. Every sick or
/// maternity day adds one day, every recognition day subtracts one. Other
/// absence types have no effect.
///
/// # Arguments
///
/// * `start` - First day of the specialization
/// * `duration_days` - Nominal length in calendar days
/// * `absences` - Absences recorded against the specialization
///
/// # Examples
///
/// ```
/// use residency_engine::calculation::calculate_specialization_end_date;
/// use residency_engine::models::{Absence, AbsenceType};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
/// let sick = Absence {
///     id: "abs_001".to_string(),
///     absence_type: AbsenceType::Sick,
///     start_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
/// };
///
/// let end = calculate_specialization_end_date(start, 365, &[sick]);
/// assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
/// ```
pub fn calculate_specialization_end_date(
    start: NaiveDate,
    duration_days: i64,
    absences: &[Absence],
) -> NaiveDate {
    let adjustment = absence_adjustment_days(absences);
    let offset = duration_days.saturating_sub(1).saturating_add(adjustment);

    debug!(
        %start,
        duration_days,
        absences = absences.len(),
        adjustment,
        "Calculating specialization end date"
    );

    let shifted = TimeDelta::try_days(offset).and_then(|delta| start.checked_add_signed(delta));
    match shifted {
        Some(date) => date,
        None if offset < 0 => NaiveDate::MIN,
        None => NaiveDate::MAX,
    }
}

/// Counts the Monday to Friday dates in `[start, end]`.
///
/// An empty or reversed range yields 0.
///
/// # Examples
///
/// ```
/// use residency_engine::calculation::calculate_working_days;
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let next_monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// assert_eq!(calculate_working_days(monday, next_monday), 6);
/// ```
pub fn calculate_working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    let total_days = (end - start).num_days() + 1;
    let full_weeks = total_days / 7;
    let mut working_days = full_weeks * 5;

    // Walk the partial week left over after the full ones.
    let mut day = start + TimeDelta::days(full_weeks * 7);
    for _ in 0..(total_days % 7) {
        if !is_weekend(day) {
            working_days += 1;
        }
        day = day.succ_opt().unwrap_or(day);
    }

    u32::try_from(working_days).unwrap_or(u32::MAX)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Finds every pair of absences that share at least one day.
///
/// Pairs are reported once, in input order.
pub fn find_overlapping_absences(absences: &[Absence]) -> Vec<(&Absence, &Absence)> {
    let mut overlaps = Vec::new();
    for (index, first) in absences.iter().enumerate() {
        for second in &absences[index + 1..] {
            if first.overlaps_with(second) {
                overlaps.push((first, second));
            }
        }
    }
    overlaps
}
