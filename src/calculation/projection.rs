//! Specialization completion projection.
//!
//! Combines the overall progress score, the quality score and the
//! absence-adjusted end date into an on-track verdict, a completion
//! probability and a list of risk factors.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Absence, CompletionProjection, ProgressStatistics, RiskFactor};

use super::date_calculator::{absence_adjustment_days, calculate_specialization_end_date};

/// Weight of overall progress in the completion probability (0.5).
pub const PROGRESS_FACTOR_WEIGHT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Weight of the quality factor in the completion probability (0.2).
pub const QUALITY_FACTOR_WEIGHT: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Weight of the time factor in the completion probability (0.2).
pub const TIME_FACTOR_WEIGHT: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Weight of the absence factor in the completion probability (0.1).
pub const ABSENCE_FACTOR_WEIGHT: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Quality score at which the quality factor reaches 1.
const QUALITY_SATURATION: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Time factor while behind schedule (0.8).
const BEHIND_SCHEDULE_TIME_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Absence factor once the absence count is a risk (0.9).
const HIGH_ABSENCE_FACTOR: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Net extension above which absences are a risk.
pub const EXTENSION_RISK_DAYS: i64 = 30;

/// Absence count above which absences are a risk.
pub const MAX_ABSENCES_WITHOUT_RISK: usize = 3;

/// Overall progress below this is a risk (0.6).
pub const LOW_PROGRESS_THRESHOLD: Decimal = Decimal::from_parts(6, 0, 0, false, 1);

/// Quality score below this is a risk.
pub const LOW_QUALITY_THRESHOLD: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Completion probability below this requires intervention (0.7).
pub const INTERVENTION_PROBABILITY: Decimal = Decimal::from_parts(7, 0, 0, false, 1);

/// Remaining time beyond this multiple of the planned remaining time
/// requires intervention (1.2).
const INTERVENTION_DELAY_FACTOR: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// Category completion in percent below which a catch-up is recommended.
const CATCH_UP_PERCENTAGE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Everything a projection is computed from.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInput<'a> {
    /// First day of the specialization.
    pub start_date: NaiveDate,
    /// Nominal program length in calendar days.
    pub duration_days: i64,
    /// Absences recorded against the specialization.
    pub absences: &'a [Absence],
    /// Program-wide progress statistics.
    pub statistics: &'a ProgressStatistics,
    /// Overall quality score, 0 to 100.
    pub quality_score: Decimal,
}

/// Share of the planned duration elapsed by `today`, between 0 and 1,
/// rounded to four places.
///
/// A non-positive duration counts as fully elapsed.
///
/// # Example
///
/// ```
/// use residency_engine::calculation::expected_progress;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let today = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
/// assert_eq!(expected_progress(start, 100, today), Decimal::new(25, 2));
/// assert_eq!(expected_progress(start, 100, start), Decimal::ZERO);
/// ```
pub fn expected_progress(start: NaiveDate, duration_days: i64, today: NaiveDate) -> Decimal {
    if duration_days <= 0 {
        return Decimal::ONE;
    }
    let elapsed = Decimal::from((today - start).num_days());
    (elapsed / Decimal::from(duration_days))
        .clamp(Decimal::ZERO, Decimal::ONE)
        .round_dp(4)
}

/// Estimated chance of finishing the specialization, between 0 and 1.
///
/// `0.5 × progress + 0.2 × quality factor + 0.2 × time factor + 0.1 ×
/// absence factor`, capped at 1. The quality factor is `quality / 50`
/// capped at 1; the time factor is 0.8 when behind schedule; the absence
/// factor is 0.9 with more than three absences.
///
/// # Example
///
/// ```
/// use residency_engine::calculation::completion_probability;
/// use rust_decimal::Decimal;
///
/// let probability = completion_probability(Decimal::new(6, 1), Decimal::from(50), true, 0);
/// assert_eq!(probability, Decimal::new(8, 1));
/// ```
pub fn completion_probability(
    overall_progress: Decimal,
    quality_score: Decimal,
    is_on_track: bool,
    absence_count: usize,
) -> Decimal {
    let quality_factor = (quality_score / QUALITY_SATURATION).clamp(Decimal::ZERO, Decimal::ONE);
    let time_factor = if is_on_track {
        Decimal::ONE
    } else {
        BEHIND_SCHEDULE_TIME_FACTOR
    };
    let absence_factor = if absence_count > MAX_ABSENCES_WITHOUT_RISK {
        HIGH_ABSENCE_FACTOR
    } else {
        Decimal::ONE
    };

    let probability = overall_progress * PROGRESS_FACTOR_WEIGHT
        + quality_factor * QUALITY_FACTOR_WEIGHT
        + time_factor * TIME_FACTOR_WEIGHT
        + absence_factor * ABSENCE_FACTOR_WEIGHT;

    probability.min(Decimal::ONE)
}

fn identify_risk_factors(
    is_on_track: bool,
    net_adjustment_days: i64,
    absence_count: usize,
    overall_progress: Decimal,
    quality_score: Decimal,
) -> Vec<RiskFactor> {
    let mut risks = Vec::new();
    if !is_on_track {
        risks.push(RiskFactor::BehindSchedule);
    }
    if net_adjustment_days > EXTENSION_RISK_DAYS {
        risks.push(RiskFactor::SignificantExtension);
    }
    if absence_count > MAX_ABSENCES_WITHOUT_RISK {
        risks.push(RiskFactor::HighAbsenceCount);
    }
    if overall_progress < LOW_PROGRESS_THRESHOLD {
        risks.push(RiskFactor::LowOverallProgress);
    }
    if quality_score < LOW_QUALITY_THRESHOLD {
        risks.push(RiskFactor::LowQualityEngagement);
    }
    risks
}

fn recommendations(risks: &[RiskFactor], statistics: &ProgressStatistics) -> Vec<String> {
    let mut recommendations = Vec::new();
    if risks.contains(&RiskFactor::BehindSchedule) {
        recommendations.push("Increase internship and course completion rate".to_string());
    }
    if risks.contains(&RiskFactor::LowQualityEngagement) {
        recommendations
            .push("Focus on research publications and self-education activities".to_string());
    }
    if statistics.internships.percentage() < CATCH_UP_PERCENTAGE {
        recommendations.push("Prioritize completing required internships".to_string());
    }
    if statistics.courses.percentage() < CATCH_UP_PERCENTAGE {
        recommendations.push("Focus on mandatory course completion".to_string());
    }
    if statistics.publications.completed == 0 {
        recommendations
            .push("Consider engaging in research and publication activities".to_string());
    }
    recommendations
}

/// Projects when and how likely a trainee finishes the specialization.
///
/// The trainee is on track when overall progress is at least the share
/// of the planned duration already elapsed. Intervention is required when
/// the completion probability is below 0.7, or when the days left to the
/// adjusted end date exceed 1.2 × the days left to the planned end date.
///
/// # Arguments
///
/// * `trainee_id` - The trainee the projection is for
/// * `input` - Program dates, absences, progress and quality
/// * `now` - The instant the projection is made for
/// * `projection_id` - Identifier stamped on the snapshot
pub fn project_completion(
    trainee_id: &str,
    input: &ProjectionInput<'_>,
    now: NaiveDateTime,
    projection_id: Uuid,
) -> CompletionProjection {
    let today = now.date();
    let planned_completion_date =
        calculate_specialization_end_date(input.start_date, input.duration_days, &[]);
    let estimated_completion_date =
        calculate_specialization_end_date(input.start_date, input.duration_days, input.absences);
    let net_adjustment_days = absence_adjustment_days(input.absences);

    let overall_progress = input.statistics.overall_progress;
    let expected_progress = expected_progress(input.start_date, input.duration_days, today);
    let is_on_track = overall_progress >= expected_progress;
    let absence_count = input.absences.len();

    let completion_probability = completion_probability(
        overall_progress,
        input.quality_score,
        is_on_track,
        absence_count,
    );
    let risk_factors = identify_risk_factors(
        is_on_track,
        net_adjustment_days,
        absence_count,
        overall_progress,
        input.quality_score,
    );
    let recommendations = recommendations(&risk_factors, input.statistics);

    let days_left = (estimated_completion_date - today).num_days();
    let planned_days_left = (planned_completion_date - today).num_days();
    let delayed =
        Decimal::from(days_left) > Decimal::from(planned_days_left) * INTERVENTION_DELAY_FACTOR;
    let requires_intervention = completion_probability < INTERVENTION_PROBABILITY || delayed;

    debug!(
        trainee_id,
        %overall_progress,
        %expected_progress,
        %completion_probability,
        risks = risk_factors.len(),
        requires_intervention,
        "Projected specialization completion"
    );

    CompletionProjection {
        projection_id,
        trainee_id: trainee_id.to_string(),
        projected_at: now,
        planned_completion_date,
        estimated_completion_date,
        net_adjustment_days,
        remaining_days: days_left.max(0),
        overall_progress,
        expected_progress,
        is_on_track,
        completion_probability,
        risk_factors,
        recommendations,
        requires_intervention,
    }
}
