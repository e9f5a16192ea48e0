//! Training quality scoring.
//!
//! Four sub-scores on a 0 to 100 scale, computed straight from the raw
//! records, and their weighted combination.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, MathematicalOps};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Course, Procedure, Publication, QualityMetrics, Shift};
use crate::records::TrainingRecords;

/// Weight of the shift regularity score (0.30).
pub const SHIFT_REGULARITY_WEIGHT: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Weight of the procedure diversity score (0.30).
pub const PROCEDURE_DIVERSITY_WEIGHT: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Weight of the learning consistency score (0.20).
pub const LEARNING_CONSISTENCY_WEIGHT: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Weight of the publication quality score (0.20).
pub const PUBLICATION_QUALITY_WEIGHT: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Below this, shift regularity, procedure diversity and learning
/// consistency produce a recommendation.
pub const QUALITY_RECOMMENDATION_THRESHOLD: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

/// Below this, publication quality produces a recommendation.
pub const PUBLICATION_RECOMMENDATION_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Courses finished within this multiple of the average time count as on time.
const ON_TIME_FACTOR: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// How evenly duty hours are spread over ISO weeks.
///
/// `100 - 2 × σ` of the weekly totals, floored at 0. A single week of
/// data scores 100; no shifts at all score 0.
///
/// # Example
///
/// ```
/// use residency_engine::calculation::shift_regularity_score;
/// use rust_decimal::Decimal;
///
/// assert_eq!(shift_regularity_score(&[]), Decimal::ZERO);
/// ```
pub fn shift_regularity_score(shifts: &[Shift]) -> Decimal {
    if shifts.is_empty() {
        return Decimal::ZERO;
    }

    let mut weekly: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for shift in shifts {
        let week = shift.date().iso_week();
        *weekly.entry((week.year(), week.week())).or_default() += shift.hours();
    }

    if weekly.len() < 2 {
        return Decimal::ONE_HUNDRED;
    }

    let count = Decimal::from(weekly.len());
    let mean = weekly.values().copied().sum::<Decimal>() / count;
    let variance = weekly
        .values()
        .map(|hours| (*hours - mean) * (*hours - mean))
        .sum::<Decimal>()
        / count;
    let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);

    (Decimal::ONE_HUNDRED - Decimal::TWO * std_dev).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// How varied the logged procedures are.
///
/// `(unique codes / total) × 80` plus one volume point per ten
/// procedures, at most 20; capped at 100. No procedures score 0.
pub fn procedure_diversity_score(procedures: &[Procedure]) -> Decimal {
    if procedures.is_empty() {
        return Decimal::ZERO;
    }

    let total = procedures.len();
    let unique = procedures
        .iter()
        .map(|p| p.code.as_str())
        .collect::<HashSet<_>>()
        .len();

    let ratio = Decimal::from(unique) / Decimal::from(total);
    let volume_bonus = Decimal::from((total / 10).min(20));

    (ratio * Decimal::from(80) + volume_bonus).min(Decimal::ONE_HUNDRED)
}

/// How consistently courses are finished.
///
/// The share of dated completions that took at most 1.2 × the average
/// completion time, in percent. No courses, or none completed, score 0;
/// completed courses without any completion date score 50.
pub fn learning_consistency_score(courses: &[Course]) -> Decimal {
    let completed: Vec<&Course> = courses.iter().filter(|c| c.is_completed).collect();
    if completed.is_empty() {
        return Decimal::ZERO;
    }

    let durations: Vec<Decimal> = completed
        .iter()
        .filter_map(|c| c.completion_days())
        .map(Decimal::from)
        .collect();
    if durations.is_empty() {
        return Decimal::from(50);
    }

    let count = Decimal::from(durations.len());
    let average = durations.iter().copied().sum::<Decimal>() / count;
    let limit = average * ON_TIME_FACTOR;
    let on_time = durations.iter().filter(|days| **days <= limit).count();

    Decimal::from(on_time) / count * Decimal::ONE_HUNDRED
}

/// Average publication impact, scaled to 0 to 100.
///
/// No publications score 0.
pub fn publication_quality_score(publications: &[Publication], today: NaiveDate) -> Decimal {
    if publications.is_empty() {
        return Decimal::ZERO;
    }

    let total: u32 = publications.iter().map(|p| p.impact_score(today)).sum();
    let average = Decimal::from(total) / Decimal::from(publications.len());

    (average * Decimal::TEN).min(Decimal::ONE_HUNDRED)
}

/// Computes the quality metrics of a trainee.
///
/// # Arguments
///
/// * `trainee_id` - The trainee the records belong to
/// * `records` - The trainee's full training records
/// * `now` - The instant the metrics are computed for
/// * `metrics_id` - Identifier stamped on the snapshot
pub fn calculate_quality_metrics(
    trainee_id: &str,
    records: &TrainingRecords,
    now: NaiveDateTime,
    metrics_id: Uuid,
) -> QualityMetrics {
    let shift_regularity_score = shift_regularity_score(&records.shifts);
    let procedure_diversity_score = procedure_diversity_score(&records.procedures);
    let learning_consistency_score = learning_consistency_score(&records.courses);
    let publication_quality_score = publication_quality_score(&records.publications, now.date());

    let overall_quality_score = shift_regularity_score * SHIFT_REGULARITY_WEIGHT
        + procedure_diversity_score * PROCEDURE_DIVERSITY_WEIGHT
        + learning_consistency_score * LEARNING_CONSISTENCY_WEIGHT
        + publication_quality_score * PUBLICATION_QUALITY_WEIGHT;

    let mut recommendations = Vec::new();
    if shift_regularity_score < QUALITY_RECOMMENDATION_THRESHOLD {
        recommendations.push("Improve shift scheduling consistency".to_string());
    }
    if procedure_diversity_score < QUALITY_RECOMMENDATION_THRESHOLD {
        recommendations.push("Perform more diverse procedure types".to_string());
    }
    if learning_consistency_score < QUALITY_RECOMMENDATION_THRESHOLD {
        recommendations.push("Maintain regular course participation".to_string());
    }
    if publication_quality_score < PUBLICATION_RECOMMENDATION_THRESHOLD {
        recommendations.push("Consider publishing in higher-impact journals".to_string());
    }

    debug!(
        trainee_id,
        %shift_regularity_score,
        %procedure_diversity_score,
        %learning_consistency_score,
        %publication_quality_score,
        %overall_quality_score,
        "Calculated quality metrics"
    );

    QualityMetrics {
        metrics_id,
        trainee_id: trainee_id.to_string(),
        calculated_at: now,
        shift_regularity_score,
        procedure_diversity_score,
        learning_consistency_score,
        publication_quality_score,
        overall_quality_score,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OperatorRole, PublicationType, RecordTags, ShiftDuration};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_shift(date: NaiveDate, hours: u32) -> Shift {
        Shift {
            id: format!("shift-{}", date),
            start: date.and_hms_opt(8, 0, 0).unwrap(),
            duration: ShiftDuration::new(hours, 0),
            internship_id: "int_001".to_string(),
            module_id: None,
            is_approved: true,
        }
    }

    fn make_procedure(code: &str) -> Procedure {
        Procedure {
            id: format!("proc-{}", code),
            code: code.to_string(),
            operator_role: OperatorRole::A,
            date: make_date(2025, 1, 10),
            internship_id: None,
            module_id: None,
            tags: RecordTags::default(),
        }
    }

    fn distinct_procedures(count: usize) -> Vec<Procedure> {
        (0..count)
            .map(|n| make_procedure(&format!("code{}", n)))
            .collect()
    }

    fn make_course(days: Option<i64>, is_completed: bool) -> Course {
        let start_date = make_date(2025, 1, 1);
        Course {
            id: "course".to_string(),
            name: "Course".to_string(),
            module_id: None,
            start_date,
            is_completed,
            completed_at: days.map(|d| start_date + chrono::TimeDelta::days(d)),
            tags: RecordTags::default(),
        }
    }

    fn make_publication(publication_type: PublicationType, is_peer_reviewed: bool) -> Publication {
        Publication {
            id: "pub".to_string(),
            title: "Title".to_string(),
            publication_type,
            publication_date: make_date(2015, 1, 1),
            is_peer_reviewed,
            is_first_author: false,
            is_corresponding_author: false,
            doi: None,
            pmid: None,
        }
    }

    #[test]
    fn test_regularity_single_week_scores_one_hundred() {
        let shifts = vec![
            make_shift(make_date(2025, 3, 3), 10),
            make_shift(make_date(2025, 3, 5), 12),
        ];
        assert_eq!(shift_regularity_score(&shifts), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_regularity_identical_weeks_score_one_hundred() {
        let shifts = vec![
            make_shift(make_date(2025, 3, 3), 40),
            make_shift(make_date(2025, 3, 10), 40),
        ];
        assert_eq!(shift_regularity_score(&shifts), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_regularity_penalises_uneven_weeks() {
        // Weekly totals 20 and 40: mean 30, σ = 10.
        let shifts = vec![
            make_shift(make_date(2025, 3, 3), 20),
            make_shift(make_date(2025, 3, 10), 20),
            make_shift(make_date(2025, 3, 11), 20),
        ];
        let score = shift_regularity_score(&shifts);
        assert!((score - dec("80")).abs() < dec("0.0001"), "score was {}", score);
    }

    #[test]
    fn test_regularity_floors_at_zero() {
        // Weekly totals 1 and 121: σ = 60.
        let mut shifts = vec![make_shift(make_date(2025, 3, 3), 1)];
        for day in 10..=14 {
            shifts.push(make_shift(make_date(2025, 3, day), 24));
        }
        shifts.push(make_shift(make_date(2025, 3, 16), 1));
        assert_eq!(shift_regularity_score(&shifts), Decimal::ZERO);
    }

    #[test]
    fn test_iso_week_spans_year_boundary() {
        // 2024-12-30 and 2025-01-02 are both in ISO week 1 of 2025.
        let shifts = vec![
            make_shift(make_date(2024, 12, 30), 10),
            make_shift(make_date(2025, 1, 2), 30),
        ];
        assert_eq!(shift_regularity_score(&shifts), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_diversity_all_unique() {
        let procedures = distinct_procedures(5);
        assert_eq!(procedure_diversity_score(&procedures), dec("80"));
    }

    #[test]
    fn test_diversity_volume_bonus() {
        // 2 unique of 30: 2/30 × 80 + 3
        let procedures: Vec<Procedure> = (0..30)
            .map(|n| make_procedure(if n % 2 == 0 { "ecg" } else { "echo" }))
            .collect();
        let score = procedure_diversity_score(&procedures);
        assert!((score - dec("8.3333")).abs() < dec("0.001"), "score was {}", score);
    }

    #[test]
    fn test_diversity_capped_at_one_hundred() {
        let procedures = distinct_procedures(300);
        assert_eq!(procedure_diversity_score(&procedures), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_diversity_without_procedures() {
        assert_eq!(procedure_diversity_score(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_consistency_without_completed_courses() {
        assert_eq!(learning_consistency_score(&[]), Decimal::ZERO);
        assert_eq!(
            learning_consistency_score(&[make_course(Some(3), false)]),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_consistency_without_completion_dates() {
        let courses = vec![make_course(None, true), make_course(None, true)];
        assert_eq!(learning_consistency_score(&courses), dec("50"));
    }

    #[test]
    fn test_consistency_counts_on_time_completions() {
        // Average 10 days, limit 12: only the 13 day completion is late.
        let courses = vec![
            make_course(Some(5), true),
            make_course(Some(10), true),
            make_course(Some(12), true),
            make_course(Some(13), true),
        ];
        assert_eq!(learning_consistency_score(&courses), dec("75"));
    }

    #[test]
    fn test_publication_quality_average() {
        // Reviewed journal 10, unreviewed conference 4: average 7.
        let publications = vec![
            make_publication(PublicationType::Journal, true),
            make_publication(PublicationType::Conference, false),
        ];
        assert_eq!(
            publication_quality_score(&publications, make_date(2025, 1, 1)),
            dec("70")
        );
    }

    #[test]
    fn test_publication_quality_without_publications() {
        assert_eq!(
            publication_quality_score(&[], make_date(2025, 1, 1)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_empty_records_recommend_everything() {
        let now = make_date(2025, 3, 28).and_hms_opt(9, 0, 0).unwrap();
        let records = TrainingRecords::default();
        let metrics = calculate_quality_metrics("tr_001", &records, now, Uuid::nil());

        assert_eq!(metrics.overall_quality_score, Decimal::ZERO);
        assert_eq!(metrics.recommendations.len(), 4);
        assert_eq!(metrics.calculated_at, now);
    }

    #[test]
    fn test_overall_score_weights() {
        let now = make_date(2025, 3, 28).and_hms_opt(9, 0, 0).unwrap();
        let records = TrainingRecords {
            shifts: vec![make_shift(make_date(2025, 3, 3), 10)],
            procedures: distinct_procedures(5),
            courses: vec![make_course(None, true)],
            publications: vec![make_publication(PublicationType::Journal, true)],
            ..TrainingRecords::default()
        };
        let metrics = calculate_quality_metrics("tr_001", &records, now, Uuid::nil());

        // 100×0.3 + 80×0.3 + 50×0.2 + 100×0.2
        assert_eq!(metrics.overall_quality_score, dec("84"));
        assert_eq!(
            metrics.recommendations,
            vec!["Maintain regular course participation"]
        );
    }

    #[test]
    fn test_metrics_carry_given_id() {
        let now = make_date(2025, 3, 28).and_hms_opt(9, 0, 0).unwrap();
        let records = TrainingRecords {
            shifts: vec![make_shift(make_date(2025, 3, 3), 10)],
            ..TrainingRecords::default()
        };
        let id = Uuid::new_v4();

        let first = calculate_quality_metrics("tr_001", &records, now, id);
        let second = calculate_quality_metrics("tr_001", &records, now, id);
        assert_eq!(first.metrics_id, id);
        assert_eq!(first, second);
    }
}
