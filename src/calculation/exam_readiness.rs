//! Examination readiness checks.
//!
//! Each exam tier runs a fixed checklist and collects what is missing.
//! The state exam (PES) runs the specialization final checklist first and
//! adds its own requirements on top.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    ExamType, ExaminationReadiness, IssueSeverity, ModuleType, OperatorRole, Trainee,
};
use crate::records::TrainingRecords;

use super::compliance_report::generate_compliance_report;
use super::quality_score::calculate_quality_metrics;

/// Minimum overall quality score for the specialization final exam.
pub const MIN_EXAM_QUALITY_SCORE: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

/// Minimum self-education hours for the state exam.
pub const MIN_PES_SELF_EDUCATION_HOURS: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Most "Complete internship at ..." recommendations listed.
const MAX_INTERNSHIP_RECOMMENDATIONS: usize = 3;

/// Procedure counts per operator role a module colloquium requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureThresholds {
    /// Procedures performed as operator.
    pub type_a: usize,
    /// Procedures assisted.
    pub type_b: usize,
    /// Procedures observed.
    pub type_c: usize,
}

/// Returns the procedure thresholds for a module type.
pub fn procedure_thresholds(module_type: ModuleType) -> ProcedureThresholds {
    match module_type {
        ModuleType::Basic => ProcedureThresholds {
            type_a: 50,
            type_b: 30,
            type_c: 20,
        },
        ModuleType::Specialist => ProcedureThresholds {
            type_a: 100,
            type_b: 60,
            type_c: 40,
        },
    }
}

/// Returns the duty hours a module colloquium requires.
pub fn required_module_hours(module_type: ModuleType) -> Decimal {
    match module_type {
        ModuleType::Basic => Decimal::from(1000),
        ModuleType::Specialist => Decimal::from(2000),
    }
}

#[derive(Default)]
struct Checklist {
    missing: Vec<String>,
    recommendations: Vec<String>,
}

fn check_module_completion(
    checklist: &mut Checklist,
    trainee: &Trainee,
    records: &TrainingRecords,
) {
    let Some(module) = trainee.active_module() else {
        checklist.missing.push("No active module found".to_string());
        return;
    };
    let module_records = records.for_module(&module.id);

    let incomplete: Vec<_> = module_records
        .internships
        .iter()
        .filter(|i| !i.is_completed())
        .collect();
    if !incomplete.is_empty() {
        checklist
            .missing
            .push(format!("{} incomplete internships", incomplete.len()));
        for internship in incomplete.iter().take(MAX_INTERNSHIP_RECOMMENDATIONS) {
            checklist
                .recommendations
                .push(format!("Complete internship at {}", internship.department));
        }
    }

    let thresholds = procedure_thresholds(module.module_type);
    let count = |role: OperatorRole| {
        module_records
            .procedures
            .iter()
            .filter(|p| p.operator_role == role)
            .count()
    };
    for (label, role, required) in [
        ("A", OperatorRole::A, thresholds.type_a),
        ("B", OperatorRole::B, thresholds.type_b),
        ("C", OperatorRole::C, thresholds.type_c),
    ] {
        let done = count(role);
        if done < required {
            checklist
                .missing
                .push(format!("Type {} procedures: {}/{}", label, done, required));
        }
    }

    let incomplete_courses = module_records
        .courses
        .iter()
        .filter(|c| !c.is_completed)
        .count();
    if incomplete_courses > 0 {
        checklist
            .missing
            .push(format!("{} incomplete courses", incomplete_courses));
    }

    let total_hours: Decimal = module_records.shifts.iter().map(|s| s.hours()).sum();
    let required_hours = required_module_hours(module.module_type);
    if total_hours < required_hours {
        checklist.missing.push(format!(
            "Insufficient hours: {}/{}",
            total_hours.round_dp(2).normalize(),
            required_hours
        ));
        checklist.recommendations.push(format!(
            "Complete {} more hours",
            (required_hours - total_hours).round_dp(2).normalize()
        ));
    }
}

fn check_specialization_final(
    checklist: &mut Checklist,
    trainee: &Trainee,
    records: &TrainingRecords,
    now: NaiveDateTime,
) {
    let incomplete_modules = trainee.modules.iter().filter(|m| !m.is_complete()).count();
    if incomplete_modules > 0 {
        checklist
            .missing
            .push(format!("{} incomplete modules", incomplete_modules));
        return;
    }

    let started = trainee.specialization.start_date.and_time(NaiveTime::MIN);
    let elapsed = now - started;
    let minimum = TimeDelta::days(i64::from(trainee.specialization.required_years) * 365);
    if elapsed < minimum {
        checklist.missing.push(format!(
            "Insufficient specialization duration (need {} more days)",
            (minimum - elapsed).num_days()
        ));
    }

    let quality = calculate_quality_metrics(&trainee.id, records, now, Uuid::nil());
    if quality.overall_quality_score < MIN_EXAM_QUALITY_SCORE {
        checklist.missing.push(format!(
            "Quality score below threshold: {:.1}/{}",
            quality.overall_quality_score, MIN_EXAM_QUALITY_SCORE
        ));
        checklist.recommendations.extend(quality.recommendations);
    }

    let compliance = generate_compliance_report(trainee, records, now, Uuid::nil());
    if compliance.has_issue_at_least(IssueSeverity::High) {
        checklist
            .missing
            .push("Outstanding compliance issues must be resolved".to_string());
        checklist.recommendations.extend(compliance.recommendations);
    }
}

fn check_pes(
    checklist: &mut Checklist,
    trainee: &Trainee,
    records: &TrainingRecords,
    now: NaiveDateTime,
) {
    check_specialization_final(checklist, trainee, records, now);

    if !trainee.has_registration_number() {
        checklist
            .missing
            .push("SMK registration number required".to_string());
    }

    if records.publications.is_empty() {
        checklist
            .missing
            .push("At least one publication required for PES".to_string());
        checklist
            .recommendations
            .push("Submit a case study or research article for publication".to_string());
    }

    let self_education_hours: Decimal = records.self_education.iter().map(|e| e.hours).sum();
    if self_education_hours < MIN_PES_SELF_EDUCATION_HOURS {
        checklist.missing.push(format!(
            "Insufficient self-education hours: {}/{}",
            self_education_hours.normalize(),
            MIN_PES_SELF_EDUCATION_HOURS
        ));
    }
}

/// Estimated readiness in percent.
///
/// 100 when nothing is missing, otherwise the share of the exam's
/// [`requirement slots`](ExamType::requirement_slots) not taken by a
/// missing requirement, floored at 0.
///
/// # Example
///
/// ```
/// use residency_engine::calculation::readiness_percentage;
/// use residency_engine::models::ExamType;
/// use rust_decimal::Decimal;
///
/// assert_eq!(readiness_percentage(ExamType::ModuleCompletion, 0), Decimal::ONE_HUNDRED);
/// assert_eq!(readiness_percentage(ExamType::ModuleCompletion, 3), Decimal::from(70));
/// assert_eq!(readiness_percentage(ExamType::ModuleCompletion, 12), Decimal::ZERO);
/// ```
pub fn readiness_percentage(exam_type: ExamType, missing: usize) -> Decimal {
    if missing == 0 {
        return Decimal::ONE_HUNDRED;
    }
    let slots = Decimal::from(exam_type.requirement_slots());
    let met = slots - Decimal::from(missing);
    (met / slots * Decimal::ONE_HUNDRED).max(Decimal::ZERO)
}

/// Checks whether a trainee is ready for an examination.
///
/// Module completion percentages are read from `trainee.modules` and must
/// already be derived. Quality and compliance checks of the final tiers
/// are evaluated at `now`.
///
/// # Arguments
///
/// * `trainee` - The trainee, with module completion filled in
/// * `records` - The trainee's full training records
/// * `exam_type` - The examination to check
/// * `now` - The instant the check is evaluated for
/// * `readiness_id` - Identifier stamped on the snapshot
pub fn check_examination_readiness(
    trainee: &Trainee,
    records: &TrainingRecords,
    exam_type: ExamType,
    now: NaiveDateTime,
    readiness_id: Uuid,
) -> ExaminationReadiness {
    let mut checklist = Checklist::default();

    match exam_type {
        ExamType::ModuleCompletion => check_module_completion(&mut checklist, trainee, records),
        ExamType::SpecializationFinal => {
            check_specialization_final(&mut checklist, trainee, records, now)
        }
        ExamType::Pes => check_pes(&mut checklist, trainee, records, now),
    }

    let is_ready = checklist.missing.is_empty();
    let readiness_percentage = readiness_percentage(exam_type, checklist.missing.len());

    debug!(
        trainee_id = %trainee.id,
        ?exam_type,
        missing = checklist.missing.len(),
        %readiness_percentage,
        "Checked examination readiness"
    );

    ExaminationReadiness {
        readiness_id,
        trainee_id: trainee.id.clone(),
        exam_type,
        checked_at: now,
        is_ready,
        readiness_percentage,
        missing_requirements: checklist.missing,
        recommendations: checklist.recommendations,
    }
}
