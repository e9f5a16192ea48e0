//! Point-in-time compliance report generation.
//!
//! Three checks run in order (monthly duty hours, overdue internships,
//! module progression), each recording an [`AuditStep`]. Issues are then
//! scored by severity into a 0 to 100 compliance score.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    AuditStep, ComplianceIssue, ComplianceIssueType, ComplianceReport, IssueSeverity, ModuleType,
    Trainee,
};
use crate::records::TrainingRecords;

use super::shift_limits::MIN_MONTHLY_HOURS;

/// Score at or above which a trainee is compliant.
pub const COMPLIANCE_THRESHOLD: u32 = 80;

/// Days before month end from which a monthly hour shortfall is reported.
pub const MONTH_END_WINDOW_DAYS: i64 = 7;

/// Collects issues, recommendations and audit steps while checks run.
struct ReportBuilder {
    issues: Vec<ComplianceIssue>,
    recommendations: Vec<String>,
    audit_steps: Vec<AuditStep>,
}

impl ReportBuilder {
    fn new() -> Self {
        Self {
            issues: Vec::new(),
            recommendations: Vec::new(),
            audit_steps: Vec::new(),
        }
    }

    fn record_step(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        let step_number = self.audit_steps.len() as u32 + 1;
        self.audit_steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }
}

fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let month_start = date.with_day(1).unwrap_or(date);
    let next_month_start = month_start
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    (month_start, next_month_start)
}

fn check_monthly_hours(
    builder: &mut ReportBuilder,
    records: &TrainingRecords,
    as_of: NaiveDateTime,
) {
    let (month_start, next_month_start) = month_bounds(as_of.date());
    let monthly_hours: Decimal = records
        .approved_shifts()
        .filter(|s| s.date() >= month_start && s.date() < next_month_start)
        .map(|s| s.hours())
        .sum();
    let monthly_hours = monthly_hours.normalize();

    let window_start =
        (next_month_start - TimeDelta::days(MONTH_END_WINDOW_DAYS)).and_time(NaiveTime::MIN);
    let in_window = as_of >= window_start;
    let short = monthly_hours < MIN_MONTHLY_HOURS;
    let period = month_start.format("%Y-%m").to_string();

    if short && in_window {
        let shortfall = (MIN_MONTHLY_HOURS - monthly_hours).normalize();
        builder.issues.push(ComplianceIssue {
            issue_type: ComplianceIssueType::InsufficientHours,
            severity: IssueSeverity::High,
            description: format!(
                "Monthly hours ({}h) below minimum requirement ({}h)",
                monthly_hours, MIN_MONTHLY_HOURS
            ),
            affected_period: period.clone(),
        });
        builder.recommendations.push(format!(
            "Schedule additional {} hours before month end",
            shortfall
        ));
    }

    let reasoning = match (short, in_window) {
        (false, _) => format!(
            "{}h meets the {}h monthly minimum",
            monthly_hours, MIN_MONTHLY_HOURS
        ),
        (true, false) => format!(
            "{}h is below {}h but the month has more than {} days left",
            monthly_hours, MIN_MONTHLY_HOURS, MONTH_END_WINDOW_DAYS
        ),
        (true, true) => format!(
            "{}h is below {}h within the last {} days of the month",
            monthly_hours, MIN_MONTHLY_HOURS, MONTH_END_WINDOW_DAYS
        ),
    };
    builder.record_step(
        "monthly_hours_check",
        "Monthly Duty Hours",
        json!({
            "period": period,
            "as_of": as_of.to_string(),
            "minimum_hours": MIN_MONTHLY_HOURS.to_string(),
        }),
        json!({
            "monthly_hours": monthly_hours.to_string(),
            "issue_raised": short && in_window,
        }),
        reasoning,
    );
}

fn check_overdue_internships(
    builder: &mut ReportBuilder,
    records: &TrainingRecords,
    as_of: NaiveDateTime,
) {
    let today = as_of.date();
    let mut overdue = Vec::new();

    for internship in records.internships.iter().filter(|i| i.is_active()) {
        if internship.end_date < today && !internship.is_completed() {
            builder.issues.push(ComplianceIssue {
                issue_type: ComplianceIssueType::OverdueInternship,
                severity: IssueSeverity::High,
                description: format!("Internship '{}' is overdue", internship.department),
                affected_period: format!("Since {}", internship.end_date.format("%Y-%m-%d")),
            });
            overdue.push(internship.id.clone());
        }
    }

    let reasoning = if overdue.is_empty() {
        "No active internship is past its end date".to_string()
    } else {
        format!("{} internship(s) past their end date and not completed", overdue.len())
    };
    builder.record_step(
        "overdue_internships_check",
        "Overdue Internships",
        json!({
            "as_of": today.to_string(),
            "internships": records.internships.len(),
        }),
        json!({ "overdue": overdue }),
        reasoning,
    );
}

fn check_module_progression(builder: &mut ReportBuilder, trainee: &Trainee) {
    let basic = trainee.module_of_type(ModuleType::Basic);
    let specialist = trainee.module_of_type(ModuleType::Specialist);

    let violated = match (basic, specialist) {
        (Some(basic), Some(specialist)) => specialist.is_active && !basic.is_complete(),
        _ => false,
    };

    if violated {
        builder.issues.push(ComplianceIssue {
            issue_type: ComplianceIssueType::InvalidModuleProgression,
            severity: IssueSeverity::Critical,
            description: "Specialist module active while basic module incomplete".to_string(),
            affected_period: "Current".to_string(),
        });
        builder
            .recommendations
            .push("Complete basic module before progressing to specialist module".to_string());
    }

    let reasoning = if violated {
        "Specialist module started before the basic module reached 100%".to_string()
    } else {
        "Module order respected".to_string()
    };
    builder.record_step(
        "module_progression_check",
        "Module Progression",
        json!({
            "basic_completion": basic.map(|m| m.completion_percentage.to_string()),
            "specialist_active": specialist.map(|m| m.is_active),
        }),
        json!({ "issue_raised": violated }),
        reasoning,
    );
}

/// Scores a list of issues: 100 minus each issue's severity deduction,
/// never below 0.
///
/// # Example
///
/// ```
/// use residency_engine::calculation::compliance_score;
/// use residency_engine::models::{ComplianceIssue, ComplianceIssueType, IssueSeverity};
///
/// let critical = ComplianceIssue {
///     issue_type: ComplianceIssueType::InvalidModuleProgression,
///     severity: IssueSeverity::Critical,
///     description: "Specialist module active while basic module incomplete".to_string(),
///     affected_period: "Current".to_string(),
/// };
/// assert_eq!(compliance_score(&[critical.clone()]), 70);
/// assert_eq!(compliance_score(&vec![critical; 5]), 0);
/// ```
pub fn compliance_score(issues: &[ComplianceIssue]) -> u32 {
    let deductions = issues
        .iter()
        .fold(0u32, |sum, issue| sum.saturating_add(issue.severity.deduction()));
    100u32.saturating_sub(deductions)
}

/// Generates a compliance report as of the given instant.
///
/// Module completion percentages are read from `trainee.modules` and must
/// already be derived (see
/// [`with_module_completion`](super::with_module_completion)).
///
/// # Arguments
///
/// * `trainee` - The trainee, with module completion filled in
/// * `records` - The trainee's full training records
/// * `as_of` - The instant the report is evaluated for
/// * `report_id` - Identifier stamped on the report
pub fn generate_compliance_report(
    trainee: &Trainee,
    records: &TrainingRecords,
    as_of: NaiveDateTime,
    report_id: Uuid,
) -> ComplianceReport {
    let mut builder = ReportBuilder::new();

    check_monthly_hours(&mut builder, records, as_of);
    check_overdue_internships(&mut builder, records, as_of);
    check_module_progression(&mut builder, trainee);

    let overall_score = compliance_score(&builder.issues);
    let is_compliant = overall_score >= COMPLIANCE_THRESHOLD;

    builder.record_step(
        "compliance_score",
        "Compliance Score",
        json!({
            "issues": builder
                .issues
                .iter()
                .map(|i| json!({ "severity": i.severity, "deduction": i.severity.deduction() }))
                .collect::<Vec<_>>(),
        }),
        json!({ "overall_score": overall_score, "is_compliant": is_compliant }),
        format!(
            "Score {} is {} the compliance threshold of {}",
            overall_score,
            if is_compliant { "at or above" } else { "below" },
            COMPLIANCE_THRESHOLD
        ),
    );

    debug!(
        trainee_id = %trainee.id,
        issues = builder.issues.len(),
        score = overall_score,
        is_compliant,
        "Generated compliance report"
    );

    ComplianceReport {
        report_id,
        trainee_id: trainee.id.clone(),
        generated_at: as_of,
        issues: builder.issues,
        overall_score,
        is_compliant,
        recommendations: builder.recommendations,
        audit_steps: builder.audit_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Internship, InternshipStatus, Module, RecordTags, Shift, ShiftDuration, Specialization,
    };

    fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_instant(y: i32, m: u32, d: u32) -> NaiveDateTime {
        make_date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
    }

    fn make_module(id: &str, module_type: ModuleType, is_active: bool, completion: i64) -> Module {
        Module {
            id: id.to_string(),
            template_code: id.to_string(),
            name: id.to_string(),
            module_type,
            is_active,
            completion_percentage: Decimal::from(completion),
        }
    }

    fn create_test_trainee(modules: Vec<Module>) -> Trainee {
        Trainee {
            id: "tr_001".to_string(),
            name: "Jan Kowalski".to_string(),
            specialization: Specialization {
                program_code: "cardiology".to_string(),
                template_version: "2023".to_string(),
                start_date: make_date(2021, 10, 1),
                required_years: 5,
                current_year: 3,
                registration_number: None,
            },
            modules,
        }
    }

    fn make_shift(id: &str, date: NaiveDate, hours: u32, is_approved: bool) -> Shift {
        Shift {
            id: id.to_string(),
            start: date.and_hms_opt(8, 0, 0).unwrap(),
            duration: ShiftDuration::new(hours, 0),
            internship_id: "int_001".to_string(),
            module_id: None,
            is_approved,
        }
    }

    fn make_internship(id: &str, end_date: NaiveDate, status: InternshipStatus) -> Internship {
        Internship {
            id: id.to_string(),
            template_code: None,
            module_id: "basic".to_string(),
            module_type: ModuleType::Basic,
            department: "Cardiology".to_string(),
            start_date: make_date(2024, 10, 1),
            end_date,
            status,
            working_days: 60,
            tags: RecordTags::default(),
        }
    }

    fn report_at(
        trainee: &Trainee,
        records: &TrainingRecords,
        as_of: NaiveDateTime,
    ) -> ComplianceReport {
        generate_compliance_report(trainee, records, as_of, Uuid::nil())
    }

    /// Report for a trainee without modules.
    fn moduleless_report(records: &TrainingRecords, as_of: NaiveDateTime) -> ComplianceReport {
        report_at(&create_test_trainee(vec![]), records, as_of)
    }

    /// 168 approved hours in March 2025.
    fn full_month_of_shifts() -> Vec<Shift> {
        (1..=14)
            .map(|day| make_shift(&format!("s{}", day), make_date(2025, 3, day), 12, true))
            .collect()
    }

    #[test]
    fn test_clean_report_scores_one_hundred() {
        let records = TrainingRecords {
            shifts: full_month_of_shifts(),
            ..TrainingRecords::default()
        };
        let report = moduleless_report(&records, make_instant(2025, 3, 28));

        assert!(report.issues.is_empty());
        assert_eq!(report.overall_score, 100);
        assert!(report.is_compliant);
        assert_eq!(report.audit_steps.len(), 4);
        assert_eq!(report.audit_steps[3].rule_id, "compliance_score");
    }

    #[test]
    fn test_monthly_shortfall_near_month_end() {
        let records = TrainingRecords {
            shifts: vec![
                make_shift("s1", make_date(2025, 3, 3), 12, true),
                make_shift("s2", make_date(2025, 3, 4), 12, false),
                make_shift("s3", make_date(2025, 2, 27), 12, true),
            ],
            ..TrainingRecords::default()
        };
        let report = moduleless_report(&records, make_instant(2025, 3, 28));

        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.issue_type, ComplianceIssueType::InsufficientHours);
        assert_eq!(issue.severity, IssueSeverity::High);
        assert_eq!(
            issue.description,
            "Monthly hours (12h) below minimum requirement (160h)"
        );
        assert_eq!(issue.affected_period, "2025-03");
        assert_eq!(
            report.recommendations,
            vec!["Schedule additional 148 hours before month end"]
        );
        assert_eq!(report.overall_score, 80);
        assert!(report.is_compliant);
    }

    #[test]
    fn test_monthly_shortfall_ignored_early_in_month() {
        let report = moduleless_report(&TrainingRecords::default(), make_instant(2025, 3, 10));
        assert!(report.issues.is_empty());
        assert_eq!(report.audit_steps[0].output["issue_raised"], json!(false));
    }

    #[test]
    fn test_month_end_window_starts_seven_days_before_next_month() {
        let trainee = create_test_trainee(vec![]);
        let records = TrainingRecords::default();

        let before = make_date(2025, 2, 21).and_hms_opt(23, 59, 59).unwrap();
        assert!(report_at(&trainee, &records, before).issues.is_empty());

        let start = make_date(2025, 2, 22).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(report_at(&trainee, &records, start).issues.len(), 1);
    }

    #[test]
    fn test_overdue_internship() {
        let records = TrainingRecords {
            shifts: full_month_of_shifts(),
            internships: vec![
                make_internship("i1", make_date(2025, 2, 28), InternshipStatus::InProgress),
                make_internship("i2", make_date(2025, 2, 28), InternshipStatus::Completed),
                make_internship("i3", make_date(2025, 2, 28), InternshipStatus::Cancelled),
                make_internship("i4", make_date(2025, 3, 28), InternshipStatus::InProgress),
            ],
            ..TrainingRecords::default()
        };
        let report = moduleless_report(&records, make_instant(2025, 3, 28));

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].description, "Internship 'Cardiology' is overdue");
        assert_eq!(report.issues[0].affected_period, "Since 2025-02-28");
        assert_eq!(report.overall_score, 80);
    }

    #[test]
    fn test_specialist_before_basic_is_critical() {
        let trainee = create_test_trainee(vec![
            make_module("basic", ModuleType::Basic, false, 90),
            make_module("specialist", ModuleType::Specialist, true, 5),
        ]);
        let records = TrainingRecords {
            shifts: full_month_of_shifts(),
            ..TrainingRecords::default()
        };
        let report = report_at(&trainee, &records, make_instant(2025, 3, 28));

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, IssueSeverity::Critical);
        assert_eq!(report.overall_score, 70);
        assert!(!report.is_compliant);
        assert_eq!(
            report.recommendations,
            vec!["Complete basic module before progressing to specialist module"]
        );
    }

    #[test]
    fn test_completed_basic_allows_specialist() {
        let trainee = create_test_trainee(vec![
            make_module("basic", ModuleType::Basic, false, 100),
            make_module("specialist", ModuleType::Specialist, true, 5),
        ]);
        let records = TrainingRecords {
            shifts: full_month_of_shifts(),
            ..TrainingRecords::default()
        };
        assert!(
            report_at(&trainee, &records, make_instant(2025, 3, 28))
                .issues
                .is_empty()
        );
    }

    #[test]
    fn test_score_never_below_zero() {
        let trainee = create_test_trainee(vec![
            make_module("basic", ModuleType::Basic, false, 10),
            make_module("specialist", ModuleType::Specialist, true, 5),
        ]);
        let records = TrainingRecords {
            internships: (0..6)
                .map(|n| {
                    make_internship(
                        &format!("i{}", n),
                        make_date(2025, 1, 31),
                        InternshipStatus::InProgress,
                    )
                })
                .collect(),
            ..TrainingRecords::default()
        };
        let report = report_at(&trainee, &records, make_instant(2025, 3, 28));

        assert_eq!(report.issues.len(), 8);
        assert_eq!(report.overall_score, 0);
        assert!(!report.is_compliant);
    }

    #[test]
    fn test_audit_steps_are_numbered_in_order() {
        let report = moduleless_report(&TrainingRecords::default(), make_instant(2025, 3, 10));
        let numbers: Vec<u32> = report.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(report.audit_steps[0].rule_id, "monthly_hours_check");
        assert_eq!(report.audit_steps[1].rule_id, "overdue_internships_check");
        assert_eq!(report.audit_steps[2].rule_id, "module_progression_check");
    }

    #[test]
    fn test_identical_inputs_give_identical_reports() {
        let trainee = create_test_trainee(vec![
            make_module("basic", ModuleType::Basic, false, 90),
            make_module("specialist", ModuleType::Specialist, true, 5),
        ]);
        let records = TrainingRecords {
            shifts: full_month_of_shifts(),
            ..TrainingRecords::default()
        };
        let id = Uuid::new_v4();
        let as_of = make_instant(2025, 3, 28);

        let first = generate_compliance_report(&trainee, &records, as_of, id);
        let second = generate_compliance_report(&trainee, &records, as_of, id);
        assert_eq!(first, second);
        assert_eq!(first.report_id, id);
    }
}
