//! Compliance report models.
//!
//! This module contains the [`ComplianceReport`] type and its associated
//! structures: the issues found, their severities, and the audit steps
//! recording every rule that was evaluated.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of compliance problem detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceIssueType {
    /// Fewer duty hours than the monthly minimum near month end.
    InsufficientHours,
    /// An internship ran past its end date without being completed.
    OverdueInternship,
    /// The specialist module started before the basic module finished.
    InvalidModuleProgression,
}

/// How serious a compliance issue is.
///
/// Severities are ordered, so `High >= High` and `Critical > High`.
///
/// # Example
///
/// ```
/// use residency_engine::models::IssueSeverity;
///
/// assert!(IssueSeverity::Critical > IssueSeverity::High);
/// assert_eq!(IssueSeverity::Medium.deduction(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Minor.
    Low,
    /// Should be looked at.
    Medium,
    /// Blocks exam admission.
    High,
    /// Breaks program rules outright.
    Critical,
}

impl IssueSeverity {
    /// Points subtracted from the compliance score per issue.
    pub fn deduction(self) -> u32 {
        match self {
            IssueSeverity::Critical => 30,
            IssueSeverity::High => 20,
            IssueSeverity::Medium => 10,
            IssueSeverity::Low => 5,
        }
    }
}

/// A single compliance problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    /// The kind of issue.
    #[serde(rename = "type")]
    pub issue_type: ComplianceIssueType,
    /// How serious it is.
    pub severity: IssueSeverity,
    /// Human-readable description.
    pub description: String,
    /// The period the issue refers to (e.g. "2025-03", "Since 2025-02-28").
    pub affected_period: String,
}

/// A single step in the audit trail recording a rule evaluation.
///
/// Each step captures the input, output, and reasoning for a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The result of a point-in-time compliance check.
///
/// # Example
///
/// ```
/// use residency_engine::models::ComplianceReport;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let report = ComplianceReport {
///     report_id: Uuid::new_v4(),
///     trainee_id: "tr_001".to_string(),
///     generated_at: NaiveDate::from_ymd_opt(2025, 3, 28).unwrap().and_hms_opt(9, 0, 0).unwrap(),
///     issues: vec![],
///     overall_score: 100,
///     is_compliant: true,
///     recommendations: vec![],
///     audit_steps: vec![],
/// };
/// assert!(report.is_compliant);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Unique identifier for this report.
    pub report_id: Uuid,
    /// The trainee the report is for.
    pub trainee_id: String,
    /// The instant the report was evaluated for.
    pub generated_at: NaiveDateTime,
    /// Issues found.
    pub issues: Vec<ComplianceIssue>,
    /// Score from 0 to 100.
    pub overall_score: u32,
    /// True when the score is at least the compliance threshold.
    pub is_compliant: bool,
    /// Suggested remedial actions.
    pub recommendations: Vec<String>,
    /// Every rule evaluated, in order.
    pub audit_steps: Vec<AuditStep>,
}

impl ComplianceReport {
    /// Returns true if any issue is at least `severity`.
    pub fn has_issue_at_least(&self, severity: IssueSeverity) -> bool {
        self.issues.iter().any(|issue| issue.severity >= severity)
    }
}
