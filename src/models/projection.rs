//! Completion projection models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something that puts on-time completion of the specialization at risk.
///
/// # Example
///
/// ```
/// use residency_engine::models::RiskFactor;
///
/// assert_eq!(RiskFactor::BehindSchedule.description(), "Behind schedule");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// Overall progress trails the share of planned time already elapsed.
    BehindSchedule,
    /// Absences push the end date more than a month later.
    SignificantExtension,
    /// More than three absences are recorded.
    HighAbsenceCount,
    /// Overall progress is below 0.6.
    LowOverallProgress,
    /// Overall quality score is below 20.
    LowQualityEngagement,
}

impl RiskFactor {
    /// Human-readable label.
    pub fn description(self) -> &'static str {
        match self {
            RiskFactor::BehindSchedule => "Behind schedule",
            RiskFactor::SignificantExtension => "Significant time extension",
            RiskFactor::HighAbsenceCount => "High number of absences",
            RiskFactor::LowOverallProgress => "Low overall progress",
            RiskFactor::LowQualityEngagement => "Low quality engagement",
        }
    }
}

/// Where a trainee's specialization is heading and how likely it is to
/// finish on time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionProjection {
    /// Unique identifier for this snapshot.
    pub projection_id: Uuid,
    /// The trainee the projection is for.
    pub trainee_id: String,
    /// The instant the projection was made for.
    pub projected_at: NaiveDateTime,
    /// End date without any absences.
    pub planned_completion_date: NaiveDate,
    /// End date after absence adjustments.
    pub estimated_completion_date: NaiveDate,
    /// Net days absences add to the program; negative when shortened.
    pub net_adjustment_days: i64,
    /// Days from today to the estimated end date, never negative.
    pub remaining_days: i64,
    /// Weighted overall progress between 0 and 1.
    pub overall_progress: Decimal,
    /// Share of the planned duration already elapsed, between 0 and 1.
    pub expected_progress: Decimal,
    /// True when overall progress is at least the expected progress.
    pub is_on_track: bool,
    /// Estimated chance of finishing, between 0 and 1.
    pub completion_probability: Decimal,
    /// Risks found, in a fixed order.
    pub risk_factors: Vec<RiskFactor>,
    /// Suggested next steps.
    pub recommendations: Vec<String>,
    /// True when a supervisor should step in.
    pub requires_intervention: bool,
}

impl CompletionProjection {
    /// Returns true if `risk` was identified.
    pub fn has_risk(&self, risk: RiskFactor) -> bool {
        self.risk_factors.contains(&risk)
    }
}
