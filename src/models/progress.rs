//! Progress DTOs produced by the progress aggregator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Required and completed counts for one category or partition.
///
/// # Example
///
/// ```
/// use residency_engine::models::CategoryProgress;
/// use rust_decimal::Decimal;
///
/// assert_eq!(CategoryProgress::new(4, 1).percentage(), Decimal::new(25, 0));
/// // Nothing required means nothing is missing.
/// assert_eq!(CategoryProgress::new(0, 0).percentage(), Decimal::ONE_HUNDRED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryProgress {
    /// How many items the template requires.
    pub required: u32,
    /// How many items the trainee has completed.
    pub completed: u32,
}

impl CategoryProgress {
    /// Creates a progress entry.
    pub fn new(required: u32, completed: u32) -> Self {
        Self { required, completed }
    }

    /// Completion in percent, rounded to two places and capped at 100.
    ///
    /// A category with nothing required is fully satisfied.
    pub fn percentage(&self) -> Decimal {
        percentage_of(Decimal::from(self.completed), Decimal::from(self.required))
    }
}

/// Required and completed duty hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HoursProgress {
    /// Hours the template requires.
    pub required_hours: Decimal,
    /// Approved hours worked.
    pub completed_hours: Decimal,
}

impl HoursProgress {
    /// Completion in percent with the same conventions as [`CategoryProgress::percentage`].
    pub fn percentage(&self) -> Decimal {
        percentage_of(self.completed_hours, self.required_hours)
    }
}

fn percentage_of(completed: Decimal, required: Decimal) -> Decimal {
    if required <= Decimal::ZERO {
        return Decimal::ONE_HUNDRED;
    }
    (completed / required * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Full progress picture for a specialization or a single module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStatistics {
    /// "specialization" or the module code the statistics cover.
    pub scope: String,
    /// Completed internships against required internships.
    pub internships: CategoryProgress,
    /// Working days of completed internships against the program total.
    pub internship_days: CategoryProgress,
    /// Courses attended against required courses.
    pub courses: CategoryProgress,
    /// Procedures performed as operator against the requirement.
    pub procedures_a: CategoryProgress,
    /// Procedures assisted against the requirement.
    pub procedures_b: CategoryProgress,
    /// Self-education days used against days available.
    pub self_education: CategoryProgress,
    /// Publications against the required minimum.
    pub publications: CategoryProgress,
    /// Approved duty hours against the required minimum.
    pub shift_hours: HoursProgress,
    /// Calendar days of all absences.
    pub absence_days: i64,
    /// Calendar days of absences that push the end date later.
    pub absence_days_extending: i64,
    /// Weighted overall progress between 0 and 1.
    pub overall_progress: Decimal,
}
