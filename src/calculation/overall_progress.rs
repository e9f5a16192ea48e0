//! Weighted overall progress.
//!
//! Internships, courses and procedures are weighted against each other and
//! a fixed contribution is always added on top.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::CategoryProgress;

/// Weight of the internship ratio (0.35).
pub const INTERNSHIP_WEIGHT: Decimal = Decimal::from_parts(35, 0, 0, false, 2);

/// Weight of the course ratio (0.25).
pub const COURSE_WEIGHT: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Weight of the procedure ratio (0.30).
pub const PROCEDURE_WEIGHT: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Contribution always added for everything not measured here (0.10).
pub const OTHER_CONTRIBUTION: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// The category counts the overall score is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverallProgressInput {
    /// Completed against required internships.
    pub internships: CategoryProgress,
    /// Completed against required courses.
    pub courses: CategoryProgress,
    /// Procedures performed as operator.
    pub procedures_a: CategoryProgress,
    /// Procedures assisted.
    pub procedures_b: CategoryProgress,
}

/// `completed / required` clamped to `[0, 1]`.
///
/// Nothing required counts as no progress here, unlike
/// [`CategoryProgress::percentage`] which treats it as complete.
fn ratio(progress: CategoryProgress) -> Decimal {
    if progress.required == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(progress.completed) / Decimal::from(progress.required))
        .clamp(Decimal::ZERO, Decimal::ONE)
}

/// Combines category counts into one score between 0 and 1.
///
/// The procedure term is the average of the operator and assistant
/// ratios. The result is never below [`OTHER_CONTRIBUTION`].
///
/// # Examples
///
/// ```
/// use residency_engine::calculation::{compute_overall_progress, OverallProgressInput};
/// use residency_engine::models::CategoryProgress;
/// use rust_decimal::Decimal;
///
/// let empty = OverallProgressInput::default();
/// assert_eq!(compute_overall_progress(&empty), Decimal::new(10, 2));
///
/// let input = OverallProgressInput {
///     internships: CategoryProgress::new(5, 3),
///     courses: CategoryProgress::new(3, 2),
///     procedures_a: CategoryProgress::new(20, 10),
///     procedures_b: CategoryProgress::new(10, 5),
/// };
/// let score = compute_overall_progress(&input);
/// assert!((score - Decimal::new(6267, 4)).abs() < Decimal::new(1, 4));
/// ```
pub fn compute_overall_progress(input: &OverallProgressInput) -> Decimal {
    let internships = ratio(input.internships);
    let courses = ratio(input.courses);
    let procedures = (ratio(input.procedures_a) + ratio(input.procedures_b)) / Decimal::TWO;

    let score = internships * INTERNSHIP_WEIGHT
        + courses * COURSE_WEIGHT
        + procedures * PROCEDURE_WEIGHT
        + OTHER_CONTRIBUTION;

    debug!(%internships, %courses, %procedures, %score, "Computed overall progress");

    score.clamp(Decimal::ZERO, Decimal::ONE)
}
