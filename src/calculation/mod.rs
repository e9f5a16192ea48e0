//! Calculation logic for the residency rules engine.
//!
//! This module contains the pure rule functions: specialization end dates
//! and working days, progress aggregation against requirement templates,
//! the weighted overall progress score, duty hour limits for new shifts,
//! internship ordering, compliance reports, quality scoring, examination
//! readiness and completion projections.

mod compliance_report;
mod date_calculator;
mod exam_readiness;
mod overall_progress;
mod progress_aggregator;
mod projection;
mod quality_score;
mod sequence;
mod shift_limits;

pub use compliance_report::{
    COMPLIANCE_THRESHOLD, MONTH_END_WINDOW_DAYS, compliance_score, generate_compliance_report,
};
pub use date_calculator::{
    absence_adjustment_days, calculate_specialization_end_date, calculate_working_days,
    find_overlapping_absences,
};
pub use exam_readiness::{
    MIN_EXAM_QUALITY_SCORE, MIN_PES_SELF_EDUCATION_HOURS, ProcedureThresholds,
    check_examination_readiness, procedure_thresholds, readiness_percentage,
    required_module_hours,
};
pub use overall_progress::{
    COURSE_WEIGHT, INTERNSHIP_WEIGHT, OTHER_CONTRIBUTION, OverallProgressInput, PROCEDURE_WEIGHT,
    compute_overall_progress,
};
pub use progress_aggregator::{
    ProgressCategory, compute_category_progress, compute_progress_by_category,
    compute_progress_by_partition, compute_progress_by_stage, compute_progress_by_year,
    compute_statistics, module_completion_percentage, with_module_completion,
};
pub use projection::{
    ABSENCE_FACTOR_WEIGHT, EXTENSION_RISK_DAYS, INTERVENTION_PROBABILITY, LOW_PROGRESS_THRESHOLD,
    LOW_QUALITY_THRESHOLD, MAX_ABSENCES_WITHOUT_RISK, PROGRESS_FACTOR_WEIGHT,
    ProjectionInput, QUALITY_FACTOR_WEIGHT, TIME_FACTOR_WEIGHT, completion_probability,
    expected_progress, project_completion,
};
pub use quality_score::{
    LEARNING_CONSISTENCY_WEIGHT, PROCEDURE_DIVERSITY_WEIGHT, PUBLICATION_QUALITY_WEIGHT,
    PUBLICATION_RECOMMENDATION_THRESHOLD, QUALITY_RECOMMENDATION_THRESHOLD,
    SHIFT_REGULARITY_WEIGHT, calculate_quality_metrics, learning_consistency_score,
    procedure_diversity_score, publication_quality_score, shift_regularity_score,
};
pub use sequence::validate_internship_sequence;
pub use shift_limits::{
    MAX_CONSECUTIVE_HOURS, MAX_DAILY_HOURS, MAX_WEEKLY_HOURS, MIN_MONTHLY_HOURS, validate_shift,
    week_window, weekly_hours,
};
