//! Core data models for the residency rules engine.
//!
//! Input records are read-only views handed in by the caller; output
//! snapshots are built fresh on every invocation.

mod absence;
mod compliance;
mod progress;
mod projection;
mod quality;
mod readiness;
mod shift;
mod trainee;
mod training;

pub use absence::{Absence, AbsenceType, EndDateEffect};
pub use compliance::{
    AuditStep, ComplianceIssue, ComplianceIssueType, ComplianceReport, IssueSeverity,
};
pub use progress::{CategoryProgress, HoursProgress, ProgressStatistics};
pub use projection::{CompletionProjection, RiskFactor};
pub use quality::QualityMetrics;
pub use readiness::{ExamType, ExaminationReadiness};
pub use shift::{Shift, ShiftDuration, TimeWindow};
pub use trainee::{Module, ModuleType, Specialization, Trainee};
pub use training::{
    Course, Internship, InternshipStatus, MAX_IMPACT_SCORE, OperatorRole, Partition, Procedure,
    Publication, PublicationType, RecordTags, SelfEducation, Tagged, UNASSIGNED_PARTITION,
};
