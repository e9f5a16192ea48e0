//! Examination readiness models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The examination tier a trainee wants to sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    /// Colloquium closing the active module.
    ModuleCompletion,
    /// Final assessment of the whole specialization.
    SpecializationFinal,
    /// State specialization examination (PES).
    Pes,
}

impl ExamType {
    /// The nominal number of requirements behind the readiness percentage.
    ///
    /// This is a fixed estimate per tier, not a count of the checks run.
    pub fn requirement_slots(self) -> u32 {
        match self {
            ExamType::ModuleCompletion => 10,
            ExamType::SpecializationFinal => 15,
            ExamType::Pes => 20,
        }
    }
}

/// Whether a trainee may sit an examination, and what is still missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExaminationReadiness {
    /// Unique identifier for this snapshot.
    pub readiness_id: Uuid,
    /// The trainee the check is for.
    pub trainee_id: String,
    /// The examination checked.
    pub exam_type: ExamType,
    /// The instant the check was evaluated for.
    pub checked_at: NaiveDateTime,
    /// True when nothing is missing.
    pub is_ready: bool,
    /// Estimated readiness from 0 to 100.
    pub readiness_percentage: Decimal,
    /// Unmet requirements.
    pub missing_requirements: Vec<String>,
    /// Suggested next steps.
    pub recommendations: Vec<String>,
}
