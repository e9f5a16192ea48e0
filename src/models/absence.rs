//! Absence model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of absence recorded against a specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceType {
    /// Sick leave.
    Sick,
    /// Maternity leave.
    Maternity,
    /// Parental leave.
    Parental,
    /// Annual vacation.
    Vacation,
    /// Recognition of prior training, shortening the program.
    Recognition,
    /// Leave granted for self-education.
    SelfEducationLeave,
    /// Special leave.
    Special,
    /// Unpaid leave.
    Unpaid,
    /// Anything else.
    Other,
}

/// How an absence moves the planned end of the specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndDateEffect {
    /// Every absence day pushes the end date one day later.
    Extends,
    /// Every absence day pulls the end date one day earlier.
    Reduces,
    /// The end date is unaffected.
    Neutral,
}

impl AbsenceType {
    /// Returns the effect this absence type has on the program end date.
    pub fn end_date_effect(self) -> EndDateEffect {
        match self {
            AbsenceType::Sick | AbsenceType::Maternity => EndDateEffect::Extends,
            AbsenceType::Recognition => EndDateEffect::Reduces,
            AbsenceType::Vacation
            | AbsenceType::Parental
            | AbsenceType::SelfEducationLeave
            | AbsenceType::Special
            | AbsenceType::Unpaid
            | AbsenceType::Other => EndDateEffect::Neutral,
        }
    }
}

/// An absence interval, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    /// Unique identifier for the absence.
    pub id: String,
    /// The kind of absence.
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    /// First day of the absence.
    pub start_date: NaiveDate,
    /// Last day of the absence.
    pub end_date: NaiveDate,
}

impl Absence {
    /// Returns the number of calendar days covered, counting both ends.
    ///
    /// # Examples
    ///
    /// ```
    /// use residency_engine::models::{Absence, AbsenceType};
    /// use chrono::NaiveDate;
    ///
    /// let absence = Absence {
    ///     id: "abs_001".to_string(),
    ///     absence_type: AbsenceType::Sick,
    ///     start_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
    /// };
    /// assert_eq!(absence.day_count(), 10);
    /// ```
    pub fn day_count(&self) -> i64 {
        ((self.end_date - self.start_date).num_days() + 1).max(0)
    }

    /// Returns true if the absence pushes the program end date later.
    pub fn extends_specialization(&self) -> bool {
        self.absence_type.end_date_effect() == EndDateEffect::Extends
    }

    /// Returns true if the two absences share at least one day.
    pub fn overlaps_with(&self, other: &Absence) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }
}
