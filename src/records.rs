//! Access to a trainee's training records.
//!
//! The engine never stores records itself. A [`RecordSource`] hands it an
//! already loaded [`TrainingRecords`] snapshot, and every rule works on
//! that snapshot in memory.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{
    Absence, Course, Internship, Procedure, Publication, SelfEducation, Shift, Trainee,
};

/// Everything recorded for one trainee at the time of loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecords {
    /// Internship placements.
    #[serde(default)]
    pub internships: Vec<Internship>,
    /// Courses.
    #[serde(default)]
    pub courses: Vec<Course>,
    /// Logged procedures.
    #[serde(default)]
    pub procedures: Vec<Procedure>,
    /// Duty shifts.
    #[serde(default)]
    pub shifts: Vec<Shift>,
    /// Self-education activities.
    #[serde(default)]
    pub self_education: Vec<SelfEducation>,
    /// Publications.
    #[serde(default)]
    pub publications: Vec<Publication>,
    /// Absences.
    #[serde(default)]
    pub absences: Vec<Absence>,
}

impl TrainingRecords {
    /// Narrows the snapshot to the records of one module.
    ///
    /// Procedures and shifts without a module id are attributed through
    /// the internship they were logged under. Publications and absences
    /// belong to the whole program and are kept as they are.
    ///
    /// # Example
    ///
    /// ```
    /// use residency_engine::records::TrainingRecords;
    ///
    /// let records = TrainingRecords::default();
    /// assert!(records.for_module("basic").internships.is_empty());
    /// ```
    pub fn for_module(&self, module_id: &str) -> TrainingRecords {
        let internships: Vec<Internship> = self
            .internships
            .iter()
            .filter(|i| i.module_id == module_id)
            .cloned()
            .collect();
        let internship_ids: HashSet<&str> = internships.iter().map(|i| i.id.as_str()).collect();

        let in_module = |module: &Option<String>| module.as_deref() == Some(module_id);

        TrainingRecords {
            courses: self
                .courses
                .iter()
                .filter(|c| in_module(&c.module_id))
                .cloned()
                .collect(),
            procedures: self
                .procedures
                .iter()
                .filter(|p| match &p.module_id {
                    Some(id) => id == module_id,
                    None => p
                        .internship_id
                        .as_deref()
                        .is_some_and(|id| internship_ids.contains(id)),
                })
                .cloned()
                .collect(),
            shifts: self
                .shifts
                .iter()
                .filter(|s| match &s.module_id {
                    Some(id) => id == module_id,
                    None => internship_ids.contains(s.internship_id.as_str()),
                })
                .cloned()
                .collect(),
            self_education: self
                .self_education
                .iter()
                .filter(|e| in_module(&e.module_id))
                .cloned()
                .collect(),
            publications: self.publications.clone(),
            absences: self.absences.clone(),
            internships,
        }
    }

    /// Finds an internship by id.
    pub fn internship(&self, id: &str) -> Option<&Internship> {
        self.internships.iter().find(|i| i.id == id)
    }

    /// Returns the shifts a supervisor has approved.
    pub fn approved_shifts(&self) -> impl Iterator<Item = &Shift> {
        self.shifts.iter().filter(|s| s.is_approved)
    }
}

/// Read access to trainees and their records, so the engine can be
/// exercised without a database.
pub trait RecordSource: Send + Sync {
    /// Loads a trainee, or `None` if the id is unknown.
    fn trainee(&self, trainee_id: &str) -> EngineResult<Option<Trainee>>;

    /// Loads every training record of a trainee.
    fn records(&self, trainee_id: &str) -> EngineResult<TrainingRecords>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InternshipStatus, ModuleType, OperatorRole, RecordTags, ShiftDuration};
    use chrono::NaiveDate;

    fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_internship(id: &str, module_id: &str) -> Internship {
        Internship {
            id: id.to_string(),
            template_code: None,
            module_id: module_id.to_string(),
            module_type: ModuleType::Basic,
            department: "Internal medicine".to_string(),
            start_date: make_date(2024, 1, 1),
            end_date: make_date(2024, 6, 30),
            status: InternshipStatus::InProgress,
            working_days: 120,
            tags: RecordTags::default(),
        }
    }

    fn make_procedure(id: &str, module_id: Option<&str>, internship_id: Option<&str>) -> Procedure {
        Procedure {
            id: id.to_string(),
            code: "ecg_interpretation".to_string(),
            operator_role: OperatorRole::A,
            date: make_date(2024, 2, 1),
            internship_id: internship_id.map(str::to_string),
            module_id: module_id.map(str::to_string),
            tags: RecordTags::default(),
        }
    }

    fn make_shift(id: &str, internship_id: &str) -> Shift {
        Shift {
            id: id.to_string(),
            start: make_date(2024, 2, 5).and_hms_opt(8, 0, 0).unwrap(),
            duration: ShiftDuration::new(10, 0),
            internship_id: internship_id.to_string(),
            module_id: None,
            is_approved: id != "s_unapproved",
        }
    }

    fn sample_records() -> TrainingRecords {
        TrainingRecords {
            internships: vec![
                make_internship("i_basic", "basic"),
                make_internship("i_spec", "specialist"),
            ],
            procedures: vec![
                make_procedure("p_tagged", Some("basic"), None),
                make_procedure("p_via_internship", None, Some("i_basic")),
                make_procedure("p_other", None, Some("i_spec")),
                make_procedure("p_loose", None, None),
            ],
            shifts: vec![make_shift("s_basic", "i_basic"), make_shift("s_unapproved", "i_spec")],
            ..TrainingRecords::default()
        }
    }

    #[test]
    fn test_for_module_keeps_module_internships() {
        let narrowed = sample_records().for_module("basic");
        assert_eq!(narrowed.internships.len(), 1);
        assert_eq!(narrowed.internships[0].id, "i_basic");
    }

    #[test]
    fn test_for_module_attributes_procedures_through_internship() {
        let narrowed = sample_records().for_module("basic");
        let ids: Vec<&str> = narrowed.procedures.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p_tagged", "p_via_internship"]);
    }

    #[test]
    fn test_for_module_attributes_shifts_through_internship() {
        let narrowed = sample_records().for_module("specialist");
        assert_eq!(narrowed.shifts.len(), 1);
        assert_eq!(narrowed.shifts[0].id, "s_unapproved");
    }

    #[test]
    fn test_approved_shifts_filter() {
        let records = sample_records();
        let approved: Vec<&str> = records.approved_shifts().map(|s| s.id.as_str()).collect();
        assert_eq!(approved, vec!["s_basic"]);
    }

    #[test]
    fn test_internship_lookup() {
        let records = sample_records();
        assert!(records.internship("i_spec").is_some());
        assert!(records.internship("missing").is_none());
    }
}
