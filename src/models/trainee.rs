//! Trainee model and related types.
//!
//! This module defines the [`Trainee`] struct together with the
//! [`Specialization`] they are enrolled in and its [`Module`]s.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The phase of a specialization program a module represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    /// The basic module, completed first.
    Basic,
    /// The advanced specialist module.
    Specialist,
}

/// A module of the trainee's specialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Unique identifier for the module.
    pub id: String,
    /// Code of the matching module in the requirement template.
    pub template_code: String,
    /// Display name.
    pub name: String,
    /// Basic or specialist.
    pub module_type: ModuleType,
    /// Whether the trainee is currently working through this module.
    #[serde(default)]
    pub is_active: bool,
    /// Completion in percent, as derived by the progress aggregator.
    #[serde(default)]
    pub completion_percentage: Decimal,
}

impl Module {
    /// Returns true once every requirement of the module is satisfied.
    pub fn is_complete(&self) -> bool {
        self.completion_percentage >= Decimal::ONE_HUNDRED
    }
}

/// The specialization program a trainee is enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialization {
    /// Program code, used to look up the requirement template.
    pub program_code: String,
    /// Template version the trainee follows.
    pub template_version: String,
    /// First day of the program.
    pub start_date: NaiveDate,
    /// Nominal program length in years.
    pub required_years: u32,
    /// The program year the trainee is in.
    pub current_year: u8,
    /// Registration number in the national training register.
    #[serde(default)]
    pub registration_number: Option<String>,
}

/// A resident doctor in training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainee {
    /// Unique identifier for the trainee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The program the trainee follows.
    pub specialization: Specialization,
    /// The modules of that program.
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Trainee {
    /// Returns the module the trainee is working through, if any.
    pub fn active_module(&self) -> Option<&Module> {
        self.modules.iter().find(|m| m.is_active)
    }

    /// Returns the first module of the given type.
    pub fn module_of_type(&self, module_type: ModuleType) -> Option<&Module> {
        self.modules.iter().find(|m| m.module_type == module_type)
    }

    /// Returns true if a non-blank registration number is on file.
    ///
    /// # Examples
    ///
    /// ```
    /// use residency_engine::models::{Specialization, Trainee};
    /// use chrono::NaiveDate;
    ///
    /// let trainee = Trainee {
    ///     id: "tr_001".to_string(),
    ///     name: "Anna Nowak".to_string(),
    ///     specialization: Specialization {
    ///         program_code: "cardiology".to_string(),
    ///         template_version: "2023".to_string(),
    ///         start_date: NaiveDate::from_ymd_opt(2020, 10, 1).unwrap(),
    ///         required_years: 5,
    ///         current_year: 5,
    ///         registration_number: Some("  ".to_string()),
    ///     },
    ///     modules: vec![],
    /// };
    /// assert!(!trainee.has_registration_number());
    /// ```
    pub fn has_registration_number(&self) -> bool {
        self.specialization
            .registration_number
            .as_deref()
            .is_some_and(|number| !number.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_module(id: &str, module_type: ModuleType, is_active: bool) -> Module {
        Module {
            id: id.to_string(),
            template_code: id.to_string(),
            name: format!("Module {}", id),
            module_type,
            is_active,
            completion_percentage: Decimal::ZERO,
        }
    }

    fn create_test_trainee(modules: Vec<Module>) -> Trainee {
        Trainee {
            id: "tr_001".to_string(),
            name: "Jan Kowalski".to_string(),
            specialization: Specialization {
                program_code: "cardiology".to_string(),
                template_version: "2023".to_string(),
                start_date: NaiveDate::from_ymd_opt(2021, 10, 1).unwrap(),
                required_years: 5,
                current_year: 2,
                registration_number: None,
            },
            modules,
        }
    }

    #[test]
    fn test_active_module_is_found() {
        let trainee = create_test_trainee(vec![
            create_test_module("basic", ModuleType::Basic, false),
            create_test_module("specialist", ModuleType::Specialist, true),
        ]);
        assert_eq!(trainee.active_module().unwrap().id, "specialist");
    }

    #[test]
    fn test_no_active_module() {
        let trainee =
            create_test_trainee(vec![create_test_module("basic", ModuleType::Basic, false)]);
        assert!(trainee.active_module().is_none());
    }

    #[test]
    fn test_module_of_type() {
        let trainee = create_test_trainee(vec![
            create_test_module("basic", ModuleType::Basic, true),
            create_test_module("specialist", ModuleType::Specialist, false),
        ]);
        assert_eq!(trainee.module_of_type(ModuleType::Specialist).unwrap().id, "specialist");
    }

    #[test]
    fn test_module_complete_at_one_hundred_percent() {
        let mut module = create_test_module("basic", ModuleType::Basic, true);
        assert!(!module.is_complete());
        module.completion_percentage = Decimal::ONE_HUNDRED;
        assert!(module.is_complete());
    }

    #[test]
    fn test_module_type_serialization() {
        assert_eq!(serde_json::to_string(&ModuleType::Basic).unwrap(), "\"basic\"");
        assert_eq!(
            serde_json::to_string(&ModuleType::Specialist).unwrap(),
            "\"specialist\""
        );
    }

    #[test]
    fn test_deserialize_trainee_without_modules() {
        let json = r#"{
            "id": "tr_002",
            "name": "Ewa Zielinska",
            "specialization": {
                "program_code": "cardiology",
                "template_version": "2023",
                "start_date": "2022-10-01",
                "required_years": 5,
                "current_year": 1
            }
        }"#;

        let trainee: Trainee = serde_json::from_str(json).unwrap();
        assert!(trainee.modules.is_empty());
        assert!(!trainee.has_registration_number());
    }
}
