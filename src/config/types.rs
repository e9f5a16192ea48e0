//! Requirement template types.
//!
//! This module contains the strongly-typed structures deserialized from
//! YAML requirement templates. A template describes how many internships,
//! courses, procedures, hours and self-education days a specialization
//! program requires, per module.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{ModuleType, RecordTags, Tagged};

/// A required internship.
#[derive(Debug, Clone, Deserialize)]
pub struct InternshipRequirement {
    /// Code referenced by realised internships and prerequisites.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Working days the internship lasts.
    #[serde(default)]
    pub working_days: u32,
    /// Codes of internships that must be completed first.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Program year the trainee must have reached.
    #[serde(default)]
    pub required_year: Option<u8>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: RecordTags,
}

impl Tagged for InternshipRequirement {
    fn tags(&self) -> &RecordTags {
        &self.tags
    }
}

/// A required course.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRequirement {
    /// Course code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Grouping tags.
    #[serde(default)]
    pub tags: RecordTags,
}

impl Tagged for CourseRequirement {
    fn tags(&self) -> &RecordTags {
        &self.tags
    }
}

/// Required counts for a procedure, split by operator role.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcedureRequirement {
    /// Procedure code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Times the trainee must perform it as operator.
    #[serde(default)]
    pub required_count_a: u32,
    /// Times the trainee must assist.
    #[serde(default)]
    pub required_count_b: u32,
    /// Grouping tags.
    #[serde(default)]
    pub tags: RecordTags,
}

impl Tagged for ProcedureRequirement {
    fn tags(&self) -> &RecordTags {
        &self.tags
    }
}

/// Requirements of one program module.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleRequirements {
    /// Module code, referenced by [`Module::template_code`](crate::models::Module).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Basic or specialist.
    pub module_type: ModuleType,
    /// Required internships.
    #[serde(default)]
    pub internships: Vec<InternshipRequirement>,
    /// Required courses.
    #[serde(default)]
    pub courses: Vec<CourseRequirement>,
    /// Required procedures.
    #[serde(default)]
    pub procedures: Vec<ProcedureRequirement>,
}

/// Program-wide self-education allowance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelfEducationRequirement {
    /// Self-education days available over the program.
    #[serde(default)]
    pub total_days: u32,
}

/// Program-wide duty hour requirement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShiftRequirement {
    /// Minimum approved duty hours over the program.
    #[serde(default)]
    pub minimum_hours: Decimal,
}

/// A complete requirement template for one program version.
#[derive(Debug, Clone, Deserialize)]
pub struct RequirementTemplate {
    /// Program code (e.g. "cardiology").
    pub code: String,
    /// Template version (e.g. "2023").
    pub version: String,
    /// Display name of the program.
    pub name: String,
    /// Nominal program length in calendar days.
    pub duration_days: i64,
    /// Nominal program length in years.
    pub required_years: u32,
    /// Working days of internships over the whole program.
    #[serde(default)]
    pub total_working_days: u32,
    /// Self-education allowance.
    #[serde(default)]
    pub self_education: SelfEducationRequirement,
    /// Duty hour requirement.
    #[serde(default)]
    pub medical_shifts: ShiftRequirement,
    /// Minimum number of publications.
    #[serde(default)]
    pub minimum_publications: u32,
    /// The program's modules.
    pub modules: Vec<ModuleRequirements>,
}

impl RequirementTemplate {
    /// Returns the module with the given code.
    pub fn module(&self, code: &str) -> Option<&ModuleRequirements> {
        self.modules.iter().find(|m| m.code == code)
    }

    /// Finds an internship requirement by code in any module.
    pub fn internship_requirement(&self, code: &str) -> Option<&InternshipRequirement> {
        self.modules
            .iter()
            .flat_map(|m| m.internships.iter())
            .find(|i| i.code == code)
    }

    /// Returns the requirements for the whole program or for one module.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ModuleRequirementsNotFound`] when
    /// `module_code` names a module the template does not define.
    pub fn requirements_for(
        &self,
        module_code: Option<&str>,
    ) -> EngineResult<RequirementScope<'_>> {
        match module_code {
            None => Ok(RequirementScope {
                template: self,
                modules: self.modules.iter().collect(),
                module_code: None,
            }),
            Some(code) => {
                let module = self
                    .module(code)
                    .ok_or_else(|| EngineError::ModuleRequirementsNotFound {
                        code: code.to_string(),
                    })?;
                Ok(RequirementScope {
                    template: self,
                    modules: vec![module],
                    module_code: Some(module.code.as_str()),
                })
            }
        }
    }

    /// Checks the template for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTemplate`] for a non-positive
    /// duration, duplicate module or internship codes, or a prerequisite
    /// that names no internship of the template.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidTemplate {
            code: self.code.clone(),
            message,
        };

        if self.duration_days <= 0 {
            return Err(invalid(format!(
                "duration_days must be positive, got {}",
                self.duration_days
            )));
        }

        let mut module_codes = HashSet::new();
        for module in &self.modules {
            if !module_codes.insert(module.code.as_str()) {
                return Err(invalid(format!("duplicate module code '{}'", module.code)));
            }
        }

        let mut internship_codes = HashSet::new();
        for internship in self.modules.iter().flat_map(|m| m.internships.iter()) {
            if !internship_codes.insert(internship.code.as_str()) {
                return Err(invalid(format!(
                    "duplicate internship code '{}'",
                    internship.code
                )));
            }
        }

        for internship in self.modules.iter().flat_map(|m| m.internships.iter()) {
            if let Some(missing) = internship
                .prerequisites
                .iter()
                .find(|p| !internship_codes.contains(p.as_str()))
            {
                return Err(invalid(format!(
                    "internship '{}' lists unknown prerequisite '{}'",
                    internship.code, missing
                )));
            }
        }

        Ok(())
    }
}

/// The slice of a template that applies to a progress computation.
#[derive(Debug, Clone)]
pub struct RequirementScope<'a> {
    template: &'a RequirementTemplate,
    modules: Vec<&'a ModuleRequirements>,
    module_code: Option<&'a str>,
}

impl<'a> RequirementScope<'a> {
    /// Returns the template the scope was taken from.
    pub fn template(&self) -> &'a RequirementTemplate {
        self.template
    }

    /// Returns true when the scope covers the whole program.
    pub fn is_program_wide(&self) -> bool {
        self.module_code.is_none()
    }

    /// "specialization" for the whole program, otherwise the module code.
    pub fn label(&self) -> &'a str {
        self.module_code.unwrap_or("specialization")
    }

    /// Internship requirements in scope.
    pub fn internships(&self) -> impl Iterator<Item = &'a InternshipRequirement> + '_ {
        self.modules.iter().copied().flat_map(|m| m.internships.iter())
    }

    /// Course requirements in scope.
    pub fn courses(&self) -> impl Iterator<Item = &'a CourseRequirement> + '_ {
        self.modules.iter().copied().flat_map(|m| m.courses.iter())
    }

    /// Procedure requirements in scope.
    pub fn procedures(&self) -> impl Iterator<Item = &'a ProcedureRequirement> + '_ {
        self.modules.iter().copied().flat_map(|m| m.procedures.iter())
    }
}
