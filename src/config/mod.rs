//! Requirement template loading and management.
//!
//! This module provides functionality to load specialization requirement
//! templates from YAML files: how many internships, courses, procedures,
//! duty hours and self-education days each program module requires.
//!
//! # Example
//!
//! ```no_run
//! use residency_engine::config::TemplateLoader;
//!
//! let loader = TemplateLoader::load("./config/templates").unwrap();
//! let template = loader.get_template("cardiology", "2023").unwrap();
//! println!("Loaded program: {}", template.name);
//! ```

mod loader;
mod types;

pub use loader::TemplateLoader;
pub use types::{
    CourseRequirement, InternshipRequirement, ModuleRequirements, ProcedureRequirement,
    RequirementScope, RequirementTemplate, SelfEducationRequirement, ShiftRequirement,
};
