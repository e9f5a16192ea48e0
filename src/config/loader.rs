//! Template loading functionality.
//!
//! This module provides the [`TemplateLoader`] type for loading requirement
//! templates from YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::RequirementTemplate;

/// Loads requirement templates and looks them up by program and version.
///
/// # Directory Structure
///
/// Every `*.yaml` file in the directory holds one template:
/// ```text
/// config/templates/
/// ├── cardiology-2023.yaml
/// └── internal-medicine-2023.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use residency_engine::config::TemplateLoader;
///
/// let loader = TemplateLoader::load("./config/templates").unwrap();
/// let template = loader.get_template("cardiology", "2023").unwrap();
/// println!("Loaded program: {}", template.name);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateLoader {
    templates: HashMap<(String, String), RequirementTemplate>,
}

impl TemplateLoader {
    /// Loads every template in the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `TemplateLoader` on success, or an error if:
    /// - The directory is missing or holds no `*.yaml` file
    /// - Any file contains invalid YAML or misses a required field
    /// - Any template is inconsistent, or two files share a code and version
    ///
    /// # Example
    ///
    /// ```no_run
    /// use residency_engine::config::TemplateLoader;
    ///
    /// let loader = TemplateLoader::load("./config/templates")?;
    /// # Ok::<(), residency_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let dir = path.as_ref();
        let dir_str = dir.display().to_string();

        if !dir.is_dir() {
            return Err(EngineError::TemplateNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::TemplateNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::TemplateNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(EngineError::TemplateNotFound {
                path: format!("{} (no template files found)", dir_str),
            });
        }

        let mut templates = Vec::with_capacity(paths.len());
        for path in &paths {
            let template = Self::load_yaml(path)?;
            debug!(
                path = %path.display(),
                code = %template.code,
                version = %template.version,
                "Loaded requirement template"
            );
            templates.push(template);
        }

        Self::from_templates(templates)
    }

    /// Builds a loader from already parsed templates.
    ///
    /// Each template is validated; a repeated code and version is rejected.
    pub fn from_templates(templates: Vec<RequirementTemplate>) -> EngineResult<Self> {
        let mut index = HashMap::with_capacity(templates.len());
        for template in templates {
            template.validate()?;
            let key = (template.code.clone(), template.version.clone());
            if index.contains_key(&key) {
                return Err(EngineError::InvalidTemplate {
                    code: template.code.clone(),
                    message: format!("version '{}' is defined more than once", template.version),
                });
            }
            index.insert(key, template);
        }
        Ok(Self { templates: index })
    }

    /// Parses a single template from YAML text.
    pub fn parse(source: &str, origin: &str) -> EngineResult<RequirementTemplate> {
        serde_yaml::from_str(source).map_err(|e| EngineError::TemplateParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml(path: &Path) -> EngineResult<RequirementTemplate> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::TemplateNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Gets the template for a program code and version.
    ///
    /// # Returns
    ///
    /// Returns the template if registered, or `TemplateNotRegistered`.
    pub fn get_template(&self, code: &str, version: &str) -> EngineResult<&RequirementTemplate> {
        self.templates
            .get(&(code.to_string(), version.to_string()))
            .ok_or_else(|| EngineError::TemplateNotRegistered {
                code: code.to_string(),
                version: version.to_string(),
            })
    }

    /// Returns the number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no template is registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModuleType, Partition, Tagged};
    use rust_decimal::Decimal;
    use std::path::PathBuf;

    const MINIMAL_TEMPLATE: &str = r#"
code: test
version: "1"
name: Test program
duration_days: 730
required_years: 2
modules:
  - code: basic
    name: Basic
    module_type: basic
"#;

    fn templates_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/templates")
    }

    fn load_test_templates() -> TemplateLoader {
        TemplateLoader::load(templates_dir()).expect("Failed to load templates")
    }

    #[test]
    fn test_load_templates_directory() {
        let loader = load_test_templates();
        assert_eq!(loader.len(), 2);
    }

    #[test]
    fn test_cardiology_template_metadata() {
        let loader = load_test_templates();
        let template = loader.get_template("cardiology", "2023").unwrap();
        assert_eq!(template.name, "Kardiologia");
        assert_eq!(template.duration_days, 1826);
        assert_eq!(template.required_years, 5);
        assert_eq!(template.self_education.total_days, 30);
        assert_eq!(template.medical_shifts.minimum_hours, Decimal::from(4000));
        assert_eq!(template.minimum_publications, 1);
    }

    #[test]
    fn test_cardiology_template_modules() {
        let loader = load_test_templates();
        let template = loader.get_template("cardiology", "2023").unwrap();
        assert_eq!(template.modules.len(), 2);

        let basic = template.module("internal_medicine_basic").unwrap();
        assert_eq!(basic.module_type, ModuleType::Basic);
        assert_eq!(basic.internships.len(), 3);
        assert_eq!(basic.courses.len(), 2);

        let specialist = template.module("cardiology_specialist").unwrap();
        assert_eq!(specialist.module_type, ModuleType::Specialist);
    }

    #[test]
    fn test_internship_requirement_lookup_and_tags() {
        let loader = load_test_templates();
        let template = loader.get_template("cardiology", "2023").unwrap();

        let requirement = template.internship_requirement("cardio_intensive_care").unwrap();
        assert_eq!(requirement.prerequisites, vec!["cardio_core".to_string()]);
        assert_eq!(requirement.required_year, Some(4));
        assert_eq!(requirement.partition_key(Partition::Year), "4");
    }

    #[test]
    fn test_unknown_template_version() {
        let loader = load_test_templates();
        let result = loader.get_template("cardiology", "1999");
        assert!(matches!(
            result,
            Err(EngineError::TemplateNotRegistered { ref code, ref version })
                if code == "cardiology" && version == "1999"
        ));
    }

    #[test]
    fn test_missing_directory() {
        let result = TemplateLoader::load("/nonexistent/path");
        assert!(matches!(result, Err(EngineError::TemplateNotFound { .. })));
    }

    #[test]
    fn test_parse_error_names_origin() {
        let result = TemplateLoader::parse("code: [unclosed", "inline.yaml");
        match result {
            Err(EngineError::TemplateParseError { path, .. }) => assert_eq!(path, "inline.yaml"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_field_is_parse_error() {
        let result = TemplateLoader::parse("code: test\nversion: \"1\"\n", "partial.yaml");
        assert!(matches!(result, Err(EngineError::TemplateParseError { .. })));
    }

    #[test]
    fn test_minimal_template_defaults() {
        let template = TemplateLoader::parse(MINIMAL_TEMPLATE, "minimal.yaml").unwrap();
        assert_eq!(template.total_working_days, 0);
        assert_eq!(template.minimum_publications, 0);
        assert_eq!(template.medical_shifts.minimum_hours, Decimal::ZERO);
        assert!(template.modules[0].procedures.is_empty());
    }

    #[test]
    fn test_duplicate_version_rejected() {
        let first = TemplateLoader::parse(MINIMAL_TEMPLATE, "a.yaml").unwrap();
        let second = TemplateLoader::parse(MINIMAL_TEMPLATE, "b.yaml").unwrap();
        let result = TemplateLoader::from_templates(vec![first, second]);
        assert!(matches!(result, Err(EngineError::InvalidTemplate { .. })));
    }

    #[test]
    fn test_unknown_prerequisite_rejected() {
        let source = r#"
code: test
version: "1"
name: Test program
duration_days: 730
required_years: 2
modules:
  - code: basic
    name: Basic
    module_type: basic
    internships:
      - code: first
        name: First
        prerequisites: [missing]
"#;
        let template = TemplateLoader::parse(source, "bad.yaml").unwrap();
        let error = template.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid template 'test': internship 'first' lists unknown prerequisite 'missing'"
        );
    }

    #[test]
    fn test_duplicate_module_code_rejected() {
        let source = r#"
code: test
version: "1"
name: Test program
duration_days: 730
required_years: 2
modules:
  - code: basic
    name: Basic
    module_type: basic
  - code: basic
    name: Basic again
    module_type: specialist
"#;
        let template = TemplateLoader::parse(source, "dup.yaml").unwrap();
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_requirements_for_unknown_module() {
        let template = TemplateLoader::parse(MINIMAL_TEMPLATE, "minimal.yaml").unwrap();
        let result = template.requirements_for(Some("specialist"));
        assert!(matches!(
            result,
            Err(EngineError::ModuleRequirementsNotFound { ref code }) if code == "specialist"
        ));
    }

    #[test]
    fn test_requirements_for_scope_label() {
        let template = TemplateLoader::parse(MINIMAL_TEMPLATE, "minimal.yaml").unwrap();
        assert_eq!(template.requirements_for(None).unwrap().label(), "specialization");
        let scope = template.requirements_for(Some("basic")).unwrap();
        assert_eq!(scope.label(), "basic");
        assert!(!scope.is_program_wide());
    }
}
