//! Progress aggregation against requirement templates.
//!
//! Requirements come from a [`RequirementScope`] (the whole program or one
//! module); completions come from a [`TrainingRecords`] snapshot already
//! narrowed to the same scope. Both sides are reduced to `(key, amount)`
//! entries and folded into [`CategoryProgress`] values, either as one
//! total or grouped by a [`Partition`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{RequirementScope, RequirementTemplate};
use crate::error::EngineResult;
use crate::models::{
    CategoryProgress, HoursProgress, OperatorRole, Partition, ProgressStatistics, Tagged,
    Trainee, UNASSIGNED_PARTITION,
};
use crate::records::TrainingRecords;

use super::overall_progress::{OverallProgressInput, compute_overall_progress};

/// A measured category of training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressCategory {
    /// Completed internships.
    Internships,
    /// Courses attended.
    Courses,
    /// Procedures performed as operator.
    ProceduresA,
    /// Procedures assisted.
    ProceduresB,
    /// Self-education days.
    SelfEducation,
    /// Publications.
    Publications,
}

impl ProgressCategory {
    /// Every category, in reporting order.
    pub const ALL: [ProgressCategory; 6] = [
        ProgressCategory::Internships,
        ProgressCategory::Courses,
        ProgressCategory::ProceduresA,
        ProgressCategory::ProceduresB,
        ProgressCategory::SelfEducation,
        ProgressCategory::Publications,
    ];
}

type Entry = (String, u32);

fn key_of<T: Tagged>(item: &T, partition: Option<Partition>) -> String {
    partition.map(|p| item.partition_key(p)).unwrap_or_default()
}

/// Program-level requirements are not split by tag.
fn program_level_key(partition: Option<Partition>) -> String {
    partition
        .map(|_| UNASSIGNED_PARTITION.to_string())
        .unwrap_or_default()
}

fn required_entries(
    scope: &RequirementScope<'_>,
    category: ProgressCategory,
    partition: Option<Partition>,
) -> Vec<Entry> {
    let template = scope.template();
    match category {
        ProgressCategory::Internships => scope
            .internships()
            .map(|i| (key_of(i, partition), 1))
            .collect(),
        ProgressCategory::Courses => scope
            .courses()
            .map(|c| (key_of(c, partition), 1))
            .collect(),
        ProgressCategory::ProceduresA => scope
            .procedures()
            .map(|p| (key_of(p, partition), p.required_count_a))
            .collect(),
        ProgressCategory::ProceduresB => scope
            .procedures()
            .map(|p| (key_of(p, partition), p.required_count_b))
            .collect(),
        ProgressCategory::SelfEducation if scope.is_program_wide() => {
            vec![(program_level_key(partition), template.self_education.total_days)]
        }
        ProgressCategory::Publications if scope.is_program_wide() => {
            vec![(program_level_key(partition), template.minimum_publications)]
        }
        ProgressCategory::SelfEducation | ProgressCategory::Publications => Vec::new(),
    }
}

fn completed_entries(
    records: &TrainingRecords,
    category: ProgressCategory,
    partition: Option<Partition>,
) -> Vec<Entry> {
    let procedures_as = |role: OperatorRole| -> Vec<Entry> {
        records
            .procedures
            .iter()
            .filter(|p| p.operator_role == role)
            .map(|p| (key_of(p, partition), 1))
            .collect()
    };

    match category {
        ProgressCategory::Internships => records
            .internships
            .iter()
            .filter(|i| i.is_completed())
            .map(|i| (key_of(i, partition), 1))
            .collect(),
        ProgressCategory::Courses => records
            .courses
            .iter()
            .map(|c| (key_of(c, partition), 1))
            .collect(),
        ProgressCategory::ProceduresA => procedures_as(OperatorRole::A),
        ProgressCategory::ProceduresB => procedures_as(OperatorRole::B),
        ProgressCategory::SelfEducation => records
            .self_education
            .iter()
            .map(|e| (key_of(e, partition), e.days))
            .collect(),
        ProgressCategory::Publications => records
            .publications
            .iter()
            .map(|_| (program_level_key(partition), 1))
            .collect(),
    }
}

fn fold_entries(required: Vec<Entry>, completed: Vec<Entry>) -> BTreeMap<String, CategoryProgress> {
    let mut groups: BTreeMap<String, CategoryProgress> = BTreeMap::new();
    for (key, amount) in required.into_iter().filter(|(_, amount)| *amount > 0) {
        let group = groups.entry(key).or_default();
        group.required = group.required.saturating_add(amount);
    }
    for (key, amount) in completed.into_iter().filter(|(_, amount)| *amount > 0) {
        let group = groups.entry(key).or_default();
        group.completed = group.completed.saturating_add(amount);
    }
    groups
}

/// Computes required and completed totals for one category.
///
/// `records` must already be narrowed to the scope, e.g. with
/// [`TrainingRecords::for_module`] for a module scope. Internships count
/// when completed, courses are a simple count, procedures are split by
/// operator role, self-education counts days. Self-education and
/// publication requirements exist only for the whole program.
///
/// # Example
///
/// ```
/// use residency_engine::calculation::{compute_category_progress, ProgressCategory};
/// use residency_engine::config::TemplateLoader;
/// use residency_engine::records::TrainingRecords;
///
/// let template = TemplateLoader::parse(r#"
/// code: demo
/// version: "1"
/// name: Demo
/// duration_days: 365
/// required_years: 1
/// modules:
///   - code: basic
///     name: Basic
///     module_type: basic
///     courses:
///       - { code: c1, name: First }
///       - { code: c2, name: Second }
/// "#, "inline").unwrap();
/// let scope = template.requirements_for(None).unwrap();
///
/// let records = TrainingRecords::default();
/// let progress = compute_category_progress(&scope, &records, ProgressCategory::Courses);
/// assert_eq!((progress.required, progress.completed), (2, 0));
/// ```
pub fn compute_category_progress(
    scope: &RequirementScope<'_>,
    records: &TrainingRecords,
    category: ProgressCategory,
) -> CategoryProgress {
    let required = required_entries(scope, category, None)
        .into_iter()
        .fold(0u32, |sum, (_, amount)| sum.saturating_add(amount));
    let completed = completed_entries(records, category, None)
        .into_iter()
        .fold(0u32, |sum, (_, amount)| sum.saturating_add(amount));
    CategoryProgress::new(required, completed)
}

/// Groups a category's requirements and completions by a partition key.
///
/// Both sides are grouped independently. A key that appears only among
/// completions is kept with `required = 0`; untagged items fall under
/// [`UNASSIGNED_PARTITION`].
pub fn compute_progress_by_partition(
    scope: &RequirementScope<'_>,
    records: &TrainingRecords,
    category: ProgressCategory,
    partition: Partition,
) -> BTreeMap<String, CategoryProgress> {
    fold_entries(
        required_entries(scope, category, Some(partition)),
        completed_entries(records, category, Some(partition)),
    )
}

/// Groups a category by program year.
pub fn compute_progress_by_year(
    scope: &RequirementScope<'_>,
    records: &TrainingRecords,
    category: ProgressCategory,
) -> BTreeMap<String, CategoryProgress> {
    compute_progress_by_partition(scope, records, category, Partition::Year)
}

/// Groups a category by training stage.
pub fn compute_progress_by_stage(
    scope: &RequirementScope<'_>,
    records: &TrainingRecords,
    category: ProgressCategory,
) -> BTreeMap<String, CategoryProgress> {
    compute_progress_by_partition(scope, records, category, Partition::Stage)
}

/// Groups a category by its category tag.
pub fn compute_progress_by_category(
    scope: &RequirementScope<'_>,
    records: &TrainingRecords,
    category: ProgressCategory,
) -> BTreeMap<String, CategoryProgress> {
    compute_progress_by_partition(scope, records, category, Partition::Category)
}

/// Completion of a module in percent.
///
/// The mean of the internship, course, operator-procedure and
/// assistant-procedure percentages, rounded to two places. A category
/// with nothing required counts as 100.
pub fn module_completion_percentage(
    scope: &RequirementScope<'_>,
    records: &TrainingRecords,
) -> Decimal {
    let categories = [
        ProgressCategory::Internships,
        ProgressCategory::Courses,
        ProgressCategory::ProceduresA,
        ProgressCategory::ProceduresB,
    ];
    let sum: Decimal = categories
        .iter()
        .map(|category| compute_category_progress(scope, records, *category).percentage())
        .sum();
    (sum / Decimal::from(categories.len())).round_dp(2)
}

/// Returns a copy of the trainee with every module's completion
/// percentage derived from the records.
///
/// # Errors
///
/// Returns [`EngineError::ModuleRequirementsNotFound`] if a module's
/// template code is not defined by the template.
pub fn with_module_completion(
    trainee: &Trainee,
    template: &RequirementTemplate,
    records: &TrainingRecords,
) -> EngineResult<Trainee> {
    let mut updated = trainee.clone();
    for module in &mut updated.modules {
        let scope = template.requirements_for(Some(&module.template_code))?;
        let module_records = records.for_module(&module.id);
        module.completion_percentage = module_completion_percentage(&scope, &module_records);
        debug!(
            trainee_id = %trainee.id,
            module_id = %module.id,
            completion = %module.completion_percentage,
            "Derived module completion"
        );
    }
    Ok(updated)
}

/// Builds the full progress picture for a scope.
///
/// Internship days are measured against the program's total working days,
/// or the sum of the module's internship working days for a module
/// scope. Duty hours count approved shifts only and are required for the
/// whole program only.
pub fn compute_statistics(
    scope: &RequirementScope<'_>,
    records: &TrainingRecords,
) -> ProgressStatistics {
    let template = scope.template();
    let progress = |category| compute_category_progress(scope, records, category);

    let internships = progress(ProgressCategory::Internships);
    let courses = progress(ProgressCategory::Courses);
    let procedures_a = progress(ProgressCategory::ProceduresA);
    let procedures_b = progress(ProgressCategory::ProceduresB);

    let required_days = if scope.is_program_wide() {
        template.total_working_days
    } else {
        scope
            .internships()
            .fold(0u32, |sum, i| sum.saturating_add(i.working_days))
    };
    let completed_days = records
        .internships
        .iter()
        .filter(|i| i.is_completed())
        .fold(0u32, |sum, i| sum.saturating_add(i.working_days));

    let required_hours = if scope.is_program_wide() {
        template.medical_shifts.minimum_hours
    } else {
        Decimal::ZERO
    };
    let completed_hours: Decimal = records.approved_shifts().map(|s| s.hours()).sum();

    let absence_days = records.absences.iter().map(|a| a.day_count()).sum();
    let absence_days_extending = records
        .absences
        .iter()
        .filter(|a| a.extends_specialization())
        .map(|a| a.day_count())
        .sum();

    let overall_progress = compute_overall_progress(&OverallProgressInput {
        internships,
        courses,
        procedures_a,
        procedures_b,
    });

    debug!(
        scope = scope.label(),
        %overall_progress,
        "Computed progress statistics"
    );

    ProgressStatistics {
        scope: scope.label().to_string(),
        internships,
        internship_days: CategoryProgress::new(required_days, completed_days),
        courses,
        procedures_a,
        procedures_b,
        self_education: progress(ProgressCategory::SelfEducation),
        publications: progress(ProgressCategory::Publications),
        shift_hours: HoursProgress {
            required_hours,
            completed_hours,
        },
        absence_days,
        absence_days_extending,
        overall_progress,
    }
}
