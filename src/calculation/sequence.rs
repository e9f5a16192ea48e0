//! Internship ordering rules.

use tracing::debug;

use crate::config::InternshipRequirement;
use crate::error::{RuleResult, RuleViolation};
use crate::models::{Internship, ModuleType, Trainee};

/// Checks whether a candidate internship may start.
///
/// Rules, in order:
/// 1. A specialist-module internship needs every other basic-module
///    internship of the trainee completed.
/// 2. Every prerequisite named by the requirement needs at least one
///    completed internship realising it.
/// 3. The trainee's current program year must reach the requirement's
///    year.
///
/// `requirement` is the template entry the candidate realises; without
/// one only the first rule applies.
///
/// # Errors
///
/// Returns a `BUSINESS_RULE_VIOLATION` naming the first rule broken.
pub fn validate_internship_sequence(
    trainee: &Trainee,
    candidate: &Internship,
    internships: &[Internship],
    requirement: Option<&InternshipRequirement>,
) -> RuleResult<()> {
    if candidate.module_type == ModuleType::Specialist {
        let incomplete_basic = internships
            .iter()
            .filter(|i| i.id != candidate.id)
            .filter(|i| i.module_type == ModuleType::Basic && !i.is_completed())
            .count();

        if incomplete_basic > 0 {
            debug!(
                trainee_id = %trainee.id,
                internship_id = %candidate.id,
                incomplete_basic,
                "Specialist internship blocked by basic module"
            );
            return Err(RuleViolation::business_rule(format!(
                "Cannot start specialist module internship while {} basic module internship(s) are not completed",
                incomplete_basic
            )));
        }
    }

    let Some(requirement) = requirement else {
        return Ok(());
    };

    for prerequisite in &requirement.prerequisites {
        let satisfied = internships.iter().any(|i| {
            i.is_completed() && i.template_code.as_deref() == Some(prerequisite.as_str())
        });
        if !satisfied {
            return Err(RuleViolation::business_rule(format!(
                "Prerequisite internship not completed: {}",
                prerequisite
            )));
        }
    }

    if let Some(required_year) = requirement.required_year {
        let current_year = trainee.specialization.current_year;
        if required_year > current_year {
            return Err(RuleViolation::business_rule(format!(
                "Internship requires year {}, current year is {}",
                required_year, current_year
            )));
        }
    }

    Ok(())
}
