//! The engine façade.
//!
//! [`ComplianceEngine`] loads a trainee and their records from a
//! [`RecordSource`], resolves the trainee's requirement template, reads the
//! [`Clock`] where a rule needs "now", and hands everything to the pure
//! rule functions in [`calculation`](crate::calculation).
//!
//! Every operation returns `EngineResult<RuleResult<T>>`. The outer error
//! is an infrastructure failure (record source down, template missing)
//! and propagates with `?`; the inner result is the rule verdict, with
//! `NOT_FOUND` for unknown trainees and internships.

use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation;
use crate::clock::{Clock, SystemClock};
use crate::config::{RequirementTemplate, TemplateLoader};
use crate::error::{EngineResult, RuleResult, RuleViolation};
use crate::models::{
    CompletionProjection, ComplianceReport, ExamType, ExaminationReadiness, ProgressStatistics,
    QualityMetrics, ShiftDuration, Trainee,
};
use crate::records::{RecordSource, TrainingRecords};

fn trainee_not_found(trainee_id: &str) -> RuleViolation {
    RuleViolation::not_found(format!("Trainee not found: {}", trainee_id))
}

/// Progress and compliance rules over a record source.
///
/// # Example
///
/// ```no_run
/// use residency_engine::clock::SystemClock;
/// use residency_engine::config::TemplateLoader;
/// use residency_engine::error::EngineResult;
/// use residency_engine::models::Trainee;
/// use residency_engine::records::{RecordSource, TrainingRecords};
/// use residency_engine::service::ComplianceEngine;
///
/// struct NoRecords;
///
/// impl RecordSource for NoRecords {
///     fn trainee(&self, _trainee_id: &str) -> EngineResult<Option<Trainee>> {
///         Ok(None)
///     }
///
///     fn records(&self, _trainee_id: &str) -> EngineResult<TrainingRecords> {
///         Ok(TrainingRecords::default())
///     }
/// }
///
/// let templates = TemplateLoader::load("./config/templates")?;
/// let engine = ComplianceEngine::new(NoRecords, SystemClock, templates);
/// let verdict = engine.generate_compliance_report("tr_001", None)?;
/// assert!(verdict.is_err());
/// # Ok::<(), residency_engine::error::EngineError>(())
/// ```
#[derive(Debug)]
pub struct ComplianceEngine<S, C = SystemClock> {
    source: S,
    clock: C,
    templates: TemplateLoader,
}

impl<S: RecordSource, C: Clock> ComplianceEngine<S, C> {
    /// Creates an engine over a record source, a clock and the loaded
    /// requirement templates.
    pub fn new(source: S, clock: C, templates: TemplateLoader) -> Self {
        Self {
            source,
            clock,
            templates,
        }
    }

    /// Returns the loaded requirement templates.
    pub fn templates(&self) -> &TemplateLoader {
        &self.templates
    }

    /// Returns the record source.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn load(&self, trainee_id: &str) -> EngineResult<Option<(Trainee, TrainingRecords)>> {
        let Some(trainee) = self.source.trainee(trainee_id)? else {
            warn!(trainee_id, "Trainee not found");
            return Ok(None);
        };
        let records = self.source.records(trainee_id)?;
        Ok(Some((trainee, records)))
    }

    fn template_for(&self, trainee: &Trainee) -> EngineResult<&RequirementTemplate> {
        self.templates.get_template(
            &trainee.specialization.program_code,
            &trainee.specialization.template_version,
        )
    }

    /// Validates a new shift against the trainee's recorded shifts.
    ///
    /// See [`calculation::validate_shift`] for the limits applied.
    pub fn validate_shift(
        &self,
        trainee_id: &str,
        start: NaiveDateTime,
        duration: ShiftDuration,
    ) -> EngineResult<RuleResult<()>> {
        let Some((_, records)) = self.load(trainee_id)? else {
            return Ok(Err(trainee_not_found(trainee_id)));
        };

        let verdict = calculation::validate_shift(start, duration, &records.shifts);
        match &verdict {
            Ok(()) => info!(trainee_id, %start, "Shift validated"),
            Err(violation) => warn!(
                trainee_id,
                %start,
                code = %violation.code,
                message = %violation.message,
                "Shift rejected"
            ),
        }
        Ok(verdict)
    }

    /// Checks whether one of the trainee's internships may start.
    ///
    /// The prerequisites and required year come from the template entry
    /// named by the internship's `template_code`. An internship without a
    /// known template entry is only checked against the basic-before-
    /// specialist rule.
    pub fn validate_internship_sequence(
        &self,
        trainee_id: &str,
        internship_id: &str,
    ) -> EngineResult<RuleResult<()>> {
        let Some((trainee, records)) = self.load(trainee_id)? else {
            return Ok(Err(trainee_not_found(trainee_id)));
        };
        let Some(candidate) = records.internship(internship_id) else {
            warn!(trainee_id, internship_id, "Internship not found");
            return Ok(Err(RuleViolation::not_found(format!(
                "Internship not found: {}",
                internship_id
            ))));
        };

        let template = self.template_for(&trainee)?;
        let requirement = match candidate.template_code.as_deref() {
            Some(code) => {
                let requirement = template.internship_requirement(code);
                if requirement.is_none() {
                    warn!(
                        trainee_id,
                        internship_id,
                        template_code = code,
                        "Internship template code not defined by the program"
                    );
                }
                requirement
            }
            None => None,
        };

        let verdict = calculation::validate_internship_sequence(
            &trainee,
            candidate,
            &records.internships,
            requirement,
        );
        if let Err(violation) = &verdict {
            warn!(trainee_id, internship_id, message = %violation.message, "Internship blocked");
        }
        Ok(verdict)
    }

    /// Generates a compliance report as of `as_of`, or the clock's now.
    pub fn generate_compliance_report(
        &self,
        trainee_id: &str,
        as_of: Option<NaiveDateTime>,
    ) -> EngineResult<RuleResult<ComplianceReport>> {
        let start_time = Instant::now();
        let Some((trainee, records)) = self.load(trainee_id)? else {
            return Ok(Err(trainee_not_found(trainee_id)));
        };

        let template = self.template_for(&trainee)?;
        let trainee = calculation::with_module_completion(&trainee, template, &records)?;
        let as_of = as_of.unwrap_or_else(|| self.clock.now());
        let report =
            calculation::generate_compliance_report(&trainee, &records, as_of, Uuid::new_v4());

        info!(
            trainee_id,
            report_id = %report.report_id,
            score = report.overall_score,
            issues = report.issues.len(),
            is_compliant = report.is_compliant,
            duration_us = start_time.elapsed().as_micros(),
            "Compliance report generated"
        );
        Ok(Ok(report))
    }

    /// Computes the trainee's quality metrics at the clock's now.
    pub fn calculate_quality_metrics(
        &self,
        trainee_id: &str,
    ) -> EngineResult<RuleResult<QualityMetrics>> {
        let Some((trainee, records)) = self.load(trainee_id)? else {
            return Ok(Err(trainee_not_found(trainee_id)));
        };

        let metrics = calculation::calculate_quality_metrics(
            &trainee.id,
            &records,
            self.clock.now(),
            Uuid::new_v4(),
        );
        info!(
            trainee_id,
            overall = %metrics.overall_quality_score,
            "Quality metrics calculated"
        );
        Ok(Ok(metrics))
    }

    /// Checks the trainee's readiness for an examination at the clock's now.
    pub fn check_examination_readiness(
        &self,
        trainee_id: &str,
        exam_type: ExamType,
    ) -> EngineResult<RuleResult<ExaminationReadiness>> {
        let Some((trainee, records)) = self.load(trainee_id)? else {
            return Ok(Err(trainee_not_found(trainee_id)));
        };

        let template = self.template_for(&trainee)?;
        let trainee = calculation::with_module_completion(&trainee, template, &records)?;
        let readiness = calculation::check_examination_readiness(
            &trainee,
            &records,
            exam_type,
            self.clock.now(),
            Uuid::new_v4(),
        );

        info!(
            trainee_id,
            ?exam_type,
            is_ready = readiness.is_ready,
            percentage = %readiness.readiness_percentage,
            "Examination readiness checked"
        );
        Ok(Ok(readiness))
    }

    /// Builds progress statistics for the whole program, or for the
    /// trainee's module realising `module_code`.
    ///
    /// A `module_code` the trainee has no module for is `NOT_FOUND`.
    pub fn progress_statistics(
        &self,
        trainee_id: &str,
        module_code: Option<&str>,
    ) -> EngineResult<RuleResult<ProgressStatistics>> {
        let Some((trainee, records)) = self.load(trainee_id)? else {
            return Ok(Err(trainee_not_found(trainee_id)));
        };
        let template = self.template_for(&trainee)?;

        let statistics = match module_code {
            None => {
                let scope = template.requirements_for(None)?;
                calculation::compute_statistics(&scope, &records)
            }
            Some(code) => {
                let Some(module) = trainee.modules.iter().find(|m| m.template_code == code) else {
                    warn!(trainee_id, module_code = code, "Module not found");
                    return Ok(Err(RuleViolation::not_found(format!(
                        "Module not found: {}",
                        code
                    ))));
                };
                let scope = template.requirements_for(Some(code))?;
                calculation::compute_statistics(&scope, &records.for_module(&module.id))
            }
        };

        info!(
            trainee_id,
            scope = %statistics.scope,
            overall = %statistics.overall_progress,
            "Progress statistics computed"
        );
        Ok(Ok(statistics))
    }

    /// Computes the trainee's planned specialization end date, adjusted
    /// for recorded absences.
    pub fn adjusted_end_date(&self, trainee_id: &str) -> EngineResult<RuleResult<NaiveDate>> {
        let Some((trainee, records)) = self.load(trainee_id)? else {
            return Ok(Err(trainee_not_found(trainee_id)));
        };
        let template = self.template_for(&trainee)?;

        let overlapping = calculation::find_overlapping_absences(&records.absences);
        if !overlapping.is_empty() {
            warn!(
                trainee_id,
                pairs = overlapping.len(),
                "Overlapping absences are counted independently"
            );
        }

        let end_date = calculation::calculate_specialization_end_date(
            trainee.specialization.start_date,
            template.duration_days,
            &records.absences,
        );
        info!(trainee_id, %end_date, "Specialization end date calculated");
        Ok(Ok(end_date))
    }

    /// Projects the trainee's specialization completion at the clock's now.
    ///
    /// Progress is measured program-wide and quality over the full records.
    pub fn project_completion(
        &self,
        trainee_id: &str,
    ) -> EngineResult<RuleResult<CompletionProjection>> {
        let Some((trainee, records)) = self.load(trainee_id)? else {
            return Ok(Err(trainee_not_found(trainee_id)));
        };
        let template = self.template_for(&trainee)?;
        let now = self.clock.now();

        let scope = template.requirements_for(None)?;
        let statistics = calculation::compute_statistics(&scope, &records);
        let quality =
            calculation::calculate_quality_metrics(&trainee.id, &records, now, Uuid::nil());
        let input = calculation::ProjectionInput {
            start_date: trainee.specialization.start_date,
            duration_days: template.duration_days,
            absences: &records.absences,
            statistics: &statistics,
            quality_score: quality.overall_quality_score,
        };
        let projection = calculation::project_completion(&trainee.id, &input, now, Uuid::new_v4());

        if projection.requires_intervention {
            warn!(
                trainee_id,
                probability = %projection.completion_probability,
                risks = ?projection.risk_factors,
                "Specialization completion requires intervention"
            );
        }
        info!(
            trainee_id,
            estimated = %projection.estimated_completion_date,
            is_on_track = projection.is_on_track,
            probability = %projection.completion_probability,
            "Specialization completion projected"
        );
        Ok(Ok(projection))
    }
}
