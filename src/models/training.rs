//! Training records: internships, courses, procedures, self-education and
//! publications, plus the tags used to partition them.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ModuleType;

/// Group name used for records that carry no value for a partition.
pub const UNASSIGNED_PARTITION: &str = "unassigned";

/// Optional grouping tags shared by requirements and completed records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordTags {
    /// Program year the item belongs to.
    #[serde(default)]
    pub year: Option<u8>,
    /// Training stage the item belongs to.
    #[serde(default)]
    pub stage: Option<String>,
    /// Free-form category (course type, procedure group, ...).
    #[serde(default)]
    pub category: Option<String>,
}

/// The key requirements and records are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Group by program year.
    Year,
    /// Group by training stage.
    Stage,
    /// Group by category tag.
    Category,
}

/// Anything carrying [`RecordTags`].
pub trait Tagged {
    /// Returns the item's tags.
    fn tags(&self) -> &RecordTags;

    /// Returns the group this item falls into for `partition`.
    ///
    /// Items without a value for the partition land in
    /// [`UNASSIGNED_PARTITION`].
    fn partition_key(&self, partition: Partition) -> String {
        let tags = self.tags();
        let key = match partition {
            Partition::Year => tags.year.map(|year| year.to_string()),
            Partition::Stage => tags.stage.clone(),
            Partition::Category => tags.category.clone(),
        };
        key.unwrap_or_else(|| UNASSIGNED_PARTITION.to_string())
    }
}

/// Lifecycle state of an internship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipStatus {
    /// Scheduled but not started.
    Planned,
    /// Currently running.
    InProgress,
    /// Finished and signed off.
    Completed,
    /// Abandoned; no longer counts.
    Cancelled,
}

/// An internship placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Internship {
    /// Unique identifier for the internship.
    pub id: String,
    /// Code of the template requirement this internship realises.
    #[serde(default)]
    pub template_code: Option<String>,
    /// Module the internship belongs to.
    pub module_id: String,
    /// Type of that module.
    pub module_type: ModuleType,
    /// Hosting department.
    pub department: String,
    /// First day of the placement.
    pub start_date: NaiveDate,
    /// Planned last day of the placement.
    pub end_date: NaiveDate,
    /// Lifecycle state.
    pub status: InternshipStatus,
    /// Working days credited for the placement.
    #[serde(default)]
    pub working_days: u32,
    /// Grouping tags.
    #[serde(default)]
    pub tags: RecordTags,
}

impl Internship {
    /// Returns true once the internship is signed off.
    pub fn is_completed(&self) -> bool {
        self.status == InternshipStatus::Completed
    }

    /// Returns true unless the internship was cancelled.
    pub fn is_active(&self) -> bool {
        self.status != InternshipStatus::Cancelled
    }
}

impl Tagged for Internship {
    fn tags(&self) -> &RecordTags {
        &self.tags
    }
}

/// A course attended by the trainee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier for the course.
    pub id: String,
    /// Course title.
    pub name: String,
    /// Module the course counts towards.
    #[serde(default)]
    pub module_id: Option<String>,
    /// First day of the course.
    pub start_date: NaiveDate,
    /// Whether the course was completed.
    #[serde(default)]
    pub is_completed: bool,
    /// Day the course was completed, when recorded.
    #[serde(default)]
    pub completed_at: Option<NaiveDate>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: RecordTags,
}

impl Course {
    /// Returns the number of days between start and recorded completion.
    pub fn completion_days(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.start_date).num_days())
    }
}

impl Tagged for Course {
    fn tags(&self) -> &RecordTags {
        &self.tags
    }
}

/// The role the trainee performed during a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorRole {
    /// Performed the procedure.
    A,
    /// Assisted.
    B,
    /// Observed or took a minor part.
    C,
}

/// A procedure logged by the trainee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    /// Unique identifier for the procedure entry.
    pub id: String,
    /// Procedure code, used to measure diversity.
    pub code: String,
    /// Operator role code.
    pub operator_role: OperatorRole,
    /// Day the procedure was performed.
    pub date: NaiveDate,
    /// Internship the procedure was performed under.
    #[serde(default)]
    pub internship_id: Option<String>,
    /// Module the procedure counts towards.
    #[serde(default)]
    pub module_id: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: RecordTags,
}

impl Tagged for Procedure {
    fn tags(&self) -> &RecordTags {
        &self.tags
    }
}

fn one_day() -> u32 {
    1
}

/// A self-education activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEducation {
    /// Unique identifier for the activity.
    pub id: String,
    /// Short description.
    pub title: String,
    /// Module the activity counts towards.
    #[serde(default)]
    pub module_id: Option<String>,
    /// Day the activity took place.
    pub date: NaiveDate,
    /// Hours spent.
    pub hours: Decimal,
    /// Self-education days used.
    #[serde(default = "one_day")]
    pub days: u32,
    /// Grouping tags.
    #[serde(default)]
    pub tags: RecordTags,
}

impl Tagged for SelfEducation {
    fn tags(&self) -> &RecordTags {
        &self.tags
    }
}

/// The kind of publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationType {
    /// Journal article.
    Journal,
    /// Conference paper.
    Conference,
    /// Book.
    Book,
    /// Book chapter.
    Chapter,
    /// Thesis.
    Thesis,
    /// Poster.
    Poster,
    /// Abstract.
    Abstract,
    /// Case report.
    CaseReport,
    /// Review article.
    Review,
}

/// The highest impact score a single publication can reach.
pub const MAX_IMPACT_SCORE: u32 = 10;

/// A publication authored by the trainee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Unique identifier for the publication.
    pub id: String,
    /// Title.
    pub title: String,
    /// Kind of publication.
    pub publication_type: PublicationType,
    /// Day of publication.
    pub publication_date: NaiveDate,
    /// Whether the work was peer reviewed.
    #[serde(default)]
    pub is_peer_reviewed: bool,
    /// Whether the trainee is first author.
    #[serde(default)]
    pub is_first_author: bool,
    /// Whether the trainee is corresponding author.
    #[serde(default)]
    pub is_corresponding_author: bool,
    /// DOI, when assigned.
    #[serde(default)]
    pub doi: Option<String>,
    /// PubMed identifier, when assigned.
    #[serde(default)]
    pub pmid: Option<String>,
}

impl Publication {
    /// Returns true if the publication has a DOI or PMID.
    pub fn has_digital_identifier(&self) -> bool {
        let present = |id: &Option<String>| id.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.doi) || present(&self.pmid)
    }

    /// Returns true if the publication appeared within five years of `today`.
    pub fn is_recent(&self, today: NaiveDate) -> bool {
        match today.checked_sub_months(Months::new(60)) {
            Some(cutoff) => self.publication_date >= cutoff,
            None => true,
        }
    }

    /// Scores the publication on a 0 to 10 scale.
    ///
    /// The base score depends on the type and peer review; authorship, a
    /// digital identifier and recency add bonuses. The sum is capped at
    /// [`MAX_IMPACT_SCORE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use residency_engine::models::{Publication, PublicationType};
    /// use chrono::NaiveDate;
    ///
    /// let poster = Publication {
    ///     id: "pub_001".to_string(),
    ///     title: "Atrial fibrillation in athletes".to_string(),
    ///     publication_type: PublicationType::Poster,
    ///     publication_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    ///     is_peer_reviewed: false,
    ///     is_first_author: true,
    ///     is_corresponding_author: false,
    ///     doi: None,
    ///     pmid: None,
    /// };
    /// let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    /// assert_eq!(poster.impact_score(today), 7); // 3 + 3 first author + 1 recent
    /// ```
    pub fn impact_score(&self, today: NaiveDate) -> u32 {
        let mut score = match (self.publication_type, self.is_peer_reviewed) {
            (PublicationType::Journal, true) => 10,
            (PublicationType::Journal, false) => 5,
            (PublicationType::Conference, true) => 7,
            (PublicationType::Conference, false) => 4,
            (PublicationType::Review, true) => 12,
            (PublicationType::Review, false) => 6,
            (PublicationType::Book, _) => 8,
            (PublicationType::Chapter, _) => 6,
            (PublicationType::Thesis, _) => 5,
            (PublicationType::Poster, _) => 3,
            (PublicationType::Abstract, _) => 2,
            (PublicationType::CaseReport, _) => 4,
        };

        if self.is_first_author {
            score += 3;
        }
        if self.is_corresponding_author {
            score += 2;
        }
        if self.has_digital_identifier() {
            score += 2;
        }
        if self.is_recent(today) {
            score += 1;
        }

        score.min(MAX_IMPACT_SCORE)
    }
}
