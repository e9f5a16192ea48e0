//! Training quality metrics.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Four quality sub-scores and their weighted overall score, all 0 to 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Unique identifier for this snapshot.
    pub metrics_id: Uuid,
    /// The trainee the metrics are for.
    pub trainee_id: String,
    /// The instant the metrics were computed for.
    pub calculated_at: NaiveDateTime,
    /// How evenly duty hours are spread across weeks.
    pub shift_regularity_score: Decimal,
    /// How varied the logged procedures are.
    pub procedure_diversity_score: Decimal,
    /// How consistently courses are finished on time.
    pub learning_consistency_score: Decimal,
    /// Average publication impact.
    pub publication_quality_score: Decimal,
    /// Weighted combination of the four sub-scores.
    pub overall_quality_score: Decimal,
    /// Suggestions for sub-scores under their thresholds.
    pub recommendations: Vec<String>,
}
