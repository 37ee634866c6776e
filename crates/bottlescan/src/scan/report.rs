use crate::ingredients::IngredientCategory;
use crate::recommend::ProductCandidate;
use crate::scoring::ProductAnalysis;
use crate::source::SourceStatus;
use crate::substitutes::SubstituteCandidate;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Full result of one scan. Lookup stages carry their own source status.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scanned_at: DateTime<Utc>,
    pub dataset_version: String,
    pub analysis: ProductAnalysis,
    pub substitutes: Vec<FlaggedSubstitutes>,
    pub recommendations: ProductRecommendations,
}

impl ScanReport {
    /// True when any lookup stage could not consult its data source.
    pub fn is_degraded(&self) -> bool {
        self.substitutes
            .iter()
            .any(|entry| matches!(entry.status, SourceStatus::Unavailable { .. }))
            || matches!(
                self.recommendations.status,
                SourceStatus::Unavailable { .. }
            )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlaggedSubstitutes {
    pub ingredient: String,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub substitutes: Vec<SubstituteCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductRecommendations {
    #[serde(flatten)]
    pub status: SourceStatus,
    pub products: Vec<ProductCandidate>,
}

/// Substitutes for one flagged ingredient of a direct suggestion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedSubstitutes {
    pub ingredient: String,
    pub score: u8,
    pub substitutes: Vec<SubstituteCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientAlternatives {
    pub ingredient: String,
    pub score: Option<u8>,
    pub category: Option<IngredientCategory>,
    pub alternatives: Vec<AlternativeIngredient>,
}

/// A substitute together with the catalog products that already use it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeIngredient {
    #[serde(flatten)]
    pub substitute: SubstituteCandidate,
    pub product_ids: Vec<String>,
}
