//! Per-ingredient and product-level health scoring.

use crate::ingredients::{HealthScoreDatabase, IngredientCategory, IngredientNormalizer};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Ingredients scoring strictly below this are flagged.
pub const FLAG_THRESHOLD: u8 = 50;
/// Score assigned to ingredients the database does not know.
pub const UNKNOWN_INGREDIENT_SCORE: u8 = 60;
pub const UNKNOWN_INGREDIENT_RATIONALE: &str = "limited safety data available";

/// Decay exponent for the informational position-weighted score: earlier
/// label positions carry higher concentrations.
const POSITION_WEIGHT_EXPONENT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("no ingredients supplied")]
    EmptyInput,
}

/// One scored ingredient, in the shape the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedIngredient {
    pub raw_name: String,
    pub canonical_name: String,
    pub score: u8,
    pub rationale: String,
    pub category: IngredientCategory,
    /// `false` when the missing-data default was applied.
    pub known: bool,
}

impl AnalyzedIngredient {
    pub fn is_flagged(&self) -> bool {
        self.score < FLAG_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAnalysis {
    pub ingredients: Vec<AnalyzedIngredient>,
    pub aggregate_score: u8,
    pub interpretation: &'static str,
    pub position_weighted_score: f64,
    pub flagged: Vec<AnalyzedIngredient>,
}

impl ProductAnalysis {
    /// Distinct canonical names of the flagged ingredients, first occurrence
    /// order.
    pub fn flagged_canonical_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.flagged
            .iter()
            .filter(|ingredient| seen.insert(ingredient.canonical_name.as_str()))
            .map(|ingredient| ingredient.canonical_name.clone())
            .collect()
    }

    pub fn flagged_set(&self) -> BTreeSet<String> {
        self.flagged
            .iter()
            .map(|ingredient| ingredient.canonical_name.clone())
            .collect()
    }

    pub fn canonical_names(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .map(|ingredient| ingredient.canonical_name.clone())
            .collect()
    }
}

/// Stateless scorer over the shared reference database.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    database: Arc<HealthScoreDatabase>,
    normalizer: IngredientNormalizer,
}

impl ScoringEngine {
    pub fn new(database: Arc<HealthScoreDatabase>) -> Self {
        let normalizer = IngredientNormalizer::new(Arc::clone(&database));
        Self {
            database,
            normalizer,
        }
    }

    pub fn normalizer(&self) -> &IngredientNormalizer {
        &self.normalizer
    }

    pub fn database(&self) -> &HealthScoreDatabase {
        &self.database
    }

    /// Blank entries are skipped; a list with nothing left is an input error.
    pub fn analyze<S: AsRef<str>>(
        &self,
        raw_ingredients: &[S],
    ) -> Result<ProductAnalysis, AnalysisError> {
        let ingredients: Vec<AnalyzedIngredient> = raw_ingredients
            .iter()
            .map(|raw| raw.as_ref())
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| self.score_ingredient(raw))
            .collect();

        if ingredients.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let scores: Vec<u8> = ingredients.iter().map(|ingredient| ingredient.score).collect();
        let aggregate_score = rounded_mean(&scores);
        let flagged = ingredients
            .iter()
            .filter(|ingredient| ingredient.is_flagged())
            .cloned()
            .collect();

        Ok(ProductAnalysis {
            aggregate_score,
            interpretation: IngredientCategory::from_score(aggregate_score).interpretation(),
            position_weighted_score: position_weighted_score(&scores),
            ingredients,
            flagged,
        })
    }

    fn score_ingredient(&self, raw: &str) -> AnalyzedIngredient {
        let canonical_name = self.normalizer.normalize(raw);
        match self.database.lookup(&canonical_name) {
            Some(record) => AnalyzedIngredient {
                raw_name: raw.to_string(),
                canonical_name,
                score: record.score,
                rationale: record.rationale.clone(),
                category: record.category,
                known: true,
            },
            None => AnalyzedIngredient {
                raw_name: raw.to_string(),
                canonical_name,
                score: UNKNOWN_INGREDIENT_SCORE,
                rationale: UNKNOWN_INGREDIENT_RATIONALE.to_string(),
                category: IngredientCategory::from_score(UNKNOWN_INGREDIENT_SCORE),
                known: false,
            },
        }
    }
}

/// Half-up rounding of the arithmetic mean, done on integers so 60.5 never
/// lands on 60 through float error. `scores` must be non-empty.
fn rounded_mean(scores: &[u8]) -> u8 {
    let count = scores.len() as u64;
    let sum: u64 = scores.iter().map(|&score| u64::from(score)).sum();
    ((2 * sum + count) / (2 * count)) as u8
}

fn position_weighted_score(scores: &[u8]) -> f64 {
    let (weighted, total_weight) = scores.iter().enumerate().fold(
        (0.0_f64, 0.0_f64),
        |(weighted, total), (index, &score)| {
            let weight = 1.0 / ((index + 1) as f64).powf(POSITION_WEIGHT_EXPONENT);
            (weighted + f64::from(score) * weight, total + weight)
        },
    );
    ((weighted / total_weight) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceData;

    fn engine() -> ScoringEngine {
        let reference = ReferenceData::bundled().expect("seed datasets load");
        ScoringEngine::new(reference.database())
    }

    #[test]
    fn rounded_mean_rounds_half_up() {
        assert_eq!(rounded_mean(&[60, 61]), 61);
        assert_eq!(rounded_mean(&[60, 60, 61]), 60);
        assert_eq!(rounded_mean(&[95, 88, 90, 70, 45, 20, 15]), 60);
        assert_eq!(rounded_mean(&[0]), 0);
        assert_eq!(rounded_mean(&[100, 100]), 100);
    }

    #[test]
    fn position_weighting_favours_early_ingredients() {
        let front_loaded = position_weighted_score(&[90, 20]);
        let back_loaded = position_weighted_score(&[20, 90]);
        assert!(front_loaded > back_loaded);
        assert_eq!(position_weighted_score(&[70, 70, 70]), 70.0);
    }

    #[test]
    fn empty_and_blank_lists_are_rejected() {
        let engine = engine();
        let empty: [&str; 0] = [];
        assert_eq!(engine.analyze(&empty), Err(AnalysisError::EmptyInput));
        assert_eq!(engine.analyze(&["  ", ""]), Err(AnalysisError::EmptyInput));
    }

    #[test]
    fn blank_entries_are_dropped_without_disturbing_order() {
        let analysis = engine()
            .analyze(&["Aqua", "  ", "Glycerin", "", "Parfum"])
            .expect("analysis");
        let names: Vec<_> = analysis
            .ingredients
            .iter()
            .map(|ingredient| ingredient.canonical_name.as_str())
            .collect();
        assert_eq!(names, vec!["aqua", "glycerin", "parfum"]);
        assert_eq!(analysis.aggregate_score, 68);
        assert_eq!(
            analysis,
            engine().analyze(&["Aqua", "Glycerin", "Parfum"]).expect("analysis")
        );
    }

    #[test]
    fn unknown_ingredient_uses_default_policy() {
        let analysis = engine().analyze(&["Bakuchiol"]).expect("analysis");
        let ingredient = &analysis.ingredients[0];
        assert_eq!(ingredient.canonical_name, "bakuchiol");
        assert_eq!(ingredient.score, UNKNOWN_INGREDIENT_SCORE);
        assert_eq!(ingredient.rationale, UNKNOWN_INGREDIENT_RATIONALE);
        assert!(!ingredient.known);
        assert!(analysis.flagged.is_empty());
    }

    #[test]
    fn aliases_score_as_their_canonical_ingredient() {
        let analysis = engine().analyze(&["Fragrance", "Water"]).expect("analysis");
        assert_eq!(analysis.ingredients[0].canonical_name, "parfum");
        assert_eq!(analysis.ingredients[0].score, 20);
        assert_eq!(analysis.ingredients[0].raw_name, "Fragrance");
        assert_eq!(analysis.ingredients[1].canonical_name, "aqua");
    }

    #[test]
    fn flagged_names_are_distinct_and_ordered() {
        let analysis = engine()
            .analyze(&["Parfum", "Aqua", "Methylparaben", "Fragrance"])
            .expect("analysis");
        assert_eq!(analysis.flagged.len(), 3);
        assert_eq!(
            analysis.flagged_canonical_names(),
            vec!["parfum".to_string(), "methylparaben".to_string()]
        );
    }

    #[test]
    fn interpretation_follows_aggregate_band() {
        let engine = engine();
        let healthy = engine.analyze(&["Aqua", "Glycerin"]).expect("analysis");
        assert_eq!(healthy.interpretation, "Healthy / Preferred");
        let harsh = engine
            .analyze(&["Methylparaben", "Propylparaben"])
            .expect("analysis");
        assert_eq!(harsh.interpretation, "Avoid");
    }
}
