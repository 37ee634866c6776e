use super::table::{SubstituteEntry, SubstituteSource};
use crate::ingredients::{HealthScoreDatabase, IngredientNormalizer};
use crate::scoring::UNKNOWN_INGREDIENT_SCORE;
use crate::source::CatalogError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstituteCandidate {
    pub name: String,
    pub score: u8,
    pub description: String,
    pub functional_role: String,
    pub confidence: f32,
}

impl From<SubstituteEntry> for SubstituteCandidate {
    fn from(entry: SubstituteEntry) -> Self {
        let description = entry.description.unwrap_or_else(|| {
            if entry.role.is_empty() {
                "healthier alternative".to_string()
            } else {
                format!("{} replacement", entry.role)
            }
        });
        Self {
            name: entry.name,
            score: entry.score,
            description,
            functional_role: entry.role,
            confidence: entry.confidence,
        }
    }
}

pub struct SubstituteFinder<S> {
    source: Arc<S>,
    database: Arc<HealthScoreDatabase>,
    normalizer: IngredientNormalizer,
}

impl<S> Clone for SubstituteFinder<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            database: Arc::clone(&self.database),
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<S> SubstituteFinder<S>
where
    S: SubstituteSource,
{
    pub fn new(source: Arc<S>, database: Arc<HealthScoreDatabase>) -> Self {
        let normalizer = IngredientNormalizer::new(Arc::clone(&database));
        Self {
            source,
            database,
            normalizer,
        }
    }

    /// Ranked replacements for one flagged ingredient, best first.
    ///
    /// A substitute has to score strictly higher than the ingredient it
    /// replaces. Repeated names keep their best score; ties are broken by
    /// name so truncation at `max_results` is deterministic.
    pub fn find_substitutes(
        &self,
        flagged: &str,
        max_results: usize,
    ) -> Result<Vec<SubstituteCandidate>, CatalogError> {
        let canonical = self.normalizer.normalize(flagged);
        if max_results == 0 || canonical.is_empty() {
            return Ok(Vec::new());
        }

        let floor = self
            .database
            .lookup(&canonical)
            .map(|record| record.score)
            .unwrap_or(UNKNOWN_INGREDIENT_SCORE);

        let mut best: HashMap<String, SubstituteEntry> = HashMap::new();
        for entry in self.source.candidates(&canonical)? {
            if entry.name == canonical || entry.score <= floor {
                continue;
            }
            match best.get(&entry.name) {
                Some(existing) if existing.score >= entry.score => {}
                _ => {
                    best.insert(entry.name.clone(), entry);
                }
            }
        }

        let mut ranked: Vec<SubstituteCandidate> =
            best.into_values().map(SubstituteCandidate::from).collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        ranked.truncate(max_results);

        debug!(
            ingredient = %canonical,
            substitutes = ranked.len(),
            "substitute lookup complete"
        );
        Ok(ranked)
    }
}
