use crate::ingredients::IngredientNormalizer;
use crate::reference::DatasetError;
use crate::source::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

/// Lookup seam for the pre-built substitute table so the finder can be
/// exercised against slow or failing sources.
pub trait SubstituteSource: Send + Sync + 'static {
    fn candidates(&self, canonical_name: &str) -> Result<Vec<SubstituteEntry>, CatalogError>;
}

/// One replacement ingredient as produced by the offline co-occurrence build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstituteEntry {
    pub name: String,
    pub score: u8,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub description: Option<String>,
}

/// In-memory substitute table keyed by canonical ingredient name.
#[derive(Debug, Default)]
pub struct SubstituteTable {
    entries: HashMap<String, Vec<SubstituteEntry>>,
}

impl SubstituteTable {
    /// Keys and substitute names are canonicalized, so keys that are aliases
    /// of one another (`fragrance`, `parfum`) merge into one entry list.
    pub fn new(
        raw: BTreeMap<String, Vec<SubstituteEntry>>,
        normalizer: &IngredientNormalizer,
    ) -> Result<Self, DatasetError> {
        let mut entries: HashMap<String, Vec<SubstituteEntry>> = HashMap::new();

        for (key, candidates) in raw {
            let canonical = normalizer.normalize(&key);
            if canonical.is_empty() {
                return Err(DatasetError::EmptyName {
                    dataset: "substitutes",
                });
            }

            let bucket = entries.entry(canonical).or_default();
            for mut candidate in candidates {
                candidate.name = normalizer.normalize(&candidate.name);
                if candidate.name.is_empty() {
                    return Err(DatasetError::EmptyName {
                        dataset: "substitutes",
                    });
                }
                if candidate.score > 100 {
                    return Err(DatasetError::InvalidScore {
                        dataset: "substitutes",
                        name: candidate.name,
                        score: f64::from(candidate.score),
                    });
                }
                candidate.confidence = candidate.confidence.clamp(0.0, 1.0);
                bucket.push(candidate);
            }
        }

        Ok(Self { entries })
    }

    pub fn from_path<P: AsRef<Path>>(
        path: P,
        normalizer: &IngredientNormalizer,
    ) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_reader(file, normalizer)
    }

    pub fn from_json_reader<R: Read>(
        reader: R,
        normalizer: &IngredientNormalizer,
    ) -> Result<Self, DatasetError> {
        let raw: BTreeMap<String, Vec<SubstituteEntry>> = serde_json::from_reader(reader)
            .map_err(|source| DatasetError::Json {
                dataset: "substitutes",
                source,
            })?;
        Self::new(raw, normalizer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SubstituteSource for SubstituteTable {
    fn candidates(&self, canonical_name: &str) -> Result<Vec<SubstituteEntry>, CatalogError> {
        Ok(self
            .entries
            .get(canonical_name)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredients::HealthScoreDatabase;
    use std::io::Cursor;
    use std::sync::Arc;

    fn normalizer() -> IngredientNormalizer {
        let database = HealthScoreDatabase::from_csv_reader(Cursor::new(
            "ingredient,aliases,score,category,rationale\nparfum,fragrance,20,avoid,Allergen risk\n",
        ))
        .expect("database loads");
        IngredientNormalizer::new(Arc::new(database))
    }

    #[test]
    fn alias_keys_merge_into_the_canonical_entry() {
        let json = r#"{
            "Parfum": [{ "name": "Fragrance-Free", "score": 95, "role": "remove fragrance" }],
            "fragrance": [{ "name": "essential oil blend", "score": 60 }]
        }"#;
        let table = SubstituteTable::from_json_reader(Cursor::new(json), &normalizer())
            .expect("table loads");

        assert_eq!(table.len(), 1);
        let candidates = table.candidates("parfum").expect("lookup");
        let names: Vec<_> = candidates.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["fragrance-free", "essential oil blend"]);
    }

    #[test]
    fn unknown_keys_yield_no_candidates() {
        let table = SubstituteTable::from_json_reader(Cursor::new("{}"), &normalizer())
            .expect("table loads");
        assert!(table.candidates("methylparaben").expect("lookup").is_empty());
    }

    #[test]
    fn rejects_scores_above_one_hundred() {
        let json = r#"{ "parfum": [{ "name": "vanilla", "score": 140 }] }"#;
        match SubstituteTable::from_json_reader(Cursor::new(json), &normalizer()) {
            Err(DatasetError::InvalidScore { name, .. }) => assert_eq!(name, "vanilla"),
            other => panic!("expected invalid score, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_reported_per_dataset() {
        match SubstituteTable::from_json_reader(Cursor::new("[1, 2"), &normalizer()) {
            Err(DatasetError::Json { dataset, .. }) => assert_eq!(dataset, "substitutes"),
            other => panic!("expected json error, got {other:?}"),
        }
    }
}
