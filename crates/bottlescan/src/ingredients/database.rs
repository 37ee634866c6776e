use super::category::IngredientCategory;
use super::normalizer::normalize_token;
use crate::reference::DatasetError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

const DEFAULT_RATIONALE: &str = "Standard ingredient";

/// Reference entry for one canonical ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientRecord {
    pub canonical_name: String,
    pub raw_aliases: BTreeSet<String>,
    pub score: u8,
    pub rationale: String,
    pub category: IngredientCategory,
}

/// Immutable ingredient reference table, shared read-only across requests.
///
/// Both the canonical names and the aliases are indexed at construction so a
/// lookup is a single hash probe.
#[derive(Debug, Default)]
pub struct HealthScoreDatabase {
    records: HashMap<String, IngredientRecord>,
    aliases: HashMap<String, String>,
}

impl HealthScoreDatabase {
    pub fn from_records(records: Vec<IngredientRecord>) -> Result<Self, DatasetError> {
        let mut database = Self::default();

        for mut record in records {
            let canonical = normalize_token(&record.canonical_name);
            if canonical.is_empty() {
                return Err(DatasetError::EmptyName {
                    dataset: "health scores",
                });
            }
            if record.score > 100 {
                return Err(DatasetError::InvalidScore {
                    dataset: "health scores",
                    name: canonical,
                    score: f64::from(record.score),
                });
            }
            if database.records.contains_key(&canonical) {
                return Err(DatasetError::DuplicateIngredient(canonical));
            }

            let aliases: BTreeSet<String> = record
                .raw_aliases
                .iter()
                .map(|alias| normalize_token(alias))
                .filter(|alias| !alias.is_empty() && *alias != canonical)
                .collect();

            for alias in std::iter::once(&canonical).chain(aliases.iter()) {
                if let Some(existing) = database.aliases.get(alias) {
                    return Err(DatasetError::AliasConflict {
                        alias: alias.clone(),
                        first: existing.clone(),
                        second: canonical.clone(),
                    });
                }
                database.aliases.insert(alias.clone(), canonical.clone());
            }

            record.canonical_name = canonical.clone();
            record.raw_aliases = aliases;
            database.records.insert(canonical, record);
        }

        Ok(database)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(file)
    }

    /// Reads `ingredient,aliases,score,category,rationale` rows. Aliases are
    /// `|`-separated; a blank category is derived from the score band.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for row in csv_reader.deserialize::<HealthScoreRow>() {
            records.push(row?.into_record()?);
        }

        Self::from_records(records)
    }

    pub fn lookup(&self, canonical_name: &str) -> Option<&IngredientRecord> {
        self.records.get(canonical_name)
    }

    pub(crate) fn canonical_for_alias(&self, token: &str) -> Option<&str> {
        self.aliases.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct HealthScoreRow {
    ingredient: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    aliases: Option<String>,
    score: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rationale: Option<String>,
}

impl HealthScoreRow {
    fn into_record(self) -> Result<IngredientRecord, DatasetError> {
        if !self.score.is_finite() || !(0.0..=100.0).contains(&self.score) {
            return Err(DatasetError::InvalidScore {
                dataset: "health scores",
                name: self.ingredient,
                score: self.score,
            });
        }
        // offline builds emit one-decimal scores; half-up onto the integer scale
        let score = self.score.round() as u8;

        let category = match self.category.as_deref() {
            Some(value) => IngredientCategory::parse(value).ok_or_else(|| {
                DatasetError::UnknownCategory {
                    ingredient: self.ingredient.clone(),
                    value: value.to_string(),
                }
            })?,
            None => IngredientCategory::from_score(score),
        };

        let raw_aliases = self
            .aliases
            .as_deref()
            .map(|value| value.split('|').map(str::to_string).collect())
            .unwrap_or_default();

        Ok(IngredientRecord {
            canonical_name: self.ingredient,
            raw_aliases,
            score,
            rationale: self
                .rationale
                .unwrap_or_else(|| DEFAULT_RATIONALE.to_string()),
            category,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "ingredient,aliases,score,category,rationale\n";

    fn load(rows: &str) -> Result<HealthScoreDatabase, DatasetError> {
        HealthScoreDatabase::from_csv_reader(Cursor::new(format!("{HEADER}{rows}")))
    }

    #[test]
    fn csv_rows_become_records_with_normalized_aliases() {
        let database = load(
            "Aqua,Water| EAU ,95,beneficial,Water - safe solvent\n\
             parfum,fragrance,20,avoid,Allergen risk\n",
        )
        .expect("dataset loads");

        assert_eq!(database.len(), 2);
        let aqua = database.lookup("aqua").expect("aqua present");
        assert_eq!(aqua.score, 95);
        assert_eq!(aqua.category, IngredientCategory::Beneficial);
        assert!(aqua.raw_aliases.contains("water"));
        assert!(aqua.raw_aliases.contains("eau"));
        assert_eq!(database.canonical_for_alias("fragrance"), Some("parfum"));
        assert_eq!(database.canonical_for_alias("parfum"), Some("parfum"));
    }

    #[test]
    fn blank_category_and_rationale_use_defaults() {
        let database = load("squalane,,84,,\nmystery oil,,40.5,,\n").expect("dataset loads");

        let squalane = database.lookup("squalane").expect("present");
        assert_eq!(squalane.category, IngredientCategory::Beneficial);
        assert_eq!(squalane.rationale, DEFAULT_RATIONALE);

        let mystery = database.lookup("mystery oil").expect("present");
        assert_eq!(mystery.score, 41);
        assert_eq!(mystery.category, IngredientCategory::Concerning);
    }

    #[test]
    fn rejects_out_of_range_scores() {
        match load("aqua,,101,beneficial,too good\n") {
            Err(DatasetError::InvalidScore { name, .. }) => assert_eq!(name, "aqua"),
            other => panic!("expected invalid score, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_categories() {
        match load("aqua,,95,wonderful,\n") {
            Err(DatasetError::UnknownCategory { value, .. }) => assert_eq!(value, "wonderful"),
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn rejects_aliases_claimed_twice() {
        match load("parfum,fragrance,20,avoid,\nlinalool,fragrance,40,concerning,\n") {
            Err(DatasetError::AliasConflict {
                alias,
                first,
                second,
            }) => {
                assert_eq!(alias, "fragrance");
                assert_eq!(first, "parfum");
                assert_eq!(second, "linalool");
            }
            other => panic!("expected alias conflict, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_canonical_names() {
        match load("aqua,,95,,\nAqua.,,90,,\n") {
            Err(DatasetError::DuplicateIngredient(name)) => assert_eq!(name, "aqua"),
            other => panic!("expected duplicate ingredient, got {other:?}"),
        }
    }

    #[test]
    fn lookup_of_long_tail_ingredient_is_absent() {
        let database = load("aqua,,95,,\n").expect("dataset loads");
        assert!(database.lookup("bakuchiol").is_none());
    }
}
