//! Construction of the immutable, process-wide reference datasets.
//!
//! The health score table, substitute table, and product catalog are built by
//! an offline batch job. They are loaded exactly once at start-up, either from
//! a configured directory or from the seed copies compiled into the crate, and
//! then shared behind `Arc` without any locking.

use crate::config::DatasetConfig;
use crate::ingredients::{HealthScoreDatabase, IngredientNormalizer};
use crate::recommend::InMemoryCatalog;
use crate::substitutes::SubstituteTable;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const MANIFEST_FILE: &str = "manifest.json";
const HEALTH_SCORES_FILE: &str = "health_scores.csv";
const SUBSTITUTES_FILE: &str = "substitutes.json";
const PRODUCTS_FILE: &str = "products.json";

const BUNDLED_MANIFEST: &str = include_str!("../data/manifest.json");
const BUNDLED_HEALTH_SCORES: &str = include_str!("../data/health_scores.csv");
const BUNDLED_SUBSTITUTES: &str = include_str!("../data/substitutes.json");
const BUNDLED_PRODUCTS: &str = include_str!("../data/products.json");

#[derive(Debug, Deserialize)]
struct Manifest {
    version: String,
}

/// Everything a scan consults, frozen after construction.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    version: String,
    database: Arc<HealthScoreDatabase>,
    substitutes: Arc<SubstituteTable>,
    catalog: Arc<InMemoryCatalog>,
}

impl ReferenceData {
    pub fn load(config: &DatasetConfig) -> Result<Self, DatasetError> {
        match &config.data_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::bundled(),
        }
    }

    pub fn bundled() -> Result<Self, DatasetError> {
        let reference = Self::from_readers(
            Cursor::new(BUNDLED_MANIFEST),
            Cursor::new(BUNDLED_HEALTH_SCORES),
            Cursor::new(BUNDLED_SUBSTITUTES),
            Cursor::new(BUNDLED_PRODUCTS),
        )?;
        reference.log_loaded("bundled");
        Ok(reference)
    }

    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, DatasetError> {
        let dir = dir.as_ref();
        let reference = Self::from_readers(
            open(dir.join(MANIFEST_FILE))?,
            open(dir.join(HEALTH_SCORES_FILE))?,
            open(dir.join(SUBSTITUTES_FILE))?,
            open(dir.join(PRODUCTS_FILE))?,
        )?;
        reference.log_loaded(&dir.display().to_string());
        Ok(reference)
    }

    pub fn from_readers<M, H, S, P>(
        manifest: M,
        health_scores: H,
        substitutes: S,
        products: P,
    ) -> Result<Self, DatasetError>
    where
        M: Read,
        H: Read,
        S: Read,
        P: Read,
    {
        let manifest: Manifest =
            serde_json::from_reader(manifest).map_err(|source| DatasetError::Json {
                dataset: "manifest",
                source,
            })?;

        let database = Arc::new(HealthScoreDatabase::from_csv_reader(health_scores)?);
        let normalizer = IngredientNormalizer::new(Arc::clone(&database));
        let substitutes = Arc::new(SubstituteTable::from_json_reader(substitutes, &normalizer)?);
        let catalog = Arc::new(InMemoryCatalog::from_json_reader(products, &normalizer)?);

        Ok(Self {
            version: manifest.version,
            database,
            substitutes,
            catalog,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn database(&self) -> Arc<HealthScoreDatabase> {
        Arc::clone(&self.database)
    }

    pub fn substitutes(&self) -> Arc<SubstituteTable> {
        Arc::clone(&self.substitutes)
    }

    pub fn catalog(&self) -> Arc<InMemoryCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn normalizer(&self) -> IngredientNormalizer {
        IngredientNormalizer::new(Arc::clone(&self.database))
    }

    fn log_loaded(&self, origin: &str) {
        info!(
            origin,
            version = %self.version,
            ingredients = self.database.len(),
            substitute_keys = self.substitutes.len(),
            products = self.catalog.len(),
            "reference datasets loaded"
        );
    }
}

fn open(path: PathBuf) -> Result<File, DatasetError> {
    File::open(&path).map_err(|source| DatasetError::Io { path, source })
}

#[derive(Debug)]
pub enum DatasetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv(csv::Error),
    Json {
        dataset: &'static str,
        source: serde_json::Error,
    },
    EmptyName {
        dataset: &'static str,
    },
    InvalidScore {
        dataset: &'static str,
        name: String,
        score: f64,
    },
    UnknownCategory {
        ingredient: String,
        value: String,
    },
    DuplicateIngredient(String),
    AliasConflict {
        alias: String,
        first: String,
        second: String,
    },
    DuplicateProduct(String),
    InvalidRating {
        product_id: String,
        rating: f64,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io { path, source } => {
                write!(f, "failed to read dataset {}: {}", path.display(), source)
            }
            DatasetError::Csv(err) => write!(f, "invalid health score CSV data: {err}"),
            DatasetError::Json { dataset, source } => {
                write!(f, "invalid {dataset} JSON data: {source}")
            }
            DatasetError::EmptyName { dataset } => {
                write!(f, "{dataset} dataset contains an entry without a name")
            }
            DatasetError::InvalidScore {
                dataset,
                name,
                score,
            } => write!(
                f,
                "{dataset} entry '{name}' has score {score}, expected 0 to 100"
            ),
            DatasetError::UnknownCategory { ingredient, value } => {
                write!(f, "ingredient '{ingredient}' has unknown category '{value}'")
            }
            DatasetError::DuplicateIngredient(name) => {
                write!(f, "ingredient '{name}' is listed more than once")
            }
            DatasetError::AliasConflict {
                alias,
                first,
                second,
            } => write!(
                f,
                "alias '{alias}' is claimed by both '{first}' and '{second}'"
            ),
            DatasetError::DuplicateProduct(id) => {
                write!(f, "product id '{id}' is listed more than once")
            }
            DatasetError::InvalidRating { product_id, rating } => write!(
                f,
                "product '{product_id}' has rating {rating}, expected 0 to 5"
            ),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io { source, .. } => Some(source),
            DatasetError::Csv(err) => Some(err),
            DatasetError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}
