use crate::ingredients::IngredientNormalizer;
use crate::reference::DatasetError;
use crate::source::CatalogError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

fn default_currency() -> String {
    "USD".to_string()
}

/// Catalog entry. Ingredient names are canonical once loaded through
/// [`InMemoryCatalog`]; skin types and concerns are lower-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub brand: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub skin_type: BTreeSet<String>,
    #[serde(default)]
    pub concerns: BTreeSet<String>,
    pub ingredients: Vec<String>,
    pub health_score: u8,
    pub average_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
}

impl ProductRecord {
    pub fn contains_any(&self, canonical_names: &BTreeSet<String>) -> bool {
        self.ingredients
            .iter()
            .any(|ingredient| canonical_names.contains(ingredient))
    }
}

/// Read access to the product catalog.
pub trait ProductCatalog: Send + Sync + 'static {
    fn products(&self) -> Result<Arc<[ProductRecord]>, CatalogError>;

    fn product(&self, product_id: &str) -> Result<Option<ProductRecord>, CatalogError> {
        Ok(self
            .products()?
            .iter()
            .find(|product| product.product_id == product_id)
            .cloned())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    products: Arc<[ProductRecord]>,
}

impl InMemoryCatalog {
    pub fn new(
        products: Vec<ProductRecord>,
        normalizer: &IngredientNormalizer,
    ) -> Result<Self, DatasetError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(products.len());

        for mut product in products {
            product.product_id = product.product_id.trim().to_string();
            if product.product_id.is_empty() || product.name.trim().is_empty() {
                return Err(DatasetError::EmptyName { dataset: "products" });
            }
            if !seen.insert(product.product_id.clone()) {
                return Err(DatasetError::DuplicateProduct(product.product_id));
            }
            if product.health_score > 100 {
                return Err(DatasetError::InvalidScore {
                    dataset: "products",
                    name: product.product_id,
                    score: f64::from(product.health_score),
                });
            }
            if !product.rating.is_finite() || !(0.0..=5.0).contains(&product.rating) {
                return Err(DatasetError::InvalidRating {
                    product_id: product.product_id,
                    rating: product.rating,
                });
            }

            product.ingredients = product
                .ingredients
                .iter()
                .map(|ingredient| normalizer.normalize(ingredient))
                .filter(|ingredient| !ingredient.is_empty())
                .collect();
            product.skin_type = lowercase_set(product.skin_type);
            product.concerns = lowercase_set(product.concerns);
            normalized.push(product);
        }

        Ok(Self {
            products: normalized.into(),
        })
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
        let products: Vec<ProductRecord> =
            serde_json::from_reader(reader).map_err(|source| DatasetError::Json {
                dataset: "products",
                source,
            })?;
        Self::new(products, normalizer)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn products(&self) -> Result<Arc<[ProductRecord]>, CatalogError> {
        Ok(Arc::clone(&self.products))
    }
}

pub(crate) fn lowercase_set(values: BTreeSet<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}
