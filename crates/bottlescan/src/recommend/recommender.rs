use super::catalog::{ProductCatalog, ProductRecord};
use super::profile::{ProfileError, SkinProfile};
use super::ranking::substitute_score;
use crate::ingredients::IngredientNormalizer;
use crate::source::CatalogError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecommendError {
    #[error("no flagged ingredients supplied")]
    NoFlaggedIngredients,
    #[error("max_results must be at least 1")]
    InvalidMaxResults,
    #[error("invalid skin profile: {0}")]
    InvalidProfile(#[from] ProfileError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCandidate {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub rating: f64,
    pub health_score: u8,
    pub skin_type: BTreeSet<String>,
    pub concerns: BTreeSet<String>,
    pub average_price: Decimal,
    pub currency: String,
    pub substitute_score: f64,
    pub url: String,
}

impl ProductCandidate {
    fn from_record(product: &ProductRecord, substitute_score: f64) -> Self {
        Self {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            rating: product.rating,
            health_score: product.health_score,
            skin_type: product.skin_type.clone(),
            concerns: product.concerns.clone(),
            average_price: product.average_price,
            currency: product.currency.clone(),
            substitute_score,
            url: product.url.clone(),
        }
    }
}

/// Ranks catalog products that avoid every flagged ingredient and suit the
/// shopper's skin type.
pub struct ProductRecommender<C> {
    catalog: Arc<C>,
    normalizer: IngredientNormalizer,
}

impl<C> Clone for ProductRecommender<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<C> ProductRecommender<C>
where
    C: ProductCatalog,
{
    pub fn new(catalog: Arc<C>, normalizer: IngredientNormalizer) -> Self {
        Self {
            catalog,
            normalizer,
        }
    }

    pub fn recommend(
        &self,
        flagged: &BTreeSet<String>,
        profile: &SkinProfile,
        max_results: usize,
    ) -> Result<Vec<ProductCandidate>, RecommendError> {
        self.recommend_with_reference(flagged, profile, &[] as &[&str], max_results)
    }

    /// Same as [`recommend`](Self::recommend), with the scanned product's full
    /// ingredient list feeding the overlap term of the substitute score.
    pub fn recommend_with_reference<S: AsRef<str>>(
        &self,
        flagged: &BTreeSet<String>,
        profile: &SkinProfile,
        reference: &[S],
        max_results: usize,
    ) -> Result<Vec<ProductCandidate>, RecommendError> {
        if max_results == 0 {
            return Err(RecommendError::InvalidMaxResults);
        }
        let flagged: BTreeSet<String> = flagged
            .iter()
            .map(|name| self.normalizer.normalize(name))
            .filter(|name| !name.is_empty())
            .collect();
        if flagged.is_empty() {
            return Err(RecommendError::NoFlaggedIngredients);
        }
        profile.validate()?;

        let reference: BTreeSet<String> = reference
            .iter()
            .map(|raw| self.normalizer.normalize(raw.as_ref()))
            .filter(|name| !name.is_empty() && !flagged.contains(name))
            .collect();

        let products = self.catalog.products()?;
        let mut ranked: Vec<ProductCandidate> = products
            .iter()
            .filter(|product| !product.contains_any(&flagged))
            .filter(|product| !product.skin_type.is_disjoint(&profile.skin_types))
            .map(|product| {
                ProductCandidate::from_record(
                    product,
                    substitute_score(product, profile, &reference),
                )
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.substitute_score
                .total_cmp(&a.substitute_score)
                .then_with(|| b.health_score.cmp(&a.health_score))
                .then_with(|| b.rating.total_cmp(&a.rating))
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        ranked.truncate(max_results);

        debug!(
            flagged = flagged.len(),
            candidates = ranked.len(),
            "product recommendation complete"
        );
        Ok(ranked)
    }
}
